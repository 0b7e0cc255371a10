use embassy_time::Duration;

pub const ONE_SECOND: Duration = Duration::from_secs(1);

pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(500);

// Every blocking wait is bounded so `running` is re-checked at least this often.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
pub const INPUT_TIMEOUT: Duration = Duration::from_millis(100);
pub const BUTTON_TIMEOUT: Duration = Duration::from_millis(10);

pub const SUPERVISOR_POLL: Duration = Duration::from_millis(100);
pub const ACTUATOR_POLL: Duration = Duration::from_millis(100);
pub const SENSOR_PERIOD: Duration = ONE_SECOND;
pub const DISPLAY_REFRESH: Duration = Duration::from_millis(250);

pub const BACKLIGHT_TICK: Duration = Duration::from_millis(10);
pub const BACKLIGHT_STEP: u8 = 2;
pub const MAX_BRIGHTNESS: u8 = 100;

pub const SERVO_TICK: Duration = Duration::from_millis(50);
pub const SERVO_HALF_PERIOD: Duration = Duration::from_millis(500);
pub const SERVO_SWING_DEGREES: f32 = 45.0;
pub const SERVO_PERIOD_US: u16 = 20_000;
pub const SERVO_MIN_PULSE_US: u16 = 1_000;
pub const SERVO_MAX_PULSE_US: u16 = 2_000;

pub const MIN_THRESHOLD: i32 = 0;
pub const MAX_THRESHOLD: i32 = 60;
pub const DEFAULT_THRESHOLD: i32 = 28;
/// Holding the threshold here stops the RTC.
pub const RTC_STOP_THRESHOLD: i32 = 60;
/// Holding the threshold here (re)starts the RTC.
pub const RTC_START_THRESHOLD: i32 = 59;

pub const ALARM_DURATION: Duration = Duration::from_secs(20);
