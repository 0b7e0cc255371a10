//! Opens every board device from a [`Config`].

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{I2cdev, SpidevDevice};
use log::info;
use time::PrimitiveDateTime;

use crate::backlight::Backlight;
use crate::config::{
    BacklightConfig, ButtonConfig, Config, DisplayConfig, EncoderConfig, LedConfig, RtcConfig,
    ServoConfig, ThermometerConfig,
};
use crate::display::TextDisplay;
use crate::linux::gpio::{GpioLine, QuadratureLines};
use crate::linux::input_device::InputKeys;
use crate::linux::sysfs::{SysfsLed, SysfsPwm};
use crate::mcp9808::Mcp9808;
use crate::pcf8563::Pcf8563;
use crate::peripherals::ClockSource;
use crate::servo::Servo;
use crate::st7789::St7789;
use crate::{Error, Result};

const BACKLIGHT_PERIOD_NS: u64 = 200_000;
const SERVO_PERIOD_NS: u64 = 20_000_000;

pub type Display = TextDisplay<St7789<SpidevDevice, GpioLine, GpioLine>>;

fn open_error(device: &str, err: impl core::fmt::Display) -> Error {
    Error::Open {
        device: device.to_owned(),
        reason: err.to_string(),
    }
}

fn open_i2c(bus: &str) -> Result<I2cdev> {
    I2cdev::new(bus).map_err(|err| open_error(bus, err))
}

/// # Errors
///
/// Returns an error if the SPI device or either control line cannot be opened,
/// or the panel does not accept its init sequence.
pub fn open_display(config: &DisplayConfig) -> Result<Display> {
    let mut spi = SpidevDevice::open(&config.spi_device)
        .map_err(|err| open_error(&config.spi_device, err))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(config.speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .map_err(|err| open_error(&config.spi_device, err))?;
    let dc = GpioLine::output(&config.gpio_chip, config.dc_line, "st7789_dc")?;
    let reset = GpioLine::output(&config.gpio_chip, config.reset_line, "st7789_reset")?;
    let mut panel = St7789::new(spi, dc, reset);
    panel.init()?;
    info!("ST7789 ready on {}", config.spi_device);
    Ok(TextDisplay::new(panel))
}

/// # Errors
///
/// Returns an error if the bus cannot be opened or the device is not an MCP9808.
pub fn open_thermometer(config: &ThermometerConfig) -> Result<Mcp9808<I2cdev>> {
    Mcp9808::new(open_i2c(&config.i2c_bus)?, config.address)
}

/// Open the RTC and write its control defaults (this also starts it).
///
/// # Errors
///
/// Returns an error if the bus cannot be opened or the chip does not answer.
pub fn open_rtc(config: &RtcConfig) -> Result<Pcf8563<I2cdev>> {
    let mut rtc = Pcf8563::new(open_i2c(&config.i2c_bus)?, config.address);
    rtc.reset_control()?;
    Ok(rtc)
}

/// # Errors
///
/// Returns an error if the LED does not exist.
pub fn open_led(config: &LedConfig) -> Result<SysfsLed> {
    SysfsLed::open(&config.name)
}

/// # Errors
///
/// Returns an error if the input device cannot be opened.
pub fn open_exit_button(config: &ButtonConfig) -> Result<InputKeys> {
    InputKeys::open(&config.input_device)
}

/// # Errors
///
/// Returns an error if the line cannot be requested.
pub fn open_rotary_switch(config: &EncoderConfig) -> Result<GpioLine> {
    GpioLine::edge_input(&config.gpio_chip, config.switch_line, "rotary_SW")
}

/// # Errors
///
/// Returns an error if either line cannot be requested.
pub fn open_encoder(config: &EncoderConfig) -> Result<QuadratureLines> {
    let a = GpioLine::edge_input(&config.gpio_chip, config.a_line, "rotary_SIA")?;
    let b = GpioLine::input(&config.gpio_chip, config.b_line, "rotary_SIB")?;
    Ok(QuadratureLines::new(a, b))
}

/// # Errors
///
/// Returns an error if the PWM channel cannot be exported.
pub fn open_backlight(config: &BacklightConfig) -> Result<Backlight<SysfsPwm>> {
    Ok(Backlight::new(SysfsPwm::open(
        config.chip,
        config.channel,
        BACKLIGHT_PERIOD_NS,
    )?))
}

/// # Errors
///
/// Returns an error if the PWM channel cannot be exported.
pub fn open_servo(config: &ServoConfig) -> Result<Servo<SysfsPwm>> {
    let pwm = SysfsPwm::open(config.chip, config.channel, SERVO_PERIOD_NS)?;
    Servo::new(pwm, config.min_angle, config.max_angle)
}

/// The RTC as the supervisor uses it: a fresh bus handle per command, so a
/// missing chip fails that one command instead of the supervisor.
pub struct RtcOnDemand {
    config: RtcConfig,
}

impl RtcOnDemand {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.rtc.clone(),
        }
    }

    fn open(&self) -> Result<Pcf8563<I2cdev>> {
        Ok(Pcf8563::new(open_i2c(&self.config.i2c_bus)?, self.config.address))
    }
}

impl ClockSource for RtcOnDemand {
    fn read(&mut self) -> Result<PrimitiveDateTime> {
        self.open()?.read()
    }

    fn write(&mut self, date_time: PrimitiveDateTime) -> Result<()> {
        self.open()?.write(date_time)
    }

    fn start(&mut self) -> Result<()> {
        self.open()?.start()
    }

    fn stop(&mut self) -> Result<()> {
        self.open()?.stop()
    }
}
