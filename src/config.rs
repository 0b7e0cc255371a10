//! Board configuration.
//!
//! Every key is optional in the TOML file; a missing key keeps the value wired
//! on the reference board.

use std::path::Path;

use embassy_time::Duration;
use serde::Deserialize;

use crate::shared_constants::{
    DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD, SERVO_SWING_DEGREES,
};
use crate::{Error, Result};

const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";
const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub display: DisplayConfig,
    pub thermometer: ThermometerConfig,
    pub rtc: RtcConfig,
    pub led: LedConfig,
    pub button: ButtonConfig,
    pub encoder: EncoderConfig,
    pub backlight: BacklightConfig,
    pub servo: ServoConfig,
    pub alarm: AlarmConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub spi_device: String,
    pub speed_hz: u32,
    pub gpio_chip: String,
    pub dc_line: u32,
    pub reset_line: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            spi_device: "/dev/spidev0.0".to_owned(),
            // The panel is rated for 62.5 MHz; 30 MHz leaves margin for the wiring.
            speed_hz: 30_000_000,
            gpio_chip: DEFAULT_GPIO_CHIP.to_owned(),
            dc_line: 22,
            reset_line: 27,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ThermometerConfig {
    pub i2c_bus: String,
    pub address: u8,
}

impl Default for ThermometerConfig {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS.to_owned(),
            address: crate::mcp9808::DEFAULT_ADDRESS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RtcConfig {
    pub i2c_bus: String,
    pub address: u8,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS.to_owned(),
            address: crate::pcf8563::DEFAULT_ADDRESS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LedConfig {
    /// Name under `/sys/class/leds`.
    pub name: String,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            name: "lwsw-led".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonConfig {
    pub input_device: String,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            input_device: "/dev/input/event0".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub gpio_chip: String,
    pub a_line: u32,
    pub b_line: u32,
    pub switch_line: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            gpio_chip: DEFAULT_GPIO_CHIP.to_owned(),
            a_line: 16,
            b_line: 20,
            switch_line: 21,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BacklightConfig {
    pub chip: u32,
    pub channel: u32,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            chip: 2,
            channel: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServoConfig {
    pub chip: u32,
    pub channel: u32,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            chip: 2,
            channel: 2,
            min_angle: -45.0,
            max_angle: 45.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmConfig {
    /// Starting threshold in °C.
    pub threshold: i32,
    /// How long an alarm annunciates before it silences itself.
    pub duration_secs: u64,
}

impl AlarmConfig {
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            duration_secs: crate::shared_constants::ALARM_DURATION.as_secs(),
        }
    }
}

impl Config {
    /// Parse and validate.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigParse`] for malformed TOML or unknown keys, [`Error::Config`]
    /// for values [`Config::validate`] rejects.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::io(path.display().to_string(), err))?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("display.spi_device", &self.display.spi_device),
            ("display.gpio_chip", &self.display.gpio_chip),
            ("thermometer.i2c_bus", &self.thermometer.i2c_bus),
            ("rtc.i2c_bus", &self.rtc.i2c_bus),
            ("led.name", &self.led.name),
            ("button.input_device", &self.button.input_device),
            ("encoder.gpio_chip", &self.encoder.gpio_chip),
        ];
        if let Some((key, _)) = paths.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::Config(format!("{key} must not be empty")));
        }
        if self.display.speed_hz == 0 {
            return Err(Error::Config("display.speed_hz must be positive".to_owned()));
        }
        if self.servo.min_angle.is_nan()
            || self.servo.max_angle.is_nan()
            || self.servo.min_angle >= self.servo.max_angle
        {
            return Err(Error::Config(format!(
                "servo.min_angle ({}) must be below servo.max_angle ({})",
                self.servo.min_angle, self.servo.max_angle
            )));
        }
        // The alarm wave swings to ±SERVO_SWING_DEGREES and idles at 0°.
        if self.servo.min_angle > -SERVO_SWING_DEGREES || self.servo.max_angle < SERVO_SWING_DEGREES
        {
            return Err(Error::Config(format!(
                "servo range {}..={} must cover -{SERVO_SWING_DEGREES}..={SERVO_SWING_DEGREES}",
                self.servo.min_angle, self.servo.max_angle
            )));
        }
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.alarm.threshold) {
            return Err(Error::Config(format!(
                "alarm.threshold {} outside {MIN_THRESHOLD}..={MAX_THRESHOLD}",
                self.alarm.threshold
            )));
        }
        if self.alarm.duration_secs == 0 {
            return Err(Error::Config("alarm.duration_secs must be positive".to_owned()));
        }
        Ok(())
    }
}
