use core::convert::Infallible;

use derive_more::derive::{Display, Error};
use embedded_hal::{digital, i2c, pwm, spi};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The three families every failure belongs to.
///
/// A loop treats all of them the same way (log, then stop that loop), but the
/// class tells the log reader whether the hardware, the value, or the startup
/// configuration is at fault.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// A peripheral could not be reached or the bus failed.
    Transport,
    /// A value fell outside the range a component accepts.
    Domain,
    /// Startup configuration was malformed.
    Config,
}

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    // Transport
    #[display("I/O failure on {device}: {source}")]
    Io {
        device: String,
        source: std::io::Error,
    },

    #[display("Cannot open {device}: {reason}")]
    Open { device: String, reason: String },

    #[display("I2C transfer failed: {_0:?}")]
    I2c(#[error(not(source))] i2c::ErrorKind),

    #[display("SPI transfer failed: {_0:?}")]
    Spi(#[error(not(source))] spi::ErrorKind),

    #[display("PWM update failed: {_0:?}")]
    Pwm(#[error(not(source))] pwm::ErrorKind),

    #[display("GPIO access failed: {_0:?}")]
    Gpio(#[error(not(source))] digital::ErrorKind),

    #[display("Unexpected {register} 0x{found:04x} (expected 0x{expected:04x})")]
    DeviceId {
        register: &'static str,
        found: u16,
        expected: u16,
    },

    #[display("Display write failed")]
    DisplayWrite,

    #[cfg(feature = "linux")]
    #[display("GPIO character device failed: {_0}")]
    GpioChip(gpiocdev::Error),

    #[cfg(feature = "linux")]
    #[display("Cannot install signal handler: {_0}")]
    Signal(ctrlc::Error),

    // Domain
    #[display("Angle {angle}° outside {min}°..={max}°")]
    AngleOutOfRange { angle: f32, min: f32, max: f32 },

    #[display("Brightness {_0}% outside 0..=100")]
    BrightnessOutOfRange(#[error(not(source))] u8),

    #[display("Temperature {_0} °C outside the sensor limit range")]
    TemperatureOutOfRange(#[error(not(source))] f32),

    #[display("0x{_0:02x} is not a valid BCD value")]
    InvalidBcd(#[error(not(source))] u8),

    #[display("Year {_0} cannot be stored by the real-time clock")]
    YearOutOfRange(#[error(not(source))] i32),

    #[display("Invalid calendar value: {_0}")]
    InvalidDateTime(time::error::ComponentRange),

    #[display("Format error")]
    FormatError,

    // Config
    #[display("Invalid configuration: {_0}")]
    Config(#[error(not(source))] String),

    #[display("Cannot parse configuration: {_0}")]
    ConfigParse(toml::de::Error),
}

impl Error {
    /// Which family this failure belongs to.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Io { .. }
            | Self::Open { .. }
            | Self::I2c(_)
            | Self::Spi(_)
            | Self::Pwm(_)
            | Self::Gpio(_)
            | Self::DeviceId { .. }
            | Self::DisplayWrite => ErrorClass::Transport,
            #[cfg(feature = "linux")]
            Self::GpioChip(_) | Self::Signal(_) => ErrorClass::Transport,
            Self::AngleOutOfRange { .. }
            | Self::BrightnessOutOfRange(_)
            | Self::TemperatureOutOfRange(_)
            | Self::InvalidBcd(_)
            | Self::YearOutOfRange(_)
            | Self::InvalidDateTime(_)
            | Self::FormatError => ErrorClass::Domain,
            Self::Config(_) | Self::ConfigParse(_) => ErrorClass::Config,
        }
    }

    pub(crate) fn io(device: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            device: device.into(),
            source,
        }
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::FormatError
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(err: time::error::ComponentRange) -> Self {
        Self::InvalidDateTime(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err)
    }
}

#[cfg(feature = "linux")]
impl From<gpiocdev::Error> for Error {
    fn from(err: gpiocdev::Error) -> Self {
        Self::GpioChip(err)
    }
}

// Lets our own pin and PWM types speak the embedded-hal traits directly.
impl digital::Error for Error {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for Error {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}
