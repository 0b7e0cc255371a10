//! MCP9808 digital temperature sensor over I2C.
//!
//! Registers are 16-bit big-endian. The ambient temperature register holds a
//! 13-bit two's-complement value in 1/16 °C steps plus three alert flags.

use embedded_hal::i2c::{Error as _, I2c};

use crate::peripherals::TemperatureSource;
use crate::{Error, Result};

pub const DEFAULT_ADDRESS: u8 = 0x18;

const CONFIG_REG: u8 = 0x01;
const UPPER_LIMIT_REG: u8 = 0x02;
const AMBIENT_REG: u8 = 0x05;
const MANUFACTURER_ID_REG: u8 = 0x06;
const DEVICE_ID_REG: u8 = 0x07;

const EXPECTED_MANUFACTURER_ID: u16 = 0x0054;
const EXPECTED_DEVICE_ID: u16 = 0x0400;

const ALERT_MODE_INTERRUPT: u16 = 1 << 0;
const SIGN_BIT: u16 = 0x1000;
const MAGNITUDE_MASK: u16 = 0x0FFF;
const TEMPERATURE_MASK: u16 = 0x1FFF;

pub const MIN_LIMIT_CELSIUS: f32 = -40.0;
pub const MAX_LIMIT_CELSIUS: f32 = 125.0;

/// Decode the ambient register into °C, ignoring the alert flag bits.
#[must_use]
pub fn celsius_from_raw(raw: u16) -> f32 {
    let magnitude = f32::from(raw & MAGNITUDE_MASK) / 16.0;
    if raw & SIGN_BIT == 0 {
        magnitude
    } else {
        magnitude - 256.0
    }
}

/// Encode a limit temperature, quantized to the 0.25 °C limit resolution.
///
/// # Errors
///
/// [`Error::TemperatureOutOfRange`] outside −40..=125 °C.
pub fn raw_limit_from_celsius(celsius: f32) -> Result<u16> {
    if !(MIN_LIMIT_CELSIUS..=MAX_LIMIT_CELSIUS).contains(&celsius) {
        return Err(Error::TemperatureOutOfRange(celsius));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range check above keeps the value within i16"
    )]
    let quarters = (celsius * 4.0).round() as i16;
    #[expect(clippy::cast_sign_loss, reason = "two's complement is intended")]
    let sixteenths = (quarters * 4) as u16;
    Ok(sixteenths & TEMPERATURE_MASK)
}

pub struct Mcp9808<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mcp9808<I> {
    /// Open the sensor and check it really is an MCP9808.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceId`] if either identification register disagrees, or an
    /// I2C error.
    pub fn new(i2c: I, address: u8) -> Result<Self> {
        let mut sensor = Self { i2c, address };

        let manufacturer = sensor.read_register(MANUFACTURER_ID_REG)?;
        if manufacturer != EXPECTED_MANUFACTURER_ID {
            return Err(Error::DeviceId {
                register: "manufacturer id",
                found: manufacturer,
                expected: EXPECTED_MANUFACTURER_ID,
            });
        }
        // The low byte is the silicon revision.
        let device = sensor.read_register(DEVICE_ID_REG)? & 0xFF00;
        if device != EXPECTED_DEVICE_ID {
            return Err(Error::DeviceId {
                register: "device id",
                found: device,
                expected: EXPECTED_DEVICE_ID,
            });
        }
        Ok(sensor)
    }

    /// # Errors
    ///
    /// I2C errors.
    pub fn temperature(&mut self) -> Result<f32> {
        Ok(celsius_from_raw(self.read_register(AMBIENT_REG)?))
    }

    /// # Errors
    ///
    /// [`Error::TemperatureOutOfRange`] outside −40..=125 °C, or an I2C error.
    pub fn set_upper_limit(&mut self, celsius: f32) -> Result<()> {
        let raw = raw_limit_from_celsius(celsius)?;
        self.write_register(UPPER_LIMIT_REG, raw)
    }

    /// Make the alert pin follow the temperature instead of latching.
    ///
    /// # Errors
    ///
    /// I2C errors.
    pub fn enable_comparator_mode(&mut self) -> Result<()> {
        let config = self.read_register(CONFIG_REG)?;
        self.write_register(CONFIG_REG, config & !ALERT_MODE_INTERRUPT)
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }

    fn read_register(&mut self, register: u8) -> Result<u16> {
        let mut buffer = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buffer)
            .map_err(|err| Error::I2c(err.kind()))?;
        Ok(u16::from_be_bytes(buffer))
    }

    fn write_register(&mut self, register: u8, value: u16) -> Result<()> {
        let [high, low] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[register, high, low])
            .map_err(|err| Error::I2c(err.kind()))
    }
}

impl<I: I2c> TemperatureSource for Mcp9808<I> {
    fn read_celsius(&mut self) -> Result<f32> {
        self.temperature()
    }
}
