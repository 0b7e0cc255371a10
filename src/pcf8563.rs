//! PCF8563 real-time clock over I2C.
//!
//! Time and date live in seven BCD registers starting at 0x02 and are always
//! moved in one block transfer so a read never straddles a seconds rollover.

use embedded_hal::i2c::{Error as _, I2c};
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::peripherals::ClockSource;
use crate::{Error, Result};

pub const DEFAULT_ADDRESS: u8 = 0x51;

const CONTROL1_REG: u8 = 0x00;
const CONTROL2_REG: u8 = 0x01;
const SECONDS_REG: u8 = 0x02;
const ALARM_MINUTE_REG: u8 = 0x09;

const STOP_BIT: u8 = 1 << 5;
const ALARM_INTERRUPT_ENABLE: u8 = 1 << 1;
const ALARM_FLAG: u8 = 1 << 3;
const ALARM_DISABLED: u8 = 0x80;

const CONTROL1_DEFAULT: u8 = 0x00;
const CONTROL2_DEFAULT: u8 = ALARM_INTERRUPT_ENABLE;

const CENTURY: i32 = 2000;

/// Encode 0..=99 as packed BCD.
///
/// # Errors
///
/// [`Error::InvalidBcd`] above 99.
pub fn to_bcd(value: u8) -> Result<u8> {
    if value > 99 {
        return Err(Error::InvalidBcd(value));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// Decode packed BCD.
///
/// # Errors
///
/// [`Error::InvalidBcd`] if either nibble is above 9.
pub fn from_bcd(value: u8) -> Result<u8> {
    let (tens, units) = (value >> 4, value & 0x0F);
    if tens > 9 || units > 9 {
        return Err(Error::InvalidBcd(value));
    }
    Ok(tens * 10 + units)
}

/// The seven time/date registers for `date_time`. Only years 2000..=2099 fit.
///
/// # Errors
///
/// [`Error::YearOutOfRange`] outside the representable century.
pub fn encode_date_time(date_time: PrimitiveDateTime) -> Result<[u8; 7]> {
    let year = date_time.year();
    let Ok(year_of_century) = u8::try_from(year - CENTURY) else {
        return Err(Error::YearOutOfRange(year));
    };
    if year_of_century > 99 {
        return Err(Error::YearOutOfRange(year));
    }
    Ok([
        to_bcd(date_time.second())? & 0x7F,
        to_bcd(date_time.minute())? & 0x7F,
        to_bcd(date_time.hour())? & 0x3F,
        to_bcd(date_time.day())? & 0x3F,
        date_time.weekday().number_days_from_sunday() & 0x07,
        to_bcd(u8::from(date_time.month()))? & 0x1F,
        to_bcd(year_of_century)?,
    ])
}

/// Decode the seven time/date registers, ignoring the voltage-low, weekday and
/// century bits.
///
/// # Errors
///
/// [`Error::InvalidBcd`] or [`Error::InvalidDateTime`] for registers that do not
/// hold a calendar value.
pub fn decode_date_time(registers: [u8; 7]) -> Result<PrimitiveDateTime> {
    let [seconds, minutes, hours, day, _weekday, month, year] = registers;
    let time = Time::from_hms(
        from_bcd(hours & 0x3F)?,
        from_bcd(minutes & 0x7F)?,
        from_bcd(seconds & 0x7F)?,
    )?;
    let month = Month::try_from(from_bcd(month & 0x1F)?)?;
    let year = CENTURY + i32::from(from_bcd(year)?);
    let date = Date::from_calendar_date(year, month, from_bcd(day & 0x3F)?)?;
    Ok(PrimitiveDateTime::new(date, time))
}

pub struct Pcf8563<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Pcf8563<I> {
    /// Wrap the bus without touching the chip.
    #[must_use]
    pub const fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Write the power-on defaults to both control registers: clock running,
    /// alarm interrupt enabled.
    ///
    /// # Errors
    ///
    /// I2C errors.
    pub fn reset_control(&mut self) -> Result<()> {
        self.write_bytes(&[CONTROL1_REG, CONTROL1_DEFAULT, CONTROL2_DEFAULT])
    }

    /// # Errors
    ///
    /// I2C errors.
    pub fn is_stopped(&mut self) -> Result<bool> {
        Ok(self.read_register(CONTROL1_REG)? & STOP_BIT != 0)
    }

    /// Arm the alarm. `None` for `day` or `weekday` leaves that field out of the
    /// match.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBcd`] for values above 99, or an I2C error.
    pub fn set_alarm(
        &mut self,
        hour: u8,
        minute: u8,
        day: Option<u8>,
        weekday: Option<u8>,
    ) -> Result<()> {
        let day = match day {
            Some(day) => to_bcd(day)? & 0x3F,
            None => ALARM_DISABLED,
        };
        let weekday = match weekday {
            Some(weekday) => to_bcd(weekday)? & 0x07,
            None => ALARM_DISABLED,
        };
        self.write_bytes(&[
            ALARM_MINUTE_REG,
            to_bcd(minute)? & 0x7F,
            to_bcd(hour)? & 0x3F,
            day,
            weekday,
        ])
    }

    /// Acknowledge the alarm flag and disable its interrupt.
    ///
    /// # Errors
    ///
    /// I2C errors.
    pub fn clear_alarm(&mut self) -> Result<()> {
        let control2 = self.read_register(CONTROL2_REG)?;
        self.write_bytes(&[
            CONTROL2_REG,
            control2 & !(ALARM_INTERRUPT_ENABLE | ALARM_FLAG),
        ])
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buffer)
            .map_err(|err| Error::I2c(err.kind()))?;
        let [value] = buffer;
        Ok(value)
    }

    fn update_control1(&mut self, update: impl FnOnce(u8) -> u8) -> Result<()> {
        let control1 = self.read_register(CONTROL1_REG)?;
        self.write_bytes(&[CONTROL1_REG, update(control1)])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|err| Error::I2c(err.kind()))
    }
}

impl<I: I2c> ClockSource for Pcf8563<I> {
    fn read(&mut self) -> Result<PrimitiveDateTime> {
        let mut registers = [0u8; 7];
        self.i2c
            .write_read(self.address, &[SECONDS_REG], &mut registers)
            .map_err(|err| Error::I2c(err.kind()))?;
        decode_date_time(registers)
    }

    fn write(&mut self, date_time: PrimitiveDateTime) -> Result<()> {
        let [seconds, minutes, hours, day, weekday, month, year] = encode_date_time(date_time)?;
        self.write_bytes(&[SECONDS_REG, seconds, minutes, hours, day, weekday, month, year])
    }

    fn start(&mut self) -> Result<()> {
        self.update_control1(|control1| control1 & !STOP_BIT)
    }

    fn stop(&mut self) -> Result<()> {
        self.update_control1(|control1| control1 | STOP_BIT)
    }
}
