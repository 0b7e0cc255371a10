//! Hobby servo driver over any `embedded-hal` PWM channel.
//! - 50 Hz frame (20 ms)
//! - angle range mapped linearly onto 1.0..=2.0 ms pulses
//! - the channel's own resolution is used, so any `SetDutyCycle` works

use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::peripherals::AngleSink;
use crate::shared_constants::{SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US, SERVO_PERIOD_US};
use crate::{Error, Result};

pub struct Servo<P> {
    pwm: P,
    min_angle: f32,
    max_angle: f32,
    min_us: u16,
    max_us: u16,
}

impl<P: SetDutyCycle> Servo<P> {
    /// Create on a PWM channel already running a 20 ms frame, and center it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AngleOutOfRange`] if `min_angle >= max_angle`, or a PWM
    /// error while centering.
    pub fn new(pwm: P, min_angle: f32, max_angle: f32) -> Result<Self> {
        if min_angle >= max_angle {
            return Err(Error::AngleOutOfRange {
                angle: min_angle,
                min: min_angle,
                max: max_angle,
            });
        }
        let mut servo = Self {
            pwm,
            min_angle,
            max_angle,
            min_us: SERVO_MIN_PULSE_US,
            max_us: SERVO_MAX_PULSE_US,
        };
        servo.center()?;
        Ok(servo)
    }

    /// Center (~midpoint of min/max).
    ///
    /// # Errors
    ///
    /// PWM errors.
    pub fn center(&mut self) -> Result<()> {
        self.set_pulse_us(self.min_us + (self.max_us - self.min_us) / 2)
    }

    /// Set position in degrees within the configured range.
    ///
    /// # Errors
    ///
    /// [`Error::AngleOutOfRange`] outside the range, or a PWM error.
    pub fn set_degrees(&mut self, degrees: f32) -> Result<()> {
        if !(self.min_angle..=self.max_angle).contains(&degrees) {
            return Err(Error::AngleOutOfRange {
                angle: degrees,
                min: self.min_angle,
                max: self.max_angle,
            });
        }
        let span = f32::from(self.max_us - self.min_us);
        let fraction = (degrees - self.min_angle) / (self.max_angle - self.min_angle);
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "fraction is within 0.0..=1.0"
        )]
        let us = self.min_us + (fraction * span).round() as u16;
        debug!("Servo set_degrees({degrees}) -> {us}µs");
        self.set_pulse_us(us)
    }

    /// Set raw pulse width in microseconds (clamped to frame).
    ///
    /// # Errors
    ///
    /// PWM errors.
    pub fn set_pulse_us(&mut self, us: u16) -> Result<()> {
        let us = us.min(SERVO_PERIOD_US);
        self.pwm
            .set_duty_cycle_fraction(us, SERVO_PERIOD_US)
            .map_err(|err| Error::Pwm(embedded_hal::pwm::Error::kind(&err)))
    }

    /// Stop pulsing (most servos relax).
    ///
    /// # Errors
    ///
    /// PWM errors.
    pub fn relax(&mut self) -> Result<()> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|err| Error::Pwm(embedded_hal::pwm::Error::kind(&err)))
    }

    pub fn into_inner(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> AngleSink for Servo<P> {
    fn set_angle(&mut self, degrees: f32) -> Result<()> {
        self.set_degrees(degrees)
    }
}
