//! Display backlight over a PWM channel, and its alarm pulse.

use embassy_time::{Duration, Instant};
use embedded_hal::pwm::SetDutyCycle;

use crate::actuator::AlarmWaveform;
use crate::peripherals::BrightnessSink;
use crate::shared_constants::{BACKLIGHT_STEP, BACKLIGHT_TICK, MAX_BRIGHTNESS};
use crate::{Error, Result};

pub struct Backlight<P> {
    pwm: P,
}

impl<P: SetDutyCycle> Backlight<P> {
    #[must_use]
    pub const fn new(pwm: P) -> Self {
        Self { pwm }
    }

    pub fn into_inner(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> BrightnessSink for Backlight<P> {
    fn set_brightness(&mut self, percent: u8) -> Result<()> {
        if percent > MAX_BRIGHTNESS {
            return Err(Error::BrightnessOutOfRange(percent));
        }
        self.pwm
            .set_duty_cycle_percent(percent)
            .map_err(|err| Error::Pwm(embedded_hal::pwm::Error::kind(&err)))
    }
}

/// A 0..=`MAX_BRIGHTNESS` triangle, one `step` per call, reversing at the ends.
///
/// Starts at full brightness heading down.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    level: u8,
    rising: bool,
    step: u8,
}

impl Triangle {
    #[must_use]
    pub const fn new(step: u8) -> Self {
        Self {
            level: MAX_BRIGHTNESS,
            rising: false,
            step,
        }
    }

    /// The current level, then advance.
    pub fn next_level(&mut self) -> u8 {
        let level = self.level;
        if self.rising {
            if level >= MAX_BRIGHTNESS {
                self.rising = false;
                self.level = level.saturating_sub(self.step);
            } else {
                self.level = level.saturating_add(self.step).min(MAX_BRIGHTNESS);
            }
        } else if level == 0 {
            self.rising = true;
            self.level = self.step.min(MAX_BRIGHTNESS);
        } else {
            self.level = level.saturating_sub(self.step);
        }
        level
    }
}

/// Full brightness when idle, a brightness triangle while alarming.
pub struct BacklightPulse<B> {
    sink: B,
    triangle: Triangle,
}

impl<B: BrightnessSink> BacklightPulse<B> {
    #[must_use]
    pub const fn new(sink: B) -> Self {
        Self {
            sink,
            triangle: Triangle::new(BACKLIGHT_STEP),
        }
    }

    #[must_use]
    pub const fn sink(&self) -> &B {
        &self.sink
    }
}

impl<B: BrightnessSink> AlarmWaveform for BacklightPulse<B> {
    fn tick_interval(&self) -> Duration {
        BACKLIGHT_TICK
    }

    fn restore_idle(&mut self) -> Result<()> {
        self.sink.set_brightness(MAX_BRIGHTNESS)
    }

    fn start(&mut self, _now: Instant) -> Result<()> {
        self.triangle = Triangle::new(BACKLIGHT_STEP);
        self.sink.set_brightness(self.triangle.next_level())
    }

    fn tick(&mut self, _now: Instant) -> Result<()> {
        self.sink.set_brightness(self.triangle.next_level())
    }
}
