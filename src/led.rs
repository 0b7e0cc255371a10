use embassy_time::{Duration, Instant};

use crate::actuator::AlarmWaveform;
use crate::peripherals::{LedSink, LedTrigger};
use crate::shared_constants::ACTUATOR_POLL;
use crate::Result;

/// Steady on when idle, kernel heartbeat while alarming, dark after exit.
///
/// The blink itself is timed by the LED driver, so ticking does nothing.
pub struct LedAlarm<L> {
    led: L,
}

impl<L: LedSink> LedAlarm<L> {
    #[must_use]
    pub const fn new(led: L) -> Self {
        Self { led }
    }

    #[must_use]
    pub const fn led(&self) -> &L {
        &self.led
    }
}

impl<L: LedSink> AlarmWaveform for LedAlarm<L> {
    fn tick_interval(&self) -> Duration {
        ACTUATOR_POLL
    }

    fn restore_idle(&mut self) -> Result<()> {
        self.led.set_trigger(LedTrigger::DefaultOn)?;
        self.led.set_state(true)
    }

    fn start(&mut self, _now: Instant) -> Result<()> {
        self.led.set_trigger(LedTrigger::Heartbeat)
    }

    fn tick(&mut self, _now: Instant) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.led.set_trigger(LedTrigger::None)?;
        self.led.set_state(false)
    }
}
