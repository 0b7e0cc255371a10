//! Arm waving while the alarm is active.

use embassy_time::{Duration, Instant};

use crate::actuator::AlarmWaveform;
use crate::peripherals::AngleSink;
use crate::shared_constants::{SERVO_HALF_PERIOD, SERVO_SWING_DEGREES, SERVO_TICK};
use crate::Result;

const IDLE_DEGREES: f32 = 0.0;

/// Alternates between `+swing` and `-swing`, flipping once more than
/// `half_period` has passed since the last flip.
#[derive(Clone, Copy, Debug)]
pub struct SquareWave {
    swing: f32,
    half_period: Duration,
    positive: bool,
    last_flip: Instant,
}

impl SquareWave {
    #[must_use]
    pub const fn new(swing: f32, half_period: Duration) -> Self {
        Self {
            swing,
            half_period,
            positive: true,
            last_flip: Instant::MIN,
        }
    }

    /// Restart on the positive side. Returns the first angle.
    pub fn start(&mut self, now: Instant) -> f32 {
        self.positive = true;
        self.last_flip = now;
        self.angle()
    }

    /// The new angle if this tick flipped the wave.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if now.saturating_duration_since(self.last_flip) > self.half_period {
            self.positive = !self.positive;
            self.last_flip = now;
            Some(self.angle())
        } else {
            None
        }
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        if self.positive { self.swing } else { -self.swing }
    }
}

/// Centered when idle, waving ±45° while alarming.
pub struct ServoWave<A> {
    sink: A,
    wave: SquareWave,
}

impl<A: AngleSink> ServoWave<A> {
    #[must_use]
    pub const fn new(sink: A) -> Self {
        Self {
            sink,
            wave: SquareWave::new(SERVO_SWING_DEGREES, SERVO_HALF_PERIOD),
        }
    }

    #[must_use]
    pub const fn sink(&self) -> &A {
        &self.sink
    }

    pub fn into_inner(self) -> A {
        self.sink
    }
}

impl<A: AngleSink> AlarmWaveform for ServoWave<A> {
    fn tick_interval(&self) -> Duration {
        SERVO_TICK
    }

    fn restore_idle(&mut self) -> Result<()> {
        self.sink.set_angle(IDLE_DEGREES)
    }

    fn start(&mut self, now: Instant) -> Result<()> {
        let angle = self.wave.start(now);
        self.sink.set_angle(angle)
    }

    fn tick(&mut self, now: Instant) -> Result<()> {
        match self.wave.tick(now) {
            Some(angle) => self.sink.set_angle(angle),
            None => Ok(()),
        }
    }
}
