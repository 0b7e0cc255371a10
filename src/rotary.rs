//! Quadrature decoding for the threshold knob.
//!
//! Only channel A is edge-watched. Channel B is sampled at the instant of each A
//! edge. One detent produces one rising and one falling A edge, and exactly one
//! of the two carries the direction:
//!
//! | A edge  | B | step |
//! |---------|---|------|
//! | rising  | 0 |  0   |
//! | rising  | 1 | −1   |
//! | falling | 1 | +1   |
//! | falling | 0 |  0   |
//!
//! A sample whose A level contradicts its edge (a rising edge that reads low
//! again, say) is contact noise and decodes to 0.

use embassy_time::Duration;
use log::debug;

use crate::app_state::AppState;
use crate::button::Edge;
use crate::peripherals::QuadratureSource;
use crate::shared_constants::{MAX_THRESHOLD, MIN_THRESHOLD};
use crate::Result;

/// The state of both channels at one channel-A edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuadratureSample {
    pub edge: Edge,
    /// Level of channel A read back after the edge.
    pub a_high: bool,
    /// Level of channel B at the edge.
    pub b_high: bool,
}

impl QuadratureSample {
    /// A sample read from a clean edge (A settled at the level the edge implies).
    #[must_use]
    pub const fn clean(edge: Edge, b_high: bool) -> Self {
        Self {
            edge,
            a_high: matches!(edge, Edge::Rising),
            b_high,
        }
    }

    const fn is_genuine(&self) -> bool {
        matches!(
            (self.edge, self.a_high),
            (Edge::Rising, true) | (Edge::Falling, false)
        )
    }
}

/// Signed rotation for one sample: −1, 0 or +1.
#[must_use]
pub const fn decode_step(sample: QuadratureSample) -> i32 {
    if !sample.is_genuine() {
        return 0;
    }
    match (sample.edge, sample.b_high) {
        (Edge::Rising, true) => -1,
        (Edge::Falling, true) => 1,
        (Edge::Rising | Edge::Falling, false) => 0,
    }
}

/// Clamp to the accepted threshold range. Never wraps.
#[must_use]
pub const fn clamp_threshold(value: i32) -> i32 {
    if value < MIN_THRESHOLD {
        MIN_THRESHOLD
    } else if value > MAX_THRESHOLD {
        MAX_THRESHOLD
    } else {
        value
    }
}

/// Apply one sample to the shared threshold. Returns the step applied.
pub fn apply_sample(state: &AppState, sample: QuadratureSample) -> i32 {
    let step = decode_step(sample);
    if step != 0 {
        let threshold = state.adjust_threshold(step);
        debug!("Threshold {threshold} (step {step:+})");
    }
    step
}

/// The sole writer of the threshold.
pub struct RotaryEncoder<Q> {
    source: Q,
}

impl<Q: QuadratureSource> RotaryEncoder<Q> {
    #[must_use]
    pub const fn new(source: Q) -> Self {
        Self { source }
    }

    /// # Errors
    ///
    /// Returns the first error raised by the quadrature source.
    pub fn run(&mut self, state: &AppState, timeout: Duration) -> Result<()> {
        while state.is_running() {
            if let Some(sample) = self.source.wait_sample(timeout)? {
                apply_sample(state, sample);
            }
        }
        Ok(())
    }
}
