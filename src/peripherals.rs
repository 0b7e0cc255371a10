//! Capabilities the loops depend on.
//!
//! Each loop is generic over the trait it needs, so the same loop body drives a
//! real device on the board and an in-memory double under test.

use embassy_time::Duration;
use time::PrimitiveDateTime;

use crate::button::EdgeEvent;
use crate::display::Color;
use crate::rotary::QuadratureSample;
use crate::Result;

pub trait TemperatureSource {
    /// # Errors
    ///
    /// Transport errors from the underlying bus.
    fn read_celsius(&mut self) -> Result<f32>;
}

/// A battery-backed calendar clock.
pub trait ClockSource {
    /// # Errors
    ///
    /// Transport errors, or a register that does not hold a calendar value.
    fn read(&mut self) -> Result<PrimitiveDateTime>;
    /// # Errors
    ///
    /// Transport errors, or a value the clock cannot represent.
    fn write(&mut self, date_time: PrimitiveDateTime) -> Result<()>;
    /// # Errors
    ///
    /// Transport errors.
    fn start(&mut self) -> Result<()>;
    /// # Errors
    ///
    /// Transport errors.
    fn stop(&mut self) -> Result<()>;
}

/// The host's own wall clock.
pub trait SystemClock {
    /// # Errors
    ///
    /// Returns an error if the local time cannot be determined.
    fn now(&self) -> Result<PrimitiveDateTime>;
    /// # Errors
    ///
    /// Returns an error if the process may not set the clock.
    fn set(&mut self, date_time: PrimitiveDateTime) -> Result<()>;
}

pub trait DisplaySink {
    /// # Errors
    ///
    /// Returns [`crate::Error::DisplayWrite`] or a transport error.
    fn clear(&mut self, color: Color) -> Result<()>;
    /// Draw `text` with its top-left corner at (`x`, `y`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DisplayWrite`] or a transport error.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Color, bg: Color) -> Result<()>;
}

/// Kernel LED triggers the alarm cares about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LedTrigger {
    None,
    DefaultOn,
    Heartbeat,
}

impl LedTrigger {
    /// Name as written to a sysfs `trigger` file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DefaultOn => "default-on",
            Self::Heartbeat => "heartbeat",
        }
    }
}

pub trait LedSink {
    /// # Errors
    ///
    /// Transport errors.
    fn set_trigger(&mut self, trigger: LedTrigger) -> Result<()>;
    /// # Errors
    ///
    /// Transport errors.
    fn set_state(&mut self, on: bool) -> Result<()>;
}

pub trait BrightnessSink {
    /// # Errors
    ///
    /// [`crate::Error::BrightnessOutOfRange`] above 100, or a transport error.
    fn set_brightness(&mut self, percent: u8) -> Result<()>;
}

pub trait AngleSink {
    /// # Errors
    ///
    /// [`crate::Error::AngleOutOfRange`] outside the configured range, or a
    /// transport error.
    fn set_angle(&mut self, degrees: f32) -> Result<()>;
}

/// Debounced button edges.
pub trait EdgeSource {
    /// Wait up to `timeout` for the next edge. `Ok(None)` means the wait timed out.
    ///
    /// # Errors
    ///
    /// Transport errors.
    fn wait_edge(&mut self, timeout: Duration) -> Result<Option<EdgeEvent>>;
}

/// Channel-A edges of a quadrature encoder with channel B sampled alongside.
pub trait QuadratureSource {
    /// Wait up to `timeout` for the next channel-A edge. `Ok(None)` means the
    /// wait timed out.
    ///
    /// # Errors
    ///
    /// Transport errors.
    fn wait_sample(&mut self, timeout: Duration) -> Result<Option<QuadratureSample>>;
}
