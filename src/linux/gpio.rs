//! GPIO lines through the character device (`/dev/gpiochipN`).

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use gpiocdev::line::{Bias, EdgeDetection, EdgeKind, Offset, Value};
use gpiocdev::Request;

use crate::button::{Edge, EdgeEvent};
use crate::peripherals::{EdgeSource, QuadratureSource};
use crate::rotary::QuadratureSample;
use crate::worker::to_std;
use crate::{Error, Result};

const fn edge_from_kind(kind: EdgeKind) -> Edge {
    match kind {
        EdgeKind::Rising => Edge::Rising,
        EdgeKind::Falling => Edge::Falling,
    }
}

/// One requested line.
pub struct GpioLine {
    request: Request,
    offset: Offset,
}

impl GpioLine {
    /// An input with pull-down that reports both edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip cannot be opened or the line is busy.
    pub fn edge_input(chip: &str, offset: Offset, consumer: &str) -> Result<Self> {
        let request = Request::builder()
            .on_chip(chip)
            .with_consumer(consumer)
            .with_line(offset)
            .as_input()
            .with_bias(Bias::PullDown)
            .with_edge_detection(EdgeDetection::BothEdges)
            .request()?;
        Ok(Self { request, offset })
    }

    /// A plain input with pull-down.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip cannot be opened or the line is busy.
    pub fn input(chip: &str, offset: Offset, consumer: &str) -> Result<Self> {
        let request = Request::builder()
            .on_chip(chip)
            .with_consumer(consumer)
            .with_line(offset)
            .as_input()
            .with_bias(Bias::PullDown)
            .request()?;
        Ok(Self { request, offset })
    }

    /// An output starting low.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip cannot be opened or the line is busy.
    pub fn output(chip: &str, offset: Offset, consumer: &str) -> Result<Self> {
        let request = Request::builder()
            .on_chip(chip)
            .with_consumer(consumer)
            .with_line(offset)
            .as_output(Value::Inactive)
            .request()?;
        Ok(Self { request, offset })
    }

    fn level(&self) -> Result<bool> {
        Ok(self.request.value(self.offset)? == Value::Active)
    }

    fn wait_kernel_edge(&self, timeout: Duration) -> Result<Option<EdgeKind>> {
        if !self.request.wait_edge_event(to_std(timeout))? {
            return Ok(None);
        }
        Ok(Some(self.request.read_edge_event()?.kind))
    }
}

impl ErrorType for GpioLine {
    type Error = Error;
}

impl InputPin for GpioLine {
    fn is_high(&mut self) -> Result<bool> {
        self.level()
    }

    fn is_low(&mut self) -> Result<bool> {
        Ok(!self.level()?)
    }
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<()> {
        self.request.set_value(self.offset, Value::Inactive)?;
        Ok(())
    }

    fn set_high(&mut self) -> Result<()> {
        self.request.set_value(self.offset, Value::Active)?;
        Ok(())
    }
}

impl EdgeSource for GpioLine {
    fn wait_edge(&mut self, timeout: Duration) -> Result<Option<EdgeEvent>> {
        Ok(self
            .wait_kernel_edge(timeout)?
            .map(|kind| EdgeEvent::new(edge_from_kind(kind), Instant::now())))
    }
}

/// Encoder channel A (edge-watched) and channel B (sampled).
pub struct QuadratureLines {
    a: GpioLine,
    b: GpioLine,
}

impl QuadratureLines {
    #[must_use]
    pub const fn new(a: GpioLine, b: GpioLine) -> Self {
        Self { a, b }
    }
}

impl QuadratureSource for QuadratureLines {
    fn wait_sample(&mut self, timeout: Duration) -> Result<Option<QuadratureSample>> {
        let Some(kind) = self.a.wait_kernel_edge(timeout)? else {
            return Ok(None);
        };
        Ok(Some(QuadratureSample {
            edge: edge_from_kind(kind),
            a_high: self.a.level()?,
            b_high: self.b.level()?,
        }))
    }
}
