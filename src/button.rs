use std::time::SystemTime;

use embassy_time::{Duration, Instant};
use log::{debug, info};

use crate::app_state::AppState;
use crate::peripherals::EdgeSource;
use crate::shared_constants::LONG_PRESS_DURATION;
use crate::Result;

/// Direction of a digital transition.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Edge {
    /// Low to high: the button went down.
    Rising,
    /// High to low: the button came back up.
    Falling,
}

/// One transition as delivered by an edge source, stamped when it happened.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EdgeEvent {
    pub edge: Edge,
    pub at: Instant,
}

impl EdgeEvent {
    #[must_use]
    pub const fn new(edge: Edge, at: Instant) -> Self {
        Self { edge, at }
    }

    /// Map a wall-clock kernel timestamp onto the monotonic clock, given one
    /// reading of both clocks taken together. Stamps from the future count as
    /// `now`.
    #[must_use]
    pub fn from_wall_clock(
        edge: Edge,
        now: Instant,
        wall_now: SystemTime,
        happened: SystemTime,
    ) -> Self {
        let age = wall_now.duration_since(happened).unwrap_or_default();
        let age = Duration::from_micros(u64::try_from(age.as_micros()).unwrap_or(u64::MAX));
        Self::new(edge, now.checked_sub(age).unwrap_or(now))
    }
}

// Instead of having API describing a short vs a long button-press vaguely using a `bool`, we define
// an `enum` to clarify what each state represents.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PressDuration {
    #[default]
    Short,
    Long,
}

// Make `PressDuration` solely responsible for the distinction in `Duration` between a short and long
// button press. Exactly `LONG_PRESS_DURATION` still counts as short.
impl From<Duration> for PressDuration {
    fn from(duration: Duration) -> Self {
        if duration > LONG_PRESS_DURATION {
            Self::Long
        } else {
            Self::Short
        }
    }
}

/// Turns the edge stream of one button into one [`PressDuration`] per
/// press/release cycle.
///
/// Edges are expected to be debounced upstream. A repeated `Rising` while
/// pressed, or a `Falling` while released, is ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct PressClassifier {
    pressed_at: Option<Instant>,
}

impl PressClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self { pressed_at: None }
    }

    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    pub fn on_edge(&mut self, edge: Edge, now: Instant) -> Option<PressDuration> {
        match (edge, self.pressed_at) {
            (Edge::Rising, None) => {
                self.pressed_at = Some(now);
                None
            }
            (Edge::Falling, Some(pressed_at)) => {
                self.pressed_at = None;
                Some(now.saturating_duration_since(pressed_at).into())
            }
            (Edge::Rising, Some(_)) | (Edge::Falling, None) => None,
        }
    }
}

/// What a classified press means for a given physical button.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonRole {
    /// Short press raises `button_short_press`; long press shuts the process down.
    Exit,
    /// Short and long presses raise their own rotary latches.
    Rotary,
}

impl ButtonRole {
    pub fn dispatch(self, state: &AppState, press: PressDuration) {
        match (self, press) {
            (Self::Exit, PressDuration::Short) => state.button_short_press.set(),
            (Self::Exit, PressDuration::Long) => {
                info!("Exit button held, shutting down");
                state.request_shutdown();
            }
            (Self::Rotary, PressDuration::Short) => state.rotary_short_press.set(),
            (Self::Rotary, PressDuration::Long) => state.rotary_long_press.set(),
        }
    }
}

/// A physical button: an edge source plus the meaning of its presses.
pub struct Button<S> {
    source: S,
    role: ButtonRole,
    classifier: PressClassifier,
}

impl<S: EdgeSource> Button<S> {
    #[must_use]
    pub const fn new(source: S, role: ButtonRole) -> Self {
        Self {
            source,
            role,
            classifier: PressClassifier::new(),
        }
    }

    /// Feed one edge through the classifier and act on any completed press.
    pub fn handle(&mut self, state: &AppState, event: EdgeEvent) -> Option<PressDuration> {
        let press = self.classifier.on_edge(event.edge, event.at)?;
        debug!("{:?} button press: {press:?}", self.role);
        self.role.dispatch(state, press);
        Some(press)
    }

    /// Wait for edges (each wait bounded by `timeout`) until shutdown.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the edge source.
    pub fn run(&mut self, state: &AppState, timeout: Duration) -> Result<()> {
        while state.is_running() {
            if let Some(event) = self.source.wait_edge(timeout)? {
                self.handle(state, event);
            }
        }
        Ok(())
    }
}
