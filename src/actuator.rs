//! The loop every alarm actuator runs.
//!
//! Each actuator polls `alarm_active` on its own and keeps its own waveform
//! timing. The coordinator never talks to an actuator directly.

use embassy_time::{Duration, Instant};
use log::{debug, info};

use crate::app_state::AppState;
use crate::worker::nap;
use crate::Result;

/// An output that idles at a fixed level and plays a pattern while the alarm
/// is active.
pub trait AlarmWaveform {
    /// How often [`AlarmWaveform::tick`] wants to run while alarming.
    fn tick_interval(&self) -> Duration;

    /// Drive the idle output.
    ///
    /// # Errors
    ///
    /// Any device error.
    fn restore_idle(&mut self) -> Result<()>;

    /// Begin the pattern at `now`.
    ///
    /// # Errors
    ///
    /// Any device error.
    fn start(&mut self, now: Instant) -> Result<()>;

    /// Advance the pattern to `now`.
    ///
    /// # Errors
    ///
    /// Any device error.
    fn tick(&mut self, now: Instant) -> Result<()>;

    /// Leave the device as it should stay after the process exits.
    ///
    /// # Errors
    ///
    /// Any device error.
    fn shutdown(&mut self) -> Result<()> {
        self.restore_idle()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ActuatorPhase {
    #[default]
    Idle,
    Alarming,
}

/// One actuator's private `Idle`/`Alarming` state machine.
pub struct Actuator<W> {
    waveform: W,
    phase: ActuatorPhase,
}

impl<W: AlarmWaveform> Actuator<W> {
    #[must_use]
    pub const fn new(waveform: W) -> Self {
        Self {
            waveform,
            phase: ActuatorPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> ActuatorPhase {
        self.phase
    }

    #[must_use]
    pub const fn waveform(&self) -> &W {
        &self.waveform
    }

    /// React to one observation of the alarm flag.
    ///
    /// Entering the alarm starts the pattern, staying in it ticks the pattern,
    /// and leaving it restores idle exactly once.
    ///
    /// # Errors
    ///
    /// Any device error from the waveform.
    pub fn observe(&mut self, alarm_active: bool, now: Instant) -> Result<()> {
        match (self.phase, alarm_active) {
            (ActuatorPhase::Idle, true) => {
                debug!("Alarm waveform started");
                self.waveform.start(now)?;
                self.phase = ActuatorPhase::Alarming;
            }
            (ActuatorPhase::Alarming, true) => self.waveform.tick(now)?,
            (ActuatorPhase::Alarming, false) => {
                debug!("Alarm waveform stopped");
                self.waveform.restore_idle()?;
                self.phase = ActuatorPhase::Idle;
            }
            (ActuatorPhase::Idle, false) => {}
        }
        Ok(())
    }

    /// How long to wait before the next observation.
    #[must_use]
    pub fn next_wait(&self, poll: Duration) -> Duration {
        match self.phase {
            ActuatorPhase::Idle => poll,
            ActuatorPhase::Alarming => self.waveform.tick_interval(),
        }
    }

    /// Consume the actuator, leaving the device in its exit state.
    ///
    /// # Errors
    ///
    /// Any device error from the waveform.
    pub fn finish(mut self) -> Result<W> {
        self.waveform.shutdown()?;
        Ok(self.waveform)
    }
}

/// Drive `waveform` from the shared alarm flag until shutdown.
///
/// # Errors
///
/// Stops at the first device error.
pub fn run_actuator<W: AlarmWaveform>(state: &AppState, waveform: W, poll: Duration) -> Result<W> {
    let mut actuator = Actuator::new(waveform);
    actuator.waveform.restore_idle()?;
    while state.is_running() {
        actuator.observe(state.alarm_active(), Instant::now())?;
        nap(state, actuator.next_wait(poll));
    }
    info!("Restoring actuator exit state");
    actuator.finish()
}
