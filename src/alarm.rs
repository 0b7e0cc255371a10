use embassy_time::{Duration, Instant};

use crate::app_state::AppState;

/// The coordinator's verdict from the last poll.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AlarmMode {
    #[default]
    Normal,
    Alarming,
}

/// What changed on a poll, if anything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlarmTransition {
    /// Temperature rose above the threshold: alarm armed and active.
    Raised { temperature: f32, threshold: i32 },
    /// Temperature fell back to or below the threshold.
    Cleared { temperature: f32, threshold: i32 },
    /// Still above threshold, but the alarm outlived its deadline and was silenced.
    Expired,
}

/// Decides Normal vs Alarming from temperature and threshold, firing only on a
/// crossing, and owns the (active, deadline) pair in [`AppState`].
///
/// Arming stores the deadline before raising the flag, and clearing drops the
/// flag before the deadline, so any reader that sees `alarm_active` also sees a
/// deadline.
#[derive(Clone, Copy, Debug)]
pub struct AlarmCoordinator {
    mode: AlarmMode,
    duration: Duration,
}

impl AlarmCoordinator {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            mode: AlarmMode::Normal,
            duration,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AlarmMode {
        self.mode
    }

    pub fn poll(&mut self, state: &AppState, now: Instant) -> Option<AlarmTransition> {
        let temperature = state.temperature();
        let threshold = state.threshold();
        #[expect(clippy::cast_precision_loss, reason = "threshold is within 0..=60")]
        let above = temperature > threshold as f32;

        match (self.mode, above) {
            (AlarmMode::Normal, true) => {
                let deadline = now.checked_add(self.duration).unwrap_or(Instant::MAX);
                state.arm_alarm(deadline);
                state.set_alarm_active(true);
                self.mode = AlarmMode::Alarming;
                Some(AlarmTransition::Raised {
                    temperature,
                    threshold,
                })
            }
            (AlarmMode::Alarming, false) => {
                state.set_alarm_active(false);
                state.disarm_alarm();
                self.mode = AlarmMode::Normal;
                Some(AlarmTransition::Cleared {
                    temperature,
                    threshold,
                })
            }
            (AlarmMode::Alarming, true) => {
                let deadline = state.alarm_deadline()?;
                if state.alarm_active() && now >= deadline {
                    state.set_alarm_active(false);
                    state.disarm_alarm();
                    Some(AlarmTransition::Expired)
                } else {
                    None
                }
            }
            (AlarmMode::Normal, false) => None,
        }
    }
}

impl Default for AlarmCoordinator {
    fn default() -> Self {
        Self::new(crate::shared_constants::ALARM_DURATION)
    }
}
