//! The main-thread loop: runs the alarm coordinator and serves the input latches.

use embassy_time::{Duration, Instant};
use log::{error, info, warn};

use crate::alarm::{AlarmCoordinator, AlarmTransition};
use crate::app_state::AppState;
use crate::peripherals::{ClockSource, SystemClock};
use crate::shared_constants::{RTC_START_THRESHOLD, RTC_STOP_THRESHOLD};
use crate::worker::nap;
use crate::Result;

pub struct Supervisor<C, S> {
    rtc: C,
    system_clock: S,
    coordinator: AlarmCoordinator,
    rtc_running: bool,
}

impl<C: ClockSource, S: SystemClock> Supervisor<C, S> {
    /// The RTC is assumed to be running at start.
    #[must_use]
    pub const fn new(rtc: C, system_clock: S, alarm_duration: Duration) -> Self {
        Self {
            rtc,
            system_clock,
            coordinator: AlarmCoordinator::new(alarm_duration),
            rtc_running: true,
        }
    }

    #[must_use]
    pub const fn rtc(&self) -> &C {
        &self.rtc
    }

    #[must_use]
    pub const fn system_clock(&self) -> &S {
        &self.system_clock
    }

    #[must_use]
    pub const fn rtc_running(&self) -> bool {
        self.rtc_running
    }

    /// One supervisor step at `now`. Command failures are logged and do not
    /// stop the supervisor.
    pub fn poll(&mut self, state: &AppState, now: Instant) -> Option<AlarmTransition> {
        let transition = self.coordinator.poll(state, now);
        match transition {
            Some(AlarmTransition::Raised { temperature, .. }) => {
                warn!("ALARM! Temperature {temperature:.1}C above threshold");
            }
            Some(AlarmTransition::Cleared { temperature, .. }) => {
                info!("Temperature {temperature:.1}C below threshold. Normal operation");
            }
            Some(AlarmTransition::Expired) => info!("Alarm expired"),
            None => {}
        }

        if state.button_short_press.take() {
            info!("Button short press: copying system time to RTC");
            log_failure("Copy system time to RTC", self.copy_system_time_to_rtc(state));
        }
        if state.rotary_short_press.take() {
            info!("Rotary button short press");
            log_failure("Store threshold in RTC seconds", self.store_threshold_in_rtc(state));
        }
        if state.rotary_long_press.take() {
            info!("Rotary button long press");
            match self.set_system_time_from_rtc() {
                Ok(()) => info!("System time updated successfully"),
                Err(err) => error!("Failed to set system time: {err}"),
            }
        }

        match state.threshold() {
            RTC_STOP_THRESHOLD if self.rtc_running => {
                self.rtc_running = false;
                log_failure("Stop PCF8563", self.rtc.stop().map(|()| info!("PCF8563 stopped")));
            }
            RTC_START_THRESHOLD if !self.rtc_running => {
                self.rtc_running = true;
                log_failure("Start PCF8563", self.rtc.start().map(|()| info!("PCF8563 started")));
            }
            _ => {}
        }

        transition
    }

    /// Poll every `interval` until shutdown.
    pub fn run(&mut self, state: &AppState, interval: Duration) {
        while state.is_running() {
            nap(state, interval);
            if !state.is_running() {
                break;
            }
            self.poll(state, Instant::now());
        }
        info!("Main thread: waiting for child threads stop.");
    }

    fn copy_system_time_to_rtc(&mut self, state: &AppState) -> Result<()> {
        let now = self.system_clock.now()?;
        self.rtc.write(now)?;
        state.set_wall_clock(self.rtc.read()?);
        Ok(())
    }

    fn store_threshold_in_rtc(&mut self, state: &AppState) -> Result<()> {
        let rtc_time = self.rtc.read()?;
        let second = u8::try_from(state.threshold()).unwrap_or(u8::MAX);
        self.rtc.write(rtc_time.replace_second(second)?)
    }

    fn set_system_time_from_rtc(&mut self) -> Result<()> {
        let rtc_time = self.rtc.read()?;
        self.system_clock.set(rtc_time)
    }
}

fn log_failure(action: &str, result: Result<()>) {
    if let Err(err) = result {
        error!("{action} failed: {err}");
    }
}
