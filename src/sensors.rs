use embassy_time::Duration;
use log::debug;

use crate::app_state::AppState;
use crate::peripherals::{ClockSource, TemperatureSource};
use crate::worker::nap;
use crate::Result;

/// Publish a temperature reading every `period` until shutdown.
///
/// # Errors
///
/// Stops at the first sensor error.
pub fn run_thermometer(
    state: &AppState,
    sensor: &mut impl TemperatureSource,
    period: Duration,
) -> Result<()> {
    while state.is_running() {
        let celsius = sensor.read_celsius()?;
        debug!("Temperature {celsius:.2} °C");
        state.set_temperature(celsius);
        nap(state, period);
    }
    Ok(())
}

/// Publish the RTC's calendar value every `period` until shutdown.
///
/// # Errors
///
/// Stops at the first clock error.
pub fn run_clock(state: &AppState, rtc: &mut impl ClockSource, period: Duration) -> Result<()> {
    while state.is_running() {
        let now = rtc.read()?;
        state.set_wall_clock(now);
        nap(state, period);
    }
    Ok(())
}
