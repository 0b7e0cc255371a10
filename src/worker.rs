//! Thread plumbing shared by every loop.

use std::thread::{self, Scope, ScopedJoinHandle};

use embassy_time::Duration;
use log::{error, info};

use crate::app_state::AppState;
use crate::shared_constants::SHUTDOWN_POLL;
use crate::{Error, Result};

/// The same span as a `core::time::Duration`, for std and OS calls.
#[must_use]
pub const fn to_std(duration: Duration) -> core::time::Duration {
    core::time::Duration::from_micros(duration.as_micros())
}

/// Block the calling thread for `duration`.
pub fn sleep(duration: Duration) {
    thread::sleep(to_std(duration));
}

/// Sleep for `duration`, waking at least every [`SHUTDOWN_POLL`] to return
/// early once shutdown is requested.
pub fn nap(state: &AppState, duration: Duration) {
    let mut remaining = duration;
    while state.is_running() && remaining > Duration::MIN {
        let slice = remaining.min(SHUTDOWN_POLL);
        sleep(slice);
        remaining -= slice;
    }
}

/// Run one loop body to completion, logging how it ended.
///
/// This is the failure boundary for a loop: an error is logged and the loop
/// stops, and nothing else in the process is told.
pub fn run_worker(name: &str, body: impl FnOnce() -> Result<()>) {
    info!("{name} started");
    match body() {
        Ok(()) => info!("{name} finished"),
        Err(err) => error!("{name} stopped on {:?} error: {err}", err.class()),
    }
}

/// Spawn a named scoped thread running [`run_worker`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the OS refuses to create the thread.
pub fn spawn<'scope, 'env, F>(
    scope: &'scope Scope<'scope, 'env>,
    name: &str,
    body: F,
) -> Result<ScopedJoinHandle<'scope, ()>>
where
    F: FnOnce() -> Result<()> + Send + 'scope,
{
    let thread_name = name.to_owned();
    thread::Builder::new()
        .name(name.to_owned())
        .spawn_scoped(scope, move || run_worker(&thread_name, body))
        .map_err(|err| Error::io(name, err))
}
