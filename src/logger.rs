//! A small stderr backend for the `log` facade.
//!
//! Lines look like `WARN  [main] ALARM! Temperature 29.0C above threshold`.

use std::io::Write as _;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use owo_colors::OwoColorize;

pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("?");
        let level = format!("{:<5}", record.level());
        let level = match record.level() {
            Level::Error => level.red().bold().to_string(),
            Level::Warn => level.yellow().bold().to_string(),
            Level::Info => level.green().to_string(),
            Level::Debug => level.blue().to_string(),
            Level::Trace => level.dimmed().to_string(),
        };
        // Nothing sensible to do if stderr is gone.
        let _ = writeln!(
            std::io::stderr().lock(),
            "{level} [{}] {}",
            thread_name.cyan(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the stderr logger as the global logger.
///
/// # Errors
///
/// Returns an error if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}
