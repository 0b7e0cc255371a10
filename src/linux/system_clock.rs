use nix::sys::time::TimeSpec;
use nix::time::{clock_settime, ClockId};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::peripherals::SystemClock;
use crate::{Error, Result};

/// `CLOCK_REALTIME` seen in a fixed local offset.
///
/// The offset is captured once, before any worker thread exists, because
/// `time` refuses to look it up in a multi-threaded process.
#[derive(Clone, Copy, Debug)]
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    #[must_use]
    pub const fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Use the local offset if it can be determined, UTC otherwise.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
    }
}

impl SystemClock for LocalClock {
    fn now(&self) -> Result<PrimitiveDateTime> {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        Ok(PrimitiveDateTime::new(now.date(), now.time()))
    }

    fn set(&mut self, date_time: PrimitiveDateTime) -> Result<()> {
        let seconds = date_time.assume_offset(self.offset).unix_timestamp();
        let seconds = u64::try_from(seconds).map_err(|_| {
            Error::io("CLOCK_REALTIME", std::io::ErrorKind::InvalidInput.into())
        })?;
        let timespec = TimeSpec::from_duration(core::time::Duration::from_secs(seconds));
        clock_settime(ClockId::CLOCK_REALTIME, timespec)
            .map_err(|errno| Error::io("CLOCK_REALTIME", errno.into()))
    }
}
