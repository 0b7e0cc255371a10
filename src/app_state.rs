//! The one record every loop shares.
//!
//! Each field is its own atomic (or, for the calendar value, its own tiny
//! critical section), so a reader always sees a value some writer stored. The
//! only pair that changes together, the alarm flag and its deadline, is
//! sequenced by [`crate::AlarmCoordinator`].

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use portable_atomic::AtomicF32;
use time::PrimitiveDateTime;

use crate::rotary::clamp_threshold;

/// A one-slot event flag: set by one producer, taken by one consumer.
///
/// A second `set` before the `take` is absorbed, not queued.
#[derive(Debug, Default)]
pub struct Latch(AtomicBool);

impl Latch {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Test-and-reset: returns whether the latch was set, leaving it clear.
    #[must_use]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Look without consuming.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Process-wide state handed by reference to every worker at spawn time.
pub struct AppState {
    running: AtomicBool,
    alarm_active: AtomicBool,
    // Ticks of `embassy_time::Instant`; `Instant::MIN` (0) means "not armed".
    alarm_deadline: AtomicU64,
    threshold: AtomicI32,
    temperature: AtomicF32,
    wall_clock: Mutex<CriticalSectionRawMutex, Cell<Option<PrimitiveDateTime>>>,
    pub button_short_press: Latch,
    pub rotary_short_press: Latch,
    pub rotary_long_press: Latch,
}

impl AppState {
    /// A running state with no alarm, no readings yet, and the given threshold
    /// (clamped to the accepted range).
    #[must_use]
    pub const fn new(threshold: i32) -> Self {
        Self {
            running: AtomicBool::new(true),
            alarm_active: AtomicBool::new(false),
            alarm_deadline: AtomicU64::new(Instant::MIN.as_ticks()),
            threshold: AtomicI32::new(clamp_threshold(threshold)),
            temperature: AtomicF32::new(0.0),
            wall_clock: Mutex::new(Cell::new(None)),
            button_short_press: Latch::new(),
            rotary_short_press: Latch::new(),
            rotary_long_press: Latch::new(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// One-way: once cleared, `running` never becomes true again.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn alarm_active(&self) -> bool {
        self.alarm_active.load(Ordering::Acquire)
    }

    pub fn set_alarm_active(&self, active: bool) {
        self.alarm_active.store(active, Ordering::Release);
    }

    /// The instant at which the current alarm expires, if one is armed.
    #[must_use]
    pub fn alarm_deadline(&self) -> Option<Instant> {
        match self.alarm_deadline.load(Ordering::Acquire) {
            ticks if ticks == Instant::MIN.as_ticks() => None,
            ticks => Some(Instant::from_ticks(ticks)),
        }
    }

    pub fn arm_alarm(&self, deadline: Instant) {
        // Keep the sentinel unambiguous even for a deadline at the epoch.
        let ticks = deadline.as_ticks().max(Instant::MIN.as_ticks() + 1);
        self.alarm_deadline.store(ticks, Ordering::Release);
    }

    pub fn disarm_alarm(&self) {
        self.alarm_deadline
            .store(Instant::MIN.as_ticks(), Ordering::Release);
    }

    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Add `step` to the threshold, clamping to the accepted range. Returns the
    /// new value.
    pub fn adjust_threshold(&self, step: i32) -> i32 {
        let update = |old: i32| Some(clamp_threshold(old.saturating_add(step)));
        // The closure never returns `None`, so both arms carry the old value.
        match self
            .threshold
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, update)
        {
            Ok(old) | Err(old) => clamp_threshold(old.saturating_add(step)),
        }
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature.load(Ordering::Relaxed)
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.temperature.store(celsius, Ordering::Relaxed);
    }

    /// Last calendar value read from the real-time clock, if any.
    #[must_use]
    pub fn wall_clock(&self) -> Option<PrimitiveDateTime> {
        self.wall_clock.lock(Cell::get)
    }

    pub fn set_wall_clock(&self, date_time: PrimitiveDateTime) {
        self.wall_clock.lock(|cell| cell.set(Some(date_time)));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::DEFAULT_THRESHOLD)
    }
}
