//! Latched commands and RTC control served by the supervisor.

mod common;

use std::thread;
use std::time::Duration as StdDuration;

use common::{FakeRtc, FixedClock, RtcCall, NOON};
use desk_clock::{AlarmTransition, AppState, Supervisor, SUPERVISOR_POLL};
use embassy_time::{Duration, Instant};
use time::macros::datetime;

type TestSupervisor = Supervisor<FakeRtc, FixedClock>;

fn supervisor(rtc_time: time::PrimitiveDateTime) -> TestSupervisor {
    Supervisor::new(
        FakeRtc::at(rtc_time),
        FixedClock::at(NOON),
        Duration::from_secs(20),
    )
}

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

#[test]
fn idle_poll_touches_nothing() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(NOON);
    assert_eq!(supervisor.poll(&state, at(0)), None);
    assert!(supervisor.rtc().calls.is_empty());
    assert!(supervisor.system_clock().sets.is_empty());
}

#[test]
fn button_press_copies_system_time_to_rtc() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(datetime!(2023-07-01 00:00:00));
    state.button_short_press.set();

    supervisor.poll(&state, at(0));

    assert_eq!(
        supervisor.rtc().calls,
        [RtcCall::Write(NOON), RtcCall::Read]
    );
    assert_eq!(state.wall_clock(), Some(NOON));
    assert!(!state.button_short_press.is_set());

    supervisor.poll(&state, at(100));
    assert_eq!(supervisor.rtc().calls.len(), 2);
}

#[test]
fn rotary_short_press_stores_threshold_as_seconds() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(datetime!(2024-01-05 10:00:05));
    state.rotary_short_press.set();

    supervisor.poll(&state, at(0));

    assert_eq!(supervisor.rtc().time, datetime!(2024-01-05 10:00:28));
    assert!(!state.rotary_short_press.is_set());
}

#[test]
fn threshold_too_large_for_seconds_is_not_written() {
    let state = AppState::new(60);
    let mut supervisor = supervisor(datetime!(2024-01-05 10:00:05));
    state.rotary_short_press.set();

    supervisor.poll(&state, at(0));

    assert!(!supervisor
        .rtc()
        .calls
        .iter()
        .any(|call| matches!(call, RtcCall::Write(_))));
    assert_eq!(supervisor.rtc().time, datetime!(2024-01-05 10:00:05));
}

#[test]
fn rotary_long_press_sets_system_time_from_rtc() {
    let state = AppState::new(28);
    let rtc_time = datetime!(2024-02-29 06:30:00);
    let mut supervisor = supervisor(rtc_time);
    state.rotary_long_press.set();

    supervisor.poll(&state, at(0));

    assert_eq!(supervisor.system_clock().sets, [rtc_time]);
    assert!(!state.rotary_long_press.is_set());
}

#[test]
fn rtc_stop_and_start_fire_once_per_crossing() {
    let state = AppState::new(58);
    let mut supervisor = supervisor(NOON);
    supervisor.poll(&state, at(0));
    assert!(supervisor.rtc().calls.is_empty());

    state.adjust_threshold(2);
    supervisor.poll(&state, at(100));
    supervisor.poll(&state, at(200));
    assert_eq!(supervisor.rtc().calls, [RtcCall::Stop]);
    assert!(!supervisor.rtc_running());
    assert!(!supervisor.rtc().running);

    state.adjust_threshold(-1);
    supervisor.poll(&state, at(300));
    supervisor.poll(&state, at(400));
    assert_eq!(supervisor.rtc().calls, [RtcCall::Stop, RtcCall::Start]);
    assert!(supervisor.rtc_running());

    state.adjust_threshold(-1);
    supervisor.poll(&state, at(500));
    assert_eq!(supervisor.rtc().calls.len(), 2);
}

#[test]
fn start_is_not_sent_to_a_running_rtc() {
    let state = AppState::new(59);
    let mut supervisor = supervisor(NOON);
    supervisor.poll(&state, at(0));
    assert!(supervisor.rtc().calls.is_empty());
}

#[test]
fn rtc_failures_are_logged_and_survived() {
    let state = AppState::new(60);
    let mut rtc = FakeRtc::at(NOON);
    rtc.fail = true;
    let mut supervisor = Supervisor::new(rtc, FixedClock::at(NOON), Duration::from_secs(20));
    state.button_short_press.set();
    state.rotary_long_press.set();

    supervisor.poll(&state, at(0));

    assert!(!state.button_short_press.is_set());
    assert!(!state.rotary_long_press.is_set());
    assert!(!supervisor.rtc_running());
    assert!(supervisor.system_clock().sets.is_empty());
    assert_eq!(state.wall_clock(), None);
}

#[test]
fn poll_runs_the_alarm_coordinator() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(NOON);
    state.set_temperature(29.0);

    assert!(matches!(
        supervisor.poll(&state, at(0)),
        Some(AlarmTransition::Raised { .. })
    ));
    assert!(state.alarm_active());
    assert_eq!(
        supervisor.poll(&state, at(20_000)),
        Some(AlarmTransition::Expired)
    );
    assert!(!state.alarm_active());
}

#[test]
fn run_returns_after_shutdown() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(NOON);
    state.button_short_press.set();

    thread::scope(|scope| {
        let handle = scope.spawn(|| supervisor.run(&state, SUPERVISOR_POLL));
        thread::sleep(StdDuration::from_millis(250));
        state.request_shutdown();
        handle.join().unwrap();
    });

    assert_eq!(state.wall_clock(), Some(NOON));
}

#[test]
fn run_leaves_latches_alone_once_shutdown_is_requested() {
    let state = AppState::new(28);
    let mut supervisor = supervisor(datetime!(2024-02-29 06:30:00));

    thread::scope(|scope| {
        let handle = scope.spawn(|| supervisor.run(&state, SUPERVISOR_POLL));
        thread::sleep(StdDuration::from_millis(30));
        state.rotary_long_press.set();
        state.request_shutdown();
        handle.join().unwrap();
    });

    assert!(supervisor.system_clock().sets.is_empty());
    assert!(state.rotary_long_press.is_set());
}
