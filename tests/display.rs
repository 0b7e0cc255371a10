//! Screen formatting and incremental redraw.

mod common;

use std::thread;
use std::time::Duration as StdDuration;

use common::{DisplayOp, FixedClock, RecordingDisplay, NOON};
use desk_clock::display::{format_date, format_temperature, format_threshold, format_time};
use desk_clock::peripherals::DisplaySink;
use desk_clock::{
    run_display, show_logo, AlarmCoordinator, AppState, Color, DisplayView, Snapshot, TextDisplay,
};
use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use time::macros::datetime;

#[test]
fn fields_format_like_the_panel_expects() {
    assert_eq!(format_temperature(23.46).unwrap().as_str(), " +23.5 C");
    assert_eq!(format_temperature(-5.0).unwrap().as_str(), "  -5.0 C");
    assert_eq!(format_threshold(28).unwrap().as_str(), "+28 ");
    assert_eq!(format_threshold(5).unwrap().as_str(), " +5 ");
    assert_eq!(format_time(NOON).unwrap().as_str(), "12:59:56");
    assert_eq!(format_date(NOON).unwrap().as_str(), " 05-01-24");
}

fn snapshot() -> Snapshot {
    Snapshot {
        temperature: 23.5,
        alarm_active: false,
        threshold: 28,
        rtc: Some(NOON),
        system: Some(datetime!(2024-01-05 12:59:57)),
    }
}

#[test]
fn first_render_draws_everything() {
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();

    assert_eq!(view.render(&mut display, &snapshot()).unwrap(), 6);
    assert_eq!(
        display.texts(),
        [
            (0, 16, " +23.5 C", Color::White),
            (192, 16, "+28 ", Color::White),
            (0, 40, "12:59:56", Color::White),
            (160, 40, " 05-01-24", Color::White),
            (0, 230, "12:59:57", Color::White),
            (160, 230, " 05-01-24", Color::White),
        ]
    );
}

#[test]
fn unchanged_snapshot_draws_nothing() {
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();
    view.render(&mut display, &snapshot()).unwrap();
    display.ops.clear();

    assert_eq!(view.render(&mut display, &snapshot()).unwrap(), 0);
    assert!(display.ops.is_empty());

    view.invalidate();
    assert_eq!(view.render(&mut display, &snapshot()).unwrap(), 6);
}

#[test]
fn only_changed_items_are_redrawn() {
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();
    view.render(&mut display, &snapshot()).unwrap();
    display.ops.clear();

    let mut next = snapshot();
    next.threshold = 27;
    next.system = Some(datetime!(2024-01-05 12:59:58));
    assert_eq!(view.render(&mut display, &next).unwrap(), 3);
    assert_eq!(
        display.texts(),
        [
            (192, 16, "+27 ", Color::White),
            (0, 230, "12:59:58", Color::White),
            (160, 230, " 05-01-24", Color::White),
        ]
    );
}

#[test]
fn alarm_turns_temperature_red() {
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();
    view.render(&mut display, &snapshot()).unwrap();
    display.ops.clear();

    let mut alarming = snapshot();
    alarming.alarm_active = true;
    assert_eq!(view.render(&mut display, &alarming).unwrap(), 1);
    assert_eq!(display.texts(), [(0, 16, " +23.5 C", Color::Red)]);
}

#[test]
fn temperature_stays_red_after_the_alarm_times_out() {
    let state = AppState::new(28);
    state.set_temperature(29.0);
    let clock = FixedClock::at(NOON);
    let mut alarm = AlarmCoordinator::new(Duration::from_secs(20));
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();

    alarm.poll(&state, Instant::from_millis(0));
    view.render(&mut display, &Snapshot::capture(&state, &clock).unwrap())
        .unwrap();
    alarm.poll(&state, Instant::from_millis(20_000));
    assert!(!state.alarm_active());
    display.ops.clear();

    let expired = Snapshot::capture(&state, &clock).unwrap();
    assert!(expired.is_hot());
    assert_eq!(view.render(&mut display, &expired).unwrap(), 0);

    state.set_temperature(28.0);
    view.render(&mut display, &Snapshot::capture(&state, &clock).unwrap())
        .unwrap();
    assert_eq!(display.texts(), [(0, 16, " +28.0 C", Color::White)]);
}

#[test]
fn missing_rtc_reading_is_left_blank() {
    let mut display = RecordingDisplay::default();
    let mut view = DisplayView::new();
    let mut first = snapshot();
    first.rtc = None;

    assert_eq!(view.render(&mut display, &first).unwrap(), 4);
    assert!(display.texts().iter().all(|&(_, y, _, _)| y != 40));
}

#[test]
fn snapshot_reads_shared_state() {
    let state = AppState::new(31);
    state.set_temperature(30.25);
    state.set_wall_clock(NOON);
    let clock = FixedClock::at(datetime!(2024-01-05 13:00:00));

    let snapshot = Snapshot::capture(&state, &clock).unwrap();

    assert_eq!(snapshot.threshold, 31);
    assert!((snapshot.temperature - 30.25).abs() < f32::EPSILON);
    assert_eq!(snapshot.rtc, Some(NOON));
    assert_eq!(snapshot.system, Some(datetime!(2024-01-05 13:00:00)));
    assert!(!snapshot.alarm_active);
}

#[test]
fn run_display_clears_before_and_after() {
    let state = AppState::default();
    let clock = FixedClock::at(NOON);
    let mut display = RecordingDisplay::default();

    thread::scope(|scope| {
        let handle =
            scope.spawn(|| run_display(&state, &mut display, &clock, Duration::from_millis(10)));
        thread::sleep(StdDuration::from_millis(50));
        state.request_shutdown();
        handle.join().unwrap().unwrap();
    });

    assert_eq!(display.ops.first(), Some(&DisplayOp::Clear(Color::Black)));
    assert_eq!(display.ops.last(), Some(&DisplayOp::Clear(Color::Black)));
    let texts = display.texts();
    assert_eq!(texts[0], (80, 112, "desk-clock", Color::Green));
    assert!(texts.len() >= 6);
}

#[test]
fn logo_stays_clear_of_the_field_rows() {
    let mut display = RecordingDisplay::default();
    show_logo(&mut display).unwrap();

    let texts = display.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts
        .iter()
        .all(|&(_, y, _, _)| (40 + 13..230).contains(&y) && y + 13 <= 230));
}

/// A framebuffer big enough for one line of text.
struct Framebuffer {
    pixels: Vec<Rgb565>,
}

const FB_WIDTH: u32 = 120;
const FB_HEIGHT: u32 = 16;

impl Framebuffer {
    fn new() -> Self {
        Self {
            pixels: vec![Rgb565::BLUE; (FB_WIDTH * FB_HEIGHT) as usize],
        }
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(FB_WIDTH, FB_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < FB_WIDTH && y < FB_HEIGHT {
                    self.pixels[(y * FB_WIDTH + x) as usize] = color;
                }
            }
        }
        Ok(())
    }
}

#[test]
fn text_display_draws_glyphs_with_background() {
    let mut display = TextDisplay::new(Framebuffer::new());
    display.clear(Color::Black).unwrap();
    display
        .draw_text(0, 0, "+28", Color::White, Color::Black)
        .unwrap();

    let pixels = &display.target().pixels;
    assert!(pixels.contains(&Rgb565::WHITE));
    assert!(!pixels.contains(&Rgb565::BLUE));
    // Three 8-pixel glyphs, nothing to their right.
    let right_of_text = (0..FB_HEIGHT).flat_map(|y| (24..FB_WIDTH).map(move |x| (x, y)));
    assert!(right_of_text
        .map(|(x, y)| pixels[(y * FB_WIDTH + x) as usize])
        .all(|color| color == Rgb565::BLACK));
}
