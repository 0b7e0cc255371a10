//! What the panel shows, and the loop that keeps it current.

use core::fmt::Write as _;

use embassy_time::Duration;
use embedded_graphics::mono_font::ascii::FONT_8X13;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use time::PrimitiveDateTime;

use crate::app_state::AppState;
use crate::peripherals::{DisplaySink, SystemClock};
use crate::worker::nap;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
}

impl From<Color> for Rgb565 {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Self::BLACK,
            Color::White => Self::WHITE,
            Color::Red => Self::RED,
            Color::Green => Self::GREEN,
            Color::Blue => Self::BLUE,
        }
    }
}

/// Any RGB565 draw target, written to as lines of monospace text.
pub struct TextDisplay<D> {
    target: D,
}

impl<D> TextDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
    Error: From<D::Error>,
{
    #[must_use]
    pub const fn new(target: D) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> &D {
        &self.target
    }
}

impl<D> DisplaySink for TextDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
    Error: From<D::Error>,
{
    fn clear(&mut self, color: Color) -> Result<()> {
        self.target.clear(color.into())?;
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Color, bg: Color) -> Result<()> {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_8X13)
            .text_color(fg.into())
            .background_color(bg.into())
            .build();
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(&mut self.target)?;
        Ok(())
    }
}

// Screen layout
const TEMPERATURE_AT: (i32, i32) = (0, 16);
const THRESHOLD_AT: (i32, i32) = (192, 16);
const RTC_TIME_AT: (i32, i32) = (0, 40);
const RTC_DATE_AT: (i32, i32) = (160, 40);
const SYSTEM_TIME_AT: (i32, i32) = (0, 230);
const SYSTEM_DATE_AT: (i32, i32) = (160, 230);
const LOGO_TITLE_AT: (i32, i32) = (80, 112);
const LOGO_SUBTITLE_AT: (i32, i32) = (48, 128);

type Field = String<16>;

/// Everything the screen shows, captured at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub temperature: f32,
    pub alarm_active: bool,
    pub threshold: i32,
    pub rtc: Option<PrimitiveDateTime>,
    pub system: Option<PrimitiveDateTime>,
}

impl Snapshot {
    /// # Errors
    ///
    /// Returns an error if the system clock cannot be read.
    pub fn capture(state: &AppState, clock: &impl SystemClock) -> Result<Self> {
        Ok(Self {
            temperature: state.temperature(),
            alarm_active: state.alarm_active(),
            threshold: state.threshold(),
            rtc: state.wall_clock(),
            system: Some(clock.now()?),
        })
    }

    /// Red while alarming, and still red after the alarm times out as long as
    /// the temperature stays above the threshold.
    #[must_use]
    pub fn is_hot(&self) -> bool {
        #[expect(clippy::cast_precision_loss, reason = "threshold is within 0..=60")]
        let threshold = self.threshold as f32;
        self.alarm_active || self.temperature > threshold
    }
}

/// Formats `{:+6.1} C`, e.g. ` +23.5 C`.
///
/// # Errors
///
/// [`Error::FormatError`] if the text does not fit.
pub fn format_temperature(celsius: f32) -> Result<Field> {
    let mut text = Field::new();
    write!(text, "{celsius:+6.1} C")?;
    Ok(text)
}

/// Formats `{:+3} `, e.g. `+28 `.
///
/// # Errors
///
/// [`Error::FormatError`] if the text does not fit.
pub fn format_threshold(threshold: i32) -> Result<Field> {
    let mut text = Field::new();
    write!(text, "{threshold:+3} ")?;
    Ok(text)
}

/// Formats `HH:MM:SS`.
///
/// # Errors
///
/// [`Error::FormatError`] if the text does not fit.
pub fn format_time(date_time: PrimitiveDateTime) -> Result<Field> {
    let mut text = Field::new();
    write!(
        text,
        "{:02}:{:02}:{:02}",
        date_time.hour(),
        date_time.minute(),
        date_time.second()
    )?;
    Ok(text)
}

/// Formats ` DD-MM-YY`.
///
/// # Errors
///
/// [`Error::FormatError`] if the text does not fit.
pub fn format_date(date_time: PrimitiveDateTime) -> Result<Field> {
    let mut text = Field::new();
    write!(
        text,
        " {:02}-{:02}-{:02}",
        date_time.day(),
        u8::from(date_time.month()),
        date_time.year().rem_euclid(100)
    )?;
    Ok(text)
}

/// Remembers what is on screen so each refresh redraws only what changed.
#[derive(Debug, Default)]
pub struct DisplayView {
    temperature: Option<(Field, bool)>,
    threshold: Option<Field>,
    rtc: Option<(Field, Field)>,
    system: Option<(Field, Field)>,
}

impl DisplayView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what is on screen, so the next render redraws everything.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Draw the items of `snapshot` that differ from the last render. Returns
    /// how many items were drawn.
    ///
    /// # Errors
    ///
    /// The first display error.
    pub fn render(&mut self, sink: &mut impl DisplaySink, snapshot: &Snapshot) -> Result<usize> {
        let mut drawn = 0;

        let temperature = (format_temperature(snapshot.temperature)?, snapshot.is_hot());
        if self.temperature.as_ref() != Some(&temperature) {
            let fg = if temperature.1 { Color::Red } else { Color::White };
            draw(sink, TEMPERATURE_AT, &temperature.0, fg)?;
            self.temperature = Some(temperature);
            drawn += 1;
        }

        let threshold = format_threshold(snapshot.threshold)?;
        if self.threshold.as_ref() != Some(&threshold) {
            draw(sink, THRESHOLD_AT, &threshold, Color::White)?;
            self.threshold = Some(threshold);
            drawn += 1;
        }

        if let Some(rtc) = snapshot.rtc {
            drawn += render_clock(sink, &mut self.rtc, rtc, RTC_TIME_AT, RTC_DATE_AT)?;
        }
        if let Some(system) = snapshot.system {
            drawn += render_clock(sink, &mut self.system, system, SYSTEM_TIME_AT, SYSTEM_DATE_AT)?;
        }
        Ok(drawn)
    }
}

fn render_clock(
    sink: &mut impl DisplaySink,
    shown: &mut Option<(Field, Field)>,
    date_time: PrimitiveDateTime,
    time_at: (i32, i32),
    date_at: (i32, i32),
) -> Result<usize> {
    let fields = (format_time(date_time)?, format_date(date_time)?);
    if shown.as_ref() == Some(&fields) {
        return Ok(0);
    }
    draw(sink, time_at, &fields.0, Color::White)?;
    draw(sink, date_at, &fields.1, Color::White)?;
    *shown = Some(fields);
    Ok(2)
}

fn draw(sink: &mut impl DisplaySink, (x, y): (i32, i32), text: &str, fg: Color) -> Result<()> {
    sink.draw_text(x, y, text, fg, Color::Black)
}

/// Splash drawn once at startup, between the top rows and the system clock.
///
/// # Errors
///
/// The first display error.
pub fn show_logo(sink: &mut impl DisplaySink) -> Result<()> {
    draw(sink, LOGO_TITLE_AT, "desk-clock", Color::Green)?;
    draw(sink, LOGO_SUBTITLE_AT, "MCP9808 + PCF8563", Color::Blue)
}

/// Clear and show the logo, then refresh every `refresh` until shutdown, then
/// clear again.
///
/// # Errors
///
/// Stops at the first display or clock error.
pub fn run_display(
    state: &AppState,
    sink: &mut impl DisplaySink,
    clock: &impl SystemClock,
    refresh: Duration,
) -> Result<()> {
    sink.clear(Color::Black)?;
    show_logo(sink)?;
    let mut view = DisplayView::new();
    while state.is_running() {
        let snapshot = Snapshot::capture(state, clock)?;
        view.render(sink, &snapshot)?;
        nap(state, refresh);
    }
    sink.clear(Color::Black)
}
