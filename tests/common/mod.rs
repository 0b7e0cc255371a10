//! In-memory doubles for the device traits.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;

use desk_clock::peripherals::{
    AngleSink, BrightnessSink, ClockSource, DisplaySink, EdgeSource, LedSink, LedTrigger,
    QuadratureSource, SystemClock,
};
use desk_clock::{AppState, Color, EdgeEvent, Error, QuadratureSample, Result};
use embassy_time::Duration;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, I2c};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal::spi::{self, SpiDevice};
use time::macros::datetime;
use time::PrimitiveDateTime;

pub const NOON: PrimitiveDateTime = datetime!(2024-01-05 12:59:56);

/// A chip with 8-bit registers and an auto-incrementing register pointer, like
/// the PCF8563.
#[derive(Debug)]
pub struct ByteRegisterI2c {
    pub address: u8,
    pub registers: [u8; 16],
    pub writes: Vec<Vec<u8>>,
    pub fail: bool,
    pointer: usize,
}

impl ByteRegisterI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 16],
            writes: Vec::new(),
            fail: false,
            pointer: 0,
        }
    }
}

impl i2c::ErrorType for ByteRegisterI2c {
    type Error = i2c::ErrorKind;
}

impl I2c for ByteRegisterI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> core::result::Result<(), Self::Error> {
        if self.fail {
            return Err(i2c::ErrorKind::Bus);
        }
        if address != self.address {
            return Err(i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                i2c::Operation::Write(bytes) => {
                    self.writes.push(bytes.to_vec());
                    if let Some((&register, data)) = bytes.split_first() {
                        self.pointer = usize::from(register);
                        for &byte in data {
                            self.registers[self.pointer % 16] = byte;
                            self.pointer += 1;
                        }
                    }
                }
                i2c::Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[self.pointer % 16];
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A chip with 16-bit big-endian registers, like the MCP9808.
#[derive(Debug, Default)]
pub struct WordRegisterI2c {
    pub address: u8,
    pub registers: HashMap<u8, u16>,
    pub fail: bool,
    pointer: u8,
}

impl WordRegisterI2c {
    /// A genuine MCP9808 reading `ambient`.
    pub fn mcp9808(ambient: u16) -> Self {
        let mut registers = HashMap::new();
        registers.insert(0x01, 0x0001);
        registers.insert(0x05, ambient);
        registers.insert(0x06, 0x0054);
        registers.insert(0x07, 0x0400);
        Self {
            address: 0x18,
            registers,
            fail: false,
            pointer: 0,
        }
    }
}

impl i2c::ErrorType for WordRegisterI2c {
    type Error = i2c::ErrorKind;
}

impl I2c for WordRegisterI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> core::result::Result<(), Self::Error> {
        if self.fail {
            return Err(i2c::ErrorKind::Bus);
        }
        if address != self.address {
            return Err(i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                i2c::Operation::Write(bytes) => match **bytes {
                    [register] => self.pointer = register,
                    [register, high, low] => {
                        self.pointer = register;
                        self.registers
                            .insert(register, u16::from_be_bytes([high, low]));
                    }
                    _ => return Err(i2c::ErrorKind::Other),
                },
                i2c::Operation::Read(buffer) => {
                    let value = self.registers.get(&self.pointer).copied().unwrap_or(0);
                    buffer.copy_from_slice(&value.to_be_bytes()[..buffer.len()]);
                }
            }
        }
        Ok(())
    }
}

/// PWM channel whose duty counts microseconds of a 20 ms frame.
#[derive(Debug, Default)]
pub struct RecordingPwm {
    pub duties: Vec<u16>,
}

impl pwm::ErrorType for RecordingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        20_000
    }

    fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Self::Error> {
        self.duties.push(duty);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedEvent {
    Trigger(LedTrigger),
    State(bool),
}

#[derive(Debug, Default)]
pub struct RecordingLed {
    pub events: Vec<LedEvent>,
}

impl LedSink for RecordingLed {
    fn set_trigger(&mut self, trigger: LedTrigger) -> Result<()> {
        self.events.push(LedEvent::Trigger(trigger));
        Ok(())
    }

    fn set_state(&mut self, on: bool) -> Result<()> {
        self.events.push(LedEvent::State(on));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingBrightness {
    pub levels: Vec<u8>,
}

impl BrightnessSink for RecordingBrightness {
    fn set_brightness(&mut self, percent: u8) -> Result<()> {
        if percent > 100 {
            return Err(Error::BrightnessOutOfRange(percent));
        }
        self.levels.push(percent);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingAngle {
    pub angles: Vec<f32>,
}

impl AngleSink for RecordingAngle {
    fn set_angle(&mut self, degrees: f32) -> Result<()> {
        self.angles.push(degrees);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayOp {
    Clear(Color),
    Text {
        x: i32,
        y: i32,
        text: String,
        fg: Color,
        bg: Color,
    },
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub ops: Vec<DisplayOp>,
}

impl RecordingDisplay {
    pub fn texts(&self) -> Vec<(i32, i32, &str, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Text { x, y, text, fg, .. } => Some((*x, *y, text.as_str(), *fg)),
                DisplayOp::Clear(_) => None,
            })
            .collect()
    }
}

impl DisplaySink for RecordingDisplay {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.ops.push(DisplayOp::Clear(color));
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Color, bg: Color) -> Result<()> {
        self.ops.push(DisplayOp::Text {
            x,
            y,
            text: text.to_owned(),
            fg,
            bg,
        });
        Ok(())
    }
}

/// A system clock frozen at one instant; `set` moves it.
#[derive(Debug)]
pub struct FixedClock {
    pub now: PrimitiveDateTime,
    pub sets: Vec<PrimitiveDateTime>,
}

impl FixedClock {
    pub fn at(now: PrimitiveDateTime) -> Self {
        Self {
            now,
            sets: Vec::new(),
        }
    }
}

impl SystemClock for FixedClock {
    fn now(&self) -> Result<PrimitiveDateTime> {
        Ok(self.now)
    }

    fn set(&mut self, date_time: PrimitiveDateTime) -> Result<()> {
        self.now = date_time;
        self.sets.push(date_time);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtcCall {
    Read,
    Write(PrimitiveDateTime),
    Start,
    Stop,
}

#[derive(Debug)]
pub struct FakeRtc {
    pub time: PrimitiveDateTime,
    pub running: bool,
    pub fail: bool,
    pub calls: Vec<RtcCall>,
}

impl FakeRtc {
    pub fn at(time: PrimitiveDateTime) -> Self {
        Self {
            time,
            running: true,
            fail: false,
            calls: Vec::new(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(Error::I2c(i2c::ErrorKind::Bus))
        } else {
            Ok(())
        }
    }
}

impl ClockSource for FakeRtc {
    fn read(&mut self) -> Result<PrimitiveDateTime> {
        self.calls.push(RtcCall::Read);
        self.check()?;
        Ok(self.time)
    }

    fn write(&mut self, date_time: PrimitiveDateTime) -> Result<()> {
        self.calls.push(RtcCall::Write(date_time));
        self.check()?;
        self.time = date_time;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.calls.push(RtcCall::Start);
        self.check()?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.calls.push(RtcCall::Stop);
        self.check()?;
        self.running = false;
        Ok(())
    }
}

/// Plays back edges, then asks for shutdown once it runs dry.
pub struct ScriptedEdges<'a> {
    pub events: VecDeque<EdgeEvent>,
    pub state: &'a AppState,
}

impl EdgeSource for ScriptedEdges<'_> {
    fn wait_edge(&mut self, _timeout: Duration) -> Result<Option<EdgeEvent>> {
        let event = self.events.pop_front();
        if event.is_none() {
            self.state.request_shutdown();
        }
        Ok(event)
    }
}

/// Plays back quadrature samples, then asks for shutdown once it runs dry.
pub struct ScriptedQuadrature<'a> {
    pub samples: VecDeque<QuadratureSample>,
    pub state: &'a AppState,
}

impl QuadratureSource for ScriptedQuadrature<'_> {
    fn wait_sample(&mut self, _timeout: Duration) -> Result<Option<QuadratureSample>> {
        let sample = self.samples.pop_front();
        if sample.is_none() {
            self.state.request_shutdown();
        }
        Ok(sample)
    }
}

/// SPI device that keeps every write as one entry.
#[derive(Debug, Default)]
pub struct RecordingSpi {
    pub writes: Vec<Vec<u8>>,
}

impl spi::ErrorType for RecordingSpi {
    type Error = Infallible;
}

impl SpiDevice for RecordingSpi {
    fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> core::result::Result<(), Self::Error> {
        for operation in operations {
            if let spi::Operation::Write(bytes) = operation {
                self.writes.push(bytes.to_vec());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
