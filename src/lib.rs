//! Shared items for the desk clock controller.
//!
//! Independent loops (sensors, display, inputs, actuators) share one
//! [`AppState`]; the [`Supervisor`] runs the alarm state machine on the main
//! thread and serves the input latches.

mod error;
mod shared_constants;

pub mod actuator;
pub mod alarm;
pub mod app_state;
pub mod backlight;
pub mod button;
pub mod config;
pub mod display;
pub mod led;
pub mod logger;
pub mod mcp9808;
pub mod pcf8563;
pub mod peripherals;
pub mod rotary;
pub mod sensors;
pub mod servo;
pub mod servo_wave;
pub mod st7789;
pub mod supervisor;
pub mod worker;

#[cfg(feature = "linux")]
pub mod linux;

// Re-export commonly used items
pub use actuator::{run_actuator, Actuator, ActuatorPhase, AlarmWaveform};
pub use alarm::{AlarmCoordinator, AlarmMode, AlarmTransition};
pub use app_state::{AppState, Latch};
pub use backlight::{Backlight, BacklightPulse, Triangle};
pub use button::{Button, ButtonRole, Edge, EdgeEvent, PressClassifier, PressDuration};
pub use config::Config;
pub use display::{run_display, show_logo, Color, DisplayView, Snapshot, TextDisplay};
pub use error::{Error, ErrorClass, Result};
pub use led::LedAlarm;
pub use mcp9808::Mcp9808;
pub use pcf8563::Pcf8563;
pub use rotary::{apply_sample, clamp_threshold, decode_step, QuadratureSample, RotaryEncoder};
pub use sensors::{run_clock, run_thermometer};
pub use servo::Servo;
pub use servo_wave::{ServoWave, SquareWave};
pub use shared_constants::*;
pub use st7789::St7789;
pub use supervisor::Supervisor;
