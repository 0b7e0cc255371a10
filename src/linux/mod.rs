//! Device glue for a Linux single-board computer.

pub mod gpio;
pub mod hardware;
pub mod input_device;
pub mod sysfs;
pub mod system_clock;

pub use gpio::{GpioLine, QuadratureLines};
pub use hardware::RtcOnDemand;
pub use input_device::InputKeys;
pub use sysfs::{SysfsLed, SysfsPwm};
pub use system_clock::LocalClock;
