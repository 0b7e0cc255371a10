//! LED and PWM class devices under `/sys/class`.

use std::fs;
use std::path::{Path, PathBuf};

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use log::{debug, warn};

use crate::peripherals::{LedSink, LedTrigger};
use crate::shared_constants::SHUTDOWN_POLL;
use crate::worker::sleep;
use crate::{Error, Result};

fn write_attribute(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|err| Error::io(path.display().to_string(), err))
}

fn read_attribute(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|text| text.trim().to_owned())
        .map_err(|err| Error::io(path.display().to_string(), err))
}

pub struct SysfsLed {
    dir: PathBuf,
    max_brightness: String,
}

impl SysfsLed {
    /// # Errors
    ///
    /// Returns an error if the LED does not exist.
    pub fn open(name: &str) -> Result<Self> {
        let dir = Path::new("/sys/class/leds").join(name);
        let max_brightness = read_attribute(&dir.join("max_brightness"))?;
        Ok(Self {
            dir,
            max_brightness,
        })
    }
}

impl LedSink for SysfsLed {
    fn set_trigger(&mut self, trigger: LedTrigger) -> Result<()> {
        debug!("LED trigger {}", trigger.as_str());
        write_attribute(&self.dir.join("trigger"), trigger.as_str())
    }

    fn set_state(&mut self, on: bool) -> Result<()> {
        let value = if on { self.max_brightness.as_str() } else { "0" };
        write_attribute(&self.dir.join("brightness"), value)
    }
}

/// One exported PWM channel with a fixed period.
///
/// Duty is exposed through `SetDutyCycle` with full `u16` resolution and scaled
/// to nanoseconds of the period.
pub struct SysfsPwm {
    chip_dir: PathBuf,
    channel: u32,
    channel_dir: PathBuf,
    period_ns: u64,
}

impl SysfsPwm {
    /// Export the channel, program `period_ns` and enable it with zero duty.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip does not exist or the channel cannot be
    /// exported.
    pub fn open(chip: u32, channel: u32, period_ns: u64) -> Result<Self> {
        let chip_dir = PathBuf::from(format!("/sys/class/pwm/pwmchip{chip}"));
        let channel_dir = chip_dir.join(format!("pwm{channel}"));
        if !channel_dir.exists() {
            write_attribute(&chip_dir.join("export"), &channel.to_string())?;
            // udev needs a moment to hand the new attributes to our group.
            sleep(SHUTDOWN_POLL);
        }
        let pwm = Self {
            chip_dir,
            channel,
            channel_dir,
            period_ns,
        };
        // Duty may never exceed the period, so clear it before changing the period.
        write_attribute(&pwm.channel_dir.join("duty_cycle"), "0")?;
        write_attribute(&pwm.channel_dir.join("period"), &period_ns.to_string())?;
        write_attribute(&pwm.channel_dir.join("enable"), "1")?;
        Ok(pwm)
    }

    fn set_duty_ns(&mut self, duty_ns: u64) -> Result<()> {
        write_attribute(
            &self.channel_dir.join("duty_cycle"),
            &duty_ns.min(self.period_ns).to_string(),
        )
    }
}

impl Drop for SysfsPwm {
    fn drop(&mut self) {
        let disabled = write_attribute(&self.channel_dir.join("enable"), "0");
        let unexported = write_attribute(&self.chip_dir.join("unexport"), &self.channel.to_string());
        if let Err(err) = disabled.and(unexported) {
            warn!("Cannot release PWM channel {}: {err}", self.channel);
        }
    }
}

impl ErrorType for SysfsPwm {
    type Error = Error;
}

impl SetDutyCycle for SysfsPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<()> {
        let duty_ns = self.period_ns * u64::from(duty) / u64::from(u16::MAX);
        self.set_duty_ns(duty_ns)
    }
}
