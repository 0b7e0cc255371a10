//! A key on an evdev input device, as an edge source.

use std::collections::VecDeque;
use std::os::fd::AsRawFd;
use std::time::SystemTime;

use embassy_time::{Duration, Instant};
use evdev::{Device, EventType, InputEvent};
use nix::fcntl::{fcntl, FcntlArg, OFlag};

use crate::button::{Edge, EdgeEvent};
use crate::peripherals::EdgeSource;
use crate::shared_constants::BUTTON_TIMEOUT;
use crate::worker::sleep;
use crate::{Error, Result};

const KEY_RELEASED: i32 = 0;
const KEY_PRESSED: i32 = 1;

/// Press/release of any key on the device. Autorepeat is ignored.
pub struct InputKeys {
    path: String,
    device: Device,
    pending: VecDeque<EdgeEvent>,
}

impl InputKeys {
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened or switched to
    /// non-blocking reads.
    pub fn open(path: &str) -> Result<Self> {
        let device = Device::open(path).map_err(|err| Error::io(path, err))?;
        fcntl(device.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
            .map_err(|errno| Error::io(path, errno.into()))?;
        Ok(Self {
            path: path.to_owned(),
            device,
            pending: VecDeque::new(),
        })
    }

    fn edge_from_event(event: &InputEvent) -> Option<Edge> {
        if event.event_type() != EventType::KEY {
            return None;
        }
        match event.value() {
            KEY_PRESSED => Some(Edge::Rising),
            KEY_RELEASED => Some(Edge::Falling),
            _ => None,
        }
    }

    fn drain(&mut self) -> Result<()> {
        match self.device.fetch_events() {
            Ok(events) => {
                let (now, wall_now) = (Instant::now(), SystemTime::now());
                self.pending.extend(events.filter_map(|event| {
                    Self::edge_from_event(&event).map(|edge| {
                        EdgeEvent::from_wall_clock(edge, now, wall_now, event.timestamp())
                    })
                }));
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
            Err(err) => Err(Error::io(self.path.as_str(), err)),
        }
    }
}

impl EdgeSource for InputKeys {
    fn wait_edge(&mut self, timeout: Duration) -> Result<Option<EdgeEvent>> {
        let started = Instant::now();
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            self.drain()?;
            if !self.pending.is_empty() {
                continue;
            }
            if started.elapsed() >= timeout {
                return Ok(None);
            }
            sleep(BUTTON_TIMEOUT);
        }
    }
}
