//! MidiSession builder for configuring device selection and channel size.

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::driver::{MidiBackend, MidiDriver, MidiInputPort};
use crate::error::{Error, Result};

use super::listener::ListenerCounters;
use super::{MidiSession, SessionInner, DEFAULT_CLIENT_NAME};

/// How the input device is chosen among the enumerated ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Position in driver enumeration order.
    Index(usize),
    /// First device whose name contains this string (case-insensitive).
    Name(String),
}

impl Default for DeviceSelector {
    fn default() -> Self {
        DeviceSelector::Index(0)
    }
}

impl DeviceSelector {
    fn resolve<P: MidiInputPort>(&self, ports: &[P]) -> Result<usize> {
        match self {
            DeviceSelector::Index(index) => {
                if *index >= ports.len() {
                    return Err(Error::InvalidDeviceIndex {
                        index: *index,
                        available: ports.len(),
                    });
                }
                Ok(*index)
            }
            DeviceSelector::Name(name) => {
                let needle = name.to_lowercase();
                ports
                    .iter()
                    .position(|port| port.name().to_lowercase().contains(&needle))
                    .ok_or_else(|| Error::DeviceNotFound(name.clone()))
            }
        }
    }
}

pub struct MidiSessionBuilder {
    pub(super) device: DeviceSelector,
    pub(super) client_name: String,
    pub(super) channel_capacity: usize,
}

impl Default for MidiSessionBuilder {
    fn default() -> Self {
        Self {
            device: DeviceSelector::default(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            channel_capacity: 0,
        }
    }
}

impl MidiSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, index: usize) -> Self {
        self.device = DeviceSelector::Index(index);
        self
    }

    /// Select by partial, case-insensitive name match.
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device = DeviceSelector::Name(name.into());
        self
    }

    /// Name the session registers with the MIDI system.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Messages buffered before the driver's callback thread blocks.
    /// 0 (default) hands each message over directly to a waiting reader.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Create a driver, pick the device, open it.
    ///
    /// On failure the driver is closed again and nothing stays open.
    pub fn build<B: MidiBackend>(self, backend: &B) -> Result<MidiSession<B::Driver>> {
        let mut driver = backend.create_driver(&self.client_name)?;

        let (device_index, port) = match Self::open_port(&mut driver, &self.device) {
            Ok(opened) => opened,
            Err(e) => {
                if let Err(close_err) = driver.close() {
                    warn!("Failed to close MIDI driver: {}", close_err);
                }
                return Err(e);
            }
        };

        let device_name = port.name().to_string();
        let (sender, receiver) = bounded(self.channel_capacity);
        let (cancel, cancelled) = bounded(0);

        info!("Opened MIDI input {}: {}", device_index, device_name);

        Ok(MidiSession {
            inner: Arc::new(SessionInner {
                device_index,
                device_name,
                driver: Mutex::new(Some(driver)),
                port: Mutex::new(Some(port)),
                sender: Mutex::new(Some(sender)),
                receiver,
                cancel: Mutex::new(Some(cancel)),
                cancelled,
                listening: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                counters: Arc::new(ListenerCounters::default()),
            }),
        })
    }

    fn open_port<D: MidiDriver>(
        driver: &mut D,
        selector: &DeviceSelector,
    ) -> Result<(usize, D::Port)> {
        let mut ports = driver.inputs()?;
        let index = selector.resolve(&ports)?;
        let mut port = ports.swap_remove(index);
        port.open()?;
        Ok((index, port))
    }
}
