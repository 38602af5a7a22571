//! Virtual MIDI input devices.
//!
//! A [`VirtualBackend`] is a shared bus of devices. Any number of drivers may
//! be created from it; each sees the devices connected at enumeration time.
//! Injecting an event runs the attached listener on the injecting thread.

use notestream_midi::{raw, MidiMsg};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::driver::{EventHandler, MidiBackend, MidiDriver, MidiInputPort};
use crate::error::{Error, Result};

struct DeviceState {
    name: String,
    connected: AtomicBool,
    open: AtomicBool,
    handler: Mutex<Option<EventHandler>>,
}

impl DeviceState {
    fn detach(&self) {
        // Drop outside the lock: dropping a handler may close a channel and
        // wake other threads.
        let handler = self.handler.lock().take();
        drop(handler);
    }
}

#[derive(Default)]
struct VirtualBus {
    devices: RwLock<Vec<Arc<DeviceState>>>,
}

/// Backend over a shared set of virtual input devices.
///
/// Clone is cheap (Arc internally); clones share the same devices.
#[derive(Clone, Default)]
pub struct VirtualBackend {
    bus: Arc<VirtualBus>,
}

impl VirtualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a new device. It is appended to the enumeration order.
    pub fn add_device(&self, name: impl Into<String>) -> VirtualDevice {
        let state = Arc::new(DeviceState {
            name: name.into(),
            connected: AtomicBool::new(true),
            open: AtomicBool::new(false),
            handler: Mutex::new(None),
        });
        let mut devices = self.bus.devices.write();
        devices.push(state.clone());
        debug!("Added virtual MIDI device {}: {}", devices.len() - 1, state.name);
        VirtualDevice {
            state,
            bus: self.bus.clone(),
        }
    }

    /// First connected device with exactly this name (case-sensitive).
    pub fn device(&self, name: &str) -> Option<VirtualDevice> {
        self.bus
            .devices
            .read()
            .iter()
            .find(|state| state.name == name)
            .map(|state| VirtualDevice {
                state: state.clone(),
                bus: self.bus.clone(),
            })
    }

    pub fn device_count(&self) -> usize {
        self.bus.devices.read().len()
    }
}

impl MidiBackend for VirtualBackend {
    type Driver = VirtualDriver;

    fn create_driver(&self, client_name: &str) -> Result<VirtualDriver> {
        debug!("Created virtual MIDI driver '{}'", client_name);
        Ok(VirtualDriver {
            bus: self.bus.clone(),
            closed: false,
        })
    }
}

/// Handle for injecting events into a virtual device.
#[derive(Clone)]
pub struct VirtualDevice {
    state: Arc<DeviceState>,
    bus: Arc<VirtualBus>,
}

impl VirtualDevice {
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Deliver `event` to the attached listener, blocking while the listener does.
    ///
    /// Returns `false` if nobody is listening. A listener that ignores the
    /// event still counts as having received it.
    pub fn send(&self, event: &MidiMsg) -> bool {
        let mut handler = self.state.handler.lock();
        match handler.as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    /// Note-on on channel 0.
    pub fn note_on(&self, key: u8, velocity: u8) -> bool {
        self.send(&raw::note_on(0, key, velocity))
    }

    /// Note-off on channel 0.
    pub fn note_off(&self, key: u8) -> bool {
        self.send(&raw::note_off(0, key, 0))
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::Acquire)
    }

    pub fn has_listener(&self) -> bool {
        self.state.handler.lock().is_some()
    }

    /// Unplug the device: it disappears from enumeration and any attached
    /// listener is dropped.
    pub fn disconnect(&self) {
        if !self.state.connected.swap(false, Ordering::AcqRel) {
            return;
        }
        self.bus
            .devices
            .write()
            .retain(|state| !Arc::ptr_eq(state, &self.state));
        self.state.open.store(false, Ordering::Release);
        self.state.detach();
        debug!("Disconnected virtual MIDI device: {}", self.state.name);
    }
}

impl std::fmt::Debug for VirtualDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualDevice")
            .field("name", &self.state.name)
            .field("connected", &self.is_connected())
            .finish()
    }
}

pub struct VirtualDriver {
    bus: Arc<VirtualBus>,
    closed: bool,
}

impl MidiDriver for VirtualDriver {
    type Port = VirtualInputPort;

    fn inputs(&mut self) -> Result<Vec<VirtualInputPort>> {
        if self.closed {
            return Err(Error::Enumeration("virtual MIDI driver is closed".to_string()));
        }
        Ok(self
            .bus
            .devices
            .read()
            .iter()
            .map(|state| VirtualInputPort {
                state: state.clone(),
                listening: false,
            })
            .collect())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

pub struct VirtualInputPort {
    state: Arc<DeviceState>,
    listening: bool,
}

impl MidiInputPort for VirtualInputPort {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn open(&mut self) -> Result<()> {
        if !self.state.connected.load(Ordering::Acquire) {
            return Err(Error::DeviceOpen(format!(
                "virtual device '{}' is disconnected",
                self.state.name
            )));
        }
        self.state.open.store(true, Ordering::Release);
        Ok(())
    }

    fn listen(&mut self, handler: EventHandler) -> Result<()> {
        if !self.state.connected.load(Ordering::Acquire) {
            return Err(Error::ListenAttach(format!(
                "virtual device '{}' is disconnected",
                self.state.name
            )));
        }
        if !self.state.open.load(Ordering::Acquire) {
            return Err(Error::ListenAttach(format!(
                "virtual device '{}' is not open",
                self.state.name
            )));
        }

        let mut slot = self.state.handler.lock();
        if slot.is_some() {
            return Err(Error::ListenAttach(format!(
                "virtual device '{}' already has a listener",
                self.state.name
            )));
        }
        *slot = Some(handler);
        self.listening = true;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<()> {
        if std::mem::take(&mut self.listening) {
            self.state.detach();
        }
        Ok(())
    }
}

impl Drop for VirtualInputPort {
    fn drop(&mut self) {
        if self.listening {
            self.state.detach();
        }
    }
}
