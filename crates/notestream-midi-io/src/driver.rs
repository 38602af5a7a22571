//! Driver capability: what a session needs from a MIDI backend.
//!
//! A backend creates driver instances; a driver enumerates input ports; a
//! port can be opened and listened to. The session never touches hardware
//! directly, so the hardware driver ([`crate::MidirBackend`]) and the
//! in-process one ([`crate::VirtualBackend`]) are interchangeable.

use notestream_midi::MidiMsg;

use crate::error::Result;

/// Per-event callback registered with [`MidiInputPort::listen`].
///
/// Invoked once per decoded event, on a thread owned by the driver.
pub type EventHandler = Box<dyn FnMut(&MidiMsg) + Send + 'static>;

/// Factory for driver instances (`createDriver`).
pub trait MidiBackend {
    type Driver: MidiDriver;

    fn create_driver(&self, client_name: &str) -> Result<Self::Driver>;
}

/// One driver instance, exclusively owned by whoever created it.
pub trait MidiDriver: Send + 'static {
    type Port: MidiInputPort;

    /// Currently visible input ports, in driver order.
    fn inputs(&mut self) -> Result<Vec<Self::Port>>;

    /// Release driver resources. Called at most once by a session.
    fn close(&mut self) -> Result<()>;
}

/// A single input device handle.
pub trait MidiInputPort: Send + 'static {
    fn name(&self) -> &str;

    /// Idempotent.
    fn open(&mut self) -> Result<()>;

    /// Start delivering events to `handler`. Returns once the handler is attached.
    fn listen(&mut self, handler: EventHandler) -> Result<()>;

    /// Stop delivering events and drop the handler.
    fn stop_listening(&mut self) -> Result<()>;
}

/// Information about an available MIDI input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiInputDevice {
    /// Device index (for [`crate::MidiSessionBuilder::device`])
    pub index: usize,
    /// Device display name
    pub name: String,
}

/// Enumerate input devices with a throwaway driver instance.
pub fn list_devices<B: MidiBackend>(backend: &B) -> Result<Vec<MidiInputDevice>> {
    let mut driver = backend.create_driver(crate::session::DEFAULT_CLIENT_NAME)?;
    let inputs = driver.inputs();
    let devices = inputs.map(|ports| {
        ports
            .iter()
            .enumerate()
            .map(|(index, port)| MidiInputDevice {
                index,
                name: port.name().to_string(),
            })
            .collect::<Vec<_>>()
    });
    if let Err(e) = driver.close() {
        tracing::warn!("Failed to close MIDI driver after listing devices: {}", e);
    }
    devices
}

/// Display names of the available input devices, in driver order.
pub fn list_input_names<B: MidiBackend>(backend: &B) -> Result<Vec<String>> {
    Ok(list_devices(backend)?
        .into_iter()
        .map(|device| device.name)
        .collect())
}
