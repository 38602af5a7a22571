//! Hardware MIDI input.
//!
//! Device enumeration and real-time input via midir.
//! Requires the `midi-io` feature.

mod input;

pub use input::{MidirBackend, MidirDriver, MidirInputPort};

use crate::error::Result;
use crate::session::MidiSession;

/// Display names of the MIDI input devices currently visible to the system.
pub fn list_available_device_names() -> Result<Vec<String>> {
    crate::driver::list_input_names(&MidirBackend)
}

/// Open a session on hardware input device `device_index` with default settings.
pub fn open_hardware_session(device_index: usize) -> Result<MidiSession<MidirDriver>> {
    crate::session::open_session(&MidirBackend, device_index)
}
