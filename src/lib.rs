//! # notestream - MIDI input as a stream of notes
//!
//! Opens a MIDI input device and delivers its note-on/note-off events as
//! [`Message`]s on a channel until the session is stopped.
//!
//! ## Architecture
//!
//! notestream is an umbrella crate over:
//! - **notestream-midi** - Note message types, normalizer, raw MIDI helpers
//! - **notestream-midi-io** - Driver capability, hardware and virtual drivers, sessions
//!
//! ## Quick Start
//!
//! ```ignore
//! use notestream::prelude::*;
//!
//! println!("{:?}", list_available_device_names()?);
//!
//! let session = open_hardware_session(0)?;
//! let listening = session.clone();
//! std::thread::spawn(move || listening.start());
//!
//! for message in session.stream() {
//!     println!("{:?}", message);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Hardware input
//! - `midi-hardware` - Hardware input via midir; without it only [`VirtualBackend`] is available

/// Re-export of notestream-midi for direct access
pub use notestream_midi as midi;

/// Re-export of notestream-midi-io for direct access
pub use notestream_midi_io as io;

// Note messages
pub use notestream_midi::{normalize, raw, Message, MidiMsg, NoteState};

// Sessions and drivers
pub use notestream_midi_io::{
    list_devices, list_input_names, open_session, DeviceSelector, Error, EventHandler,
    MidiBackend, MidiDriver, MidiInputDevice, MidiInputPort, MidiSession, MidiSessionBuilder,
    MidiStream, Result, SessionStats, VirtualBackend, VirtualDevice, VirtualDriver,
    VirtualInputPort,
};

#[cfg(feature = "midi-hardware")]
pub use notestream_midi_io::{
    list_available_device_names, open_hardware_session, MidirBackend, MidirDriver,
    MidirInputPort,
};

/// Convenience prelude for common imports
pub mod prelude {
    // Messages
    pub use crate::{Message, NoteState};

    // Sessions
    pub use crate::{open_session, MidiSession, MidiSessionBuilder, MidiStream};

    // Error
    pub use crate::{Error, Result};

    // Virtual devices
    pub use crate::{VirtualBackend, VirtualDevice};

    // Hardware
    #[cfg(feature = "midi-hardware")]
    pub use crate::{list_available_device_names, open_hardware_session, MidirBackend};
}
