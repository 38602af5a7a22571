//! MIDI input sessions for notestream.
//!
//! Opens one MIDI input device and turns its note-on/note-off events into a
//! channel of [`Message`]s. Everything else the device sends is dropped.
//!
//! The device itself sits behind a driver capability ([`MidiBackend`],
//! [`MidiDriver`], [`MidiInputPort`]) with two implementations:
//! - [`MidirBackend`]: hardware input via midir (feature `midi-io`, on by default)
//! - [`VirtualBackend`]: in-process devices fed programmatically
//!
//! # Example
//!
//! ```
//! use notestream_midi_io::{open_session, Message, VirtualBackend};
//!
//! let backend = VirtualBackend::new();
//! let keys = backend.add_device("Keys");
//!
//! let session = open_session(&backend, 0)?;
//! let listening = session.clone();
//! let listen_thread = std::thread::spawn(move || listening.start());
//! while !keys.has_listener() {
//!     std::thread::yield_now();
//! }
//!
//! let player = std::thread::spawn(move || keys.note_on(60, 100));
//! assert_eq!(session.stream().recv().unwrap(), Message::note_on(60, 100));
//! player.join().unwrap();
//!
//! session.stop();
//! listen_thread.join().unwrap()?;
//! # Ok::<(), notestream_midi_io::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod driver;
pub use driver::{
    list_devices, list_input_names, EventHandler, MidiBackend, MidiDriver, MidiInputDevice,
    MidiInputPort,
};

mod session;
pub use session::{
    open_session, DeviceSelector, MidiSession, MidiSessionBuilder, MidiStream, SessionStats,
};

pub(crate) mod port;
pub use port::{VirtualBackend, VirtualDevice, VirtualDriver, VirtualInputPort};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{
    list_available_device_names, open_hardware_session, MidirBackend, MidirDriver,
    MidirInputPort,
};

pub use notestream_midi::{normalize, raw, Message, MidiMsg, NoteState};
