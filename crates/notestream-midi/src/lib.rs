//! Core note types for notestream.
//!
//! - [`Message`] / [`NoteState`]: the normalized note event handed to application code
//! - [`normalize`]: maps a decoded driver event to a [`Message`], ignoring everything
//!   that is not a note-on or note-off
//! - [`raw`]: constructors and wire decoding for driver-side events
//!
//! # Example
//!
//! ```
//! use notestream_midi::{normalize, raw, Message};
//!
//! let event = raw::note_on(0, 60, 100);
//! assert_eq!(normalize(&event), Some(Message::note_on(60, 100)));
//!
//! let ignored = raw::control_change(0, 7, 127);
//! assert_eq!(normalize(&ignored), None);
//! ```

pub(crate) mod event;
pub use event::{Message, NoteState};

mod normalize;
pub use normalize::normalize;

pub mod raw;

// Re-export the upstream event types drivers produce, so downstream crates
// don't need to depend on midi-msg directly.
pub use midi_msg::{
    Channel, ChannelVoiceMsg, ControlChange, MidiMsg, ParseError, SystemCommonMsg,
    SystemRealTimeMsg,
};
