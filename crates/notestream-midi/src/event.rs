//! Normalized note event delivered to consumers.

use serde::{Deserialize, Serialize};

/// Whether a key was pressed or released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteState {
    On,
    Off,
}

/// A single key press or release.
///
/// `key` and `velocity` follow the MIDI 0-127 convention but are not
/// validated. `velocity` is always 0 for [`NoteState::Off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub key: u8,
    pub state: NoteState,
    pub velocity: u8,
}

impl Message {
    #[inline]
    pub fn note_on(key: u8, velocity: u8) -> Self {
        Self {
            key,
            state: NoteState::On,
            velocity,
        }
    }

    #[inline]
    pub fn note_off(key: u8) -> Self {
        Self {
            key,
            state: NoteState::Off,
            velocity: 0,
        }
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.state == NoteState::On
    }

    #[inline]
    pub fn is_off(&self) -> bool {
        self.state == NoteState::Off
    }
}
