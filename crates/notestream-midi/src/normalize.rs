//! Driver event -> [`Message`] mapping.

use midi_msg::{ChannelVoiceMsg, MidiMsg};

use crate::event::Message;

/// Map a decoded driver event to a note [`Message`].
///
/// Only channel-voice note-on and note-off are recognized; the channel is
/// discarded. Every other event kind returns `None` and is dropped by the
/// caller. Note-on velocity passes through unchanged, including 0. Note-off
/// release velocity is discarded.
///
/// High-resolution notes (14-bit velocity) keep the top 7 bits of velocity.
#[inline]
pub fn normalize(event: &MidiMsg) -> Option<Message> {
    match event {
        MidiMsg::ChannelVoice {
            msg: ChannelVoiceMsg::NoteOn { note, velocity },
            ..
        } => Some(Message::note_on(*note, *velocity)),
        MidiMsg::ChannelVoice {
            msg: ChannelVoiceMsg::NoteOff { note, .. },
            ..
        } => Some(Message::note_off(*note)),
        MidiMsg::ChannelVoice {
            msg: ChannelVoiceMsg::HighResNoteOn { note, velocity },
            ..
        } => Some(Message::note_on(*note, (*velocity >> 7) as u8)),
        MidiMsg::ChannelVoice {
            msg: ChannelVoiceMsg::HighResNoteOff { note, .. },
            ..
        } => Some(Message::note_off(*note)),
        _ => None,
    }
}
