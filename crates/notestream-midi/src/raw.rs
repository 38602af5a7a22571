//! Driver-side event helpers.
//!
//! Drivers hand the session decoded [`MidiMsg`] values. Hardware drivers get
//! them from wire bytes via [`parse`]; virtual devices and tests build them
//! with the constructors below.

use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg, ParseError};

/// `channel` is clamped to 0-15.
#[inline]
pub fn note_on(channel: u8, key: u8, velocity: u8) -> MidiMsg {
    MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel.min(15)),
        msg: ChannelVoiceMsg::NoteOn {
            note: key,
            velocity,
        },
    }
}

#[inline]
pub fn note_off(channel: u8, key: u8, velocity: u8) -> MidiMsg {
    MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel.min(15)),
        msg: ChannelVoiceMsg::NoteOff {
            note: key,
            velocity,
        },
    }
}

#[inline]
pub fn control_change(channel: u8, control: u8, value: u8) -> MidiMsg {
    MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel.min(15)),
        msg: ChannelVoiceMsg::ControlChange {
            control: ControlChange::CC { control, value },
        },
    }
}

/// `bend`: 14-bit (0-16383, 8192 = center).
#[inline]
pub fn pitch_bend(channel: u8, bend: u16) -> MidiMsg {
    MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel.min(15)),
        msg: ChannelVoiceMsg::PitchBend {
            bend: bend.min(16383),
        },
    }
}

/// Decode one MIDI message from wire bytes. Trailing bytes are ignored.
pub fn parse(bytes: &[u8]) -> Result<MidiMsg, ParseError> {
    let (msg, _len) = MidiMsg::from_midi(bytes)?;
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let msg = parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(msg, note_on(0, 60, 100));
    }

    #[test]
    fn test_parse_note_off() {
        let msg = parse(&[0x81, 60, 64]).unwrap();
        assert_eq!(msg, note_off(1, 60, 64));
    }

    #[test]
    fn test_parse_control_change() {
        let msg = parse(&[0xB0, 7, 100]).unwrap();
        assert_eq!(msg, control_change(0, 7, 100));
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_channel_clamped() {
        assert_eq!(note_on(42, 60, 100), note_on(15, 60, 100));
    }
}
