#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Note events delivered to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MidiMessage {
    /// Velocity normalised to 0.0..=1.0.
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    /// Release every sounding voice normally.
    AllNotesOff,
    /// Fast fade on every voice.
    StopAll,
}

impl MidiMessage {
    /// Decode a channel voice message from raw bytes. Note-on with zero
    /// velocity is a note-off. Anything else is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let note = *data.first()? & 0x7F;
        match status & 0xF0 {
            0x90 => {
                let velocity = *data.get(1)? & 0x7F;
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { note })
                } else {
                    Some(MidiMessage::NoteOn {
                        note,
                        velocity: velocity as f32 / 127.0,
                    })
                }
            }
            0x80 => Some(MidiMessage::NoteOff { note }),
            // CC 123, all notes off
            0xB0 if note == 123 => Some(MidiMessage::AllNotesOff),
            _ => None,
        }
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<MidiMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<MidiMessage> {
    fn pop(&mut self) -> Option<MidiMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_messages() {
        assert_eq!(
            MidiMessage::from_bytes(&[0x90, 60, 127]),
            Some(MidiMessage::NoteOn {
                note: 60,
                velocity: 1.0
            })
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x93, 64, 0]),
            Some(MidiMessage::NoteOff { note: 64 })
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0x80, 64, 40]),
            Some(MidiMessage::NoteOff { note: 64 })
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0xB0, 123, 0]),
            Some(MidiMessage::AllNotesOff)
        );
    }

    #[test]
    fn ignores_other_and_truncated_messages() {
        assert_eq!(MidiMessage::from_bytes(&[]), None);
        assert_eq!(MidiMessage::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiMessage::from_bytes(&[0xE0, 0, 64]), None);
        assert_eq!(MidiMessage::from_bytes(&[0xB0, 7, 100]), None);
    }
}
