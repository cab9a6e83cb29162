/// Channel voice messages the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// Controller number of the "All Notes Off" channel mode message.
pub const ALL_NOTES_OFF_CC: u8 = 123;

impl MidiEvent {
    /// Decode one raw message. Running status and system messages are not
    /// handled; a note-on with velocity 0 decodes as a note-off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            }),
            0x90 => {
                let key = byte(0)?;
                let velocity = byte(1)?;
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            }),
            0xE0 => {
                let lsb = byte(0)? as i16;
                let msb = byte(1)? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_notes() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0x80, 60, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert!(matches!(
            MidiEvent::from_bytes(&[0x90, 64, 0]),
            Some(MidiEvent::NoteOff { key: 64, .. })
        ));
    }

    #[test]
    fn pitch_bend_is_centered() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 8191
            })
        );
    }

    #[test]
    fn truncated_or_unknown_messages_are_ignored() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
    }
}
