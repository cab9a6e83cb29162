//! Computer keyboard as a one-octave piano.
//!
//! ```text
//!   w e   t y u   o p
//!  a s d f g h j k l
//! ```
//!
//! Terminals only report key presses, so every note gets a fixed gate and
//! is released when it runs out. Auto-repeat from a held key extends the
//! gate instead of retriggering.

use std::time::{Duration, Instant};

pub const GATE: Duration = Duration::from_millis(350);

const MIN_OCTAVE: i8 = 0;
const MAX_OCTAVE: i8 = 8;

pub fn key_to_semitone(key: char) -> Option<u8> {
    let semitone = match key.to_ascii_lowercase() {
        'a' => 0,
        'w' => 1,
        's' => 2,
        'e' => 3,
        'd' => 4,
        'f' => 5,
        't' => 6,
        'g' => 7,
        'y' => 8,
        'h' => 9,
        'u' => 10,
        'j' => 11,
        'k' => 12,
        'o' => 13,
        'l' => 14,
        'p' => 15,
        _ => return None,
    };
    Some(semitone)
}

#[derive(Debug)]
pub struct Keyboard {
    octave: i8,
    gates: Vec<(u8, Instant)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            gates: Vec::with_capacity(16),
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shift_octave(&mut self, delta: i8) {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
    }

    /// MIDI note for `key` in the current octave (C4 = 60).
    pub fn note_for(&self, key: char) -> Option<u8> {
        let semitone = key_to_semitone(key)?;
        let note = (self.octave as i16 + 1) * 12 + semitone as i16;
        u8::try_from(note).ok().filter(|&n| n <= 127)
    }

    /// Returns the note to start, or `None` if the key is not a note or the
    /// note is already gated (its gate is extended).
    pub fn press(&mut self, key: char, now: Instant) -> Option<u8> {
        let note = self.note_for(key)?;
        let deadline = now + GATE;

        if let Some(gate) = self.gates.iter_mut().find(|(n, _)| *n == note) {
            gate.1 = deadline;
            return None;
        }

        self.gates.push((note, deadline));
        Some(note)
    }

    /// Remove and return every note whose gate has elapsed.
    pub fn expired(&mut self, now: Instant) -> Vec<u8> {
        let mut released = Vec::new();
        self.gates.retain(|&(note, deadline)| {
            if deadline <= now {
                released.push(note);
                false
            } else {
                true
            }
        });
        released
    }

    /// Forget every gate; the caller sends AllNotesOff.
    pub fn release_all(&mut self) {
        self.gates.clear();
    }
}
