//! Note and score representations fed into the transcriber

use serde::{Deserialize, Serialize};

use crate::error::{KeyscribeError, Result};

/// A single sounding note, times in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI note number (0-127, 60 = middle C)
    pub pitch: u8,
    pub start: f64,
    pub end: f64,
}

impl Note {
    pub fn new(pitch: u8, start: f64, end: f64) -> Self {
        Self { pitch, start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Pitch after a whole-piece shift. The source pitch is left untouched.
    pub fn shifted(&self, semitones: i32) -> i32 {
        self.pitch as i32 + semitones
    }

    fn check(&self, index: usize) -> Result<()> {
        let reason = if self.pitch > 127 {
            format!("pitch {} out of MIDI range", self.pitch)
        } else if !self.start.is_finite() || !self.end.is_finite() {
            "non-finite time".to_string()
        } else if self.end < self.start {
            format!("ends ({:.3}s) before it starts ({:.3}s)", self.end, self.start)
        } else {
            return Ok(());
        };
        Err(KeyscribeError::MalformedNote { index, reason })
    }
}

/// One instrument part of a parsed MIDI file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub program: u8,
    pub is_drum: bool,
    pub notes: Vec<Note>,
}

impl Instrument {
    pub fn new(name: impl Into<String>, is_drum: bool, notes: Vec<Note>) -> Self {
        Self {
            name: name.into(),
            program: 0,
            is_drum,
            notes,
        }
    }
}

/// A parsed performance: every instrument plus the file's end time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    pub instruments: Vec<Instrument>,
    /// End of the last event in the file, in seconds (0 if unknown)
    pub end_time: f64,
}

impl Score {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments, end_time: 0.0 }
    }

    /// All non-drum notes, instrument by instrument in file order.
    pub fn pitched_notes(&self) -> Vec<Note> {
        self.instruments
            .iter()
            .filter(|inst| !inst.is_drum)
            .flat_map(|inst| inst.notes.iter().copied())
            .collect()
    }

    /// Later of the reported end time and the last note end, drums included.
    pub fn duration(&self) -> f64 {
        self.instruments
            .iter()
            .flat_map(|inst| inst.notes.iter())
            .map(|n| n.end)
            .fold(self.end_time.max(0.0), f64::max)
    }
}

/// Notes the engine can reason about, in input order.
///
/// A malformed note is logged and left out so the rest of the piece still
/// transcribes.
pub fn retain_valid_notes(notes: &[Note]) -> Vec<Note> {
    notes
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match n.check(i) {
            Ok(()) => Some(*n),
            Err(e) => {
                tracing::warn!("Skipping note: {}", e);
                None
            }
        })
        .collect()
}
