//! keyscribe-core: transcribe MIDI performances into keyboard input events
//!
//! The target instrument exposes 21 natural keys in three octave rows plus
//! Shift/Ctrl for accidentals. A piece is shifted once as a whole, grouped
//! into chords, reduced to playable voices and emitted as press/release events.

pub mod chord;
mod config;
pub mod emit;
mod engine;
mod error;
pub mod key_estimate;
pub mod keymap;
mod note;
pub mod range;
pub mod transpose;
pub mod voice;

pub use chord::Chord;
pub use config::{TranscribeConfig, VoicePolicy, MAX_MANUAL_TRANSPOSE};
pub use emit::{InputEvent, KeyAction};
pub use engine::{Diagnostics, Transcriber, Transcription};
pub use error::{KeyscribeError, Result};
pub use key_estimate::{estimate_shift, KeyEstimate};
pub use keymap::{Band, KeyBinding, Modifier};
pub use note::{retain_valid_notes, Instrument, Note, Score};
pub use range::{fold_to_lowest, fold_to_range, wrap_preserving_contour, PLAYABLE_HIGH, PLAYABLE_LOW};
pub use transpose::{compute_total_shift, TranspositionResult};
pub use voice::{ResolvedNote, VoiceRole};
