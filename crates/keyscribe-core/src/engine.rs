//! MIDI-to-keyboard transcription pipeline

use serde::{Deserialize, Serialize};

use crate::chord;
use crate::config::{TranscribeConfig, VoicePolicy};
use crate::emit::{self, InputEvent};
use crate::error::Result;
use crate::note::{retain_valid_notes, Note, Score};
use crate::range::{PLAYABLE_HIGH, PLAYABLE_LOW};
use crate::transpose::{compute_total_shift, TranspositionResult};
use crate::voice::{self, ResolvedNote, INITIAL_MELODY_PITCH};

/// Summary of how a piece was transcribed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub estimated_key: String,
    pub key_shift: i32,
    pub octave_shift: i32,
    pub total_shift: i32,
    pub weighted_avg_pitch: f64,
    pub total_notes: usize,
    /// Notes already inside 48..=83 after the shift, before any folding
    pub in_range: usize,
    pub out_of_range: usize,
    pub chords: usize,
    pub voice_policy: VoicePolicy,
}

/// Engine output: the playable event list plus metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub events: Vec<InputEvent>,
    pub total_duration: f64,
    /// `None` for a piece with no pitched notes
    pub diagnostics: Option<Diagnostics>,
}

impl Transcription {
    pub fn is_silent(&self) -> bool {
        self.events.is_empty()
    }
}

/// Transcribes scores under one fixed configuration. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Transcriber {
    config: TranscribeConfig,
}

impl Transcriber {
    /// Create a transcriber, rejecting an unusable configuration
    pub fn new(config: TranscribeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TranscribeConfig {
        &self.config
    }

    /// Transcribe every non-drum note of a parsed file
    pub fn transcribe(&self, score: &Score) -> Result<Transcription> {
        let notes = score.pitched_notes();
        if notes.is_empty() {
            tracing::info!("No pitched notes, nothing to play");
            return Ok(Transcription::default());
        }
        let mut transcription = self.transcribe_notes(&notes)?;
        if transcription.diagnostics.is_some() {
            transcription.total_duration = transcription.total_duration.max(score.duration());
        }
        Ok(transcription)
    }

    /// Transcribe a flat note list (drums already removed)
    pub fn transcribe_notes(&self, notes: &[Note]) -> Result<Transcription> {
        let valid = retain_valid_notes(notes);
        let notes = valid.as_slice();
        if notes.is_empty() {
            return Ok(Transcription::default());
        }

        // Stage 1: one shift for the whole piece
        let transposition = compute_total_shift(
            notes,
            self.config.auto_transpose,
            self.config.manual_transpose,
        );
        let shift = transposition.total_shift;

        // Stage 2: group onsets into chords
        let chords = chord::group(notes, self.config.effective_window());

        // Stage 3: voices, threading the melody reference chord to chord
        let policy = self.config.voice_policy;
        let (resolved, _) = chords.iter().fold(
            (Vec::<ResolvedNote>::with_capacity(notes.len()), INITIAL_MELODY_PITCH),
            |(mut acc, prev), chord| {
                let (voices, next) = voice::allocate(policy, chord, shift, prev);
                acc.extend(voices);
                (acc, next)
            },
        );

        // Stage 4: key events
        let events = emit::emit(&resolved);

        let diagnostics = diagnostics_for(notes, &transposition, chords.len(), policy);
        tracing::info!(
            "Transcribed {} notes in {} as {} events (shift {}, {} chords, {} voices)",
            diagnostics.total_notes,
            diagnostics.estimated_key,
            events.len(),
            shift,
            chords.len(),
            resolved.len()
        );

        Ok(Transcription {
            events,
            total_duration: notes.iter().map(|n| n.end).fold(0.0, f64::max),
            diagnostics: Some(diagnostics),
        })
    }
}

fn diagnostics_for(
    notes: &[Note],
    transposition: &TranspositionResult,
    chords: usize,
    voice_policy: VoicePolicy,
) -> Diagnostics {
    let in_range = notes
        .iter()
        .filter(|n| (PLAYABLE_LOW..=PLAYABLE_HIGH).contains(&n.shifted(transposition.total_shift)))
        .count();
    if in_range < notes.len() {
        tracing::debug!(
            "{} of {} notes need folding into the playable range",
            notes.len() - in_range,
            notes.len()
        );
    }

    Diagnostics {
        estimated_key: transposition.estimated_key.clone(),
        key_shift: transposition.key_shift,
        octave_shift: transposition.octave_shift,
        total_shift: transposition.total_shift,
        weighted_avg_pitch: transposition.weighted_avg_pitch,
        total_notes: notes.len(),
        in_range,
        out_of_range: notes.len() - in_range,
        chords,
        voice_policy,
    }
}
