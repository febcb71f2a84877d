//! Reduce each chord to playable voices
//!
//! The only state carried between chords is the previous melody pitch, threaded
//! through [`allocate`] as an explicit accumulator by the caller.

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::config::VoicePolicy;
use crate::note::Note;
use crate::range::{
    fold_to_lowest, fold_to_range, wrap_preserving_contour, BASS_CEILING, PLAYABLE_HIGH,
    PLAYABLE_LOW,
};

/// Melody reference before the first chord (F4, near the window center)
pub const INITIAL_MELODY_PITCH: i32 = 65;
/// Inner voices kept per chord in the three-voice policy
pub const MAX_INNER_VOICES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceRole {
    Melody,
    Bass,
    Inner,
}

/// A note resolved to a single playable pitch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNote {
    /// Always within 48..=83
    pub pitch: i32,
    pub start: f64,
    pub end: f64,
    pub role: VoiceRole,
}

impl ResolvedNote {
    fn new(note: &Note, pitch: i32, role: VoiceRole) -> Self {
        Self { pitch, start: note.start, end: note.end, role }
    }
}

/// Resolve one chord under `policy`, returning the voices and the melody
/// reference for the next chord.
pub fn allocate(
    policy: VoicePolicy,
    chord: &Chord,
    total_shift: i32,
    prev_melody: i32,
) -> (Vec<ResolvedNote>, i32) {
    match policy {
        VoicePolicy::ThreeVoice => three_voice(chord, total_shift, prev_melody),
        VoicePolicy::HandSeparation => (hand_separation(chord, total_shift), prev_melody),
        VoicePolicy::Direct => (direct(chord, total_shift), prev_melody),
    }
}

fn fold_window(pitch: i32) -> i32 {
    fold_to_range(pitch, PLAYABLE_LOW, PLAYABLE_HIGH)
}

fn three_voice(chord: &Chord, shift: i32, prev_melody: i32) -> (Vec<ResolvedNote>, i32) {
    let (Some(bass), Some(melody)) = (chord.lowest(), chord.highest()) else {
        return (Vec::new(), prev_melody);
    };

    let melody_pitch =
        wrap_preserving_contour(melody.shifted(shift), prev_melody, PLAYABLE_LOW, PLAYABLE_HIGH);
    let mut voices = vec![ResolvedNote::new(melody, melody_pitch, VoiceRole::Melody)];

    if chord.len() == 1 {
        return (voices, melody_pitch);
    }

    let bass_pitch = fold_to_lowest(bass.shifted(shift), PLAYABLE_LOW, BASS_CEILING);
    voices.push(ResolvedNote::new(bass, bass_pitch, VoiceRole::Bass));

    let inner = &chord.notes[1..chord.len() - 1];
    for note in inner.iter().take(MAX_INNER_VOICES) {
        let pitch = fold_window(note.shifted(shift));
        // Skip unisons with the outer voices
        if pitch == melody_pitch || pitch == bass_pitch {
            continue;
        }
        voices.push(ResolvedNote::new(note, pitch, VoiceRole::Inner));
    }

    (voices, melody_pitch)
}

fn hand_separation(chord: &Chord, shift: i32) -> Vec<ResolvedNote> {
    let (Some(bass), Some(melody)) = (chord.lowest(), chord.highest()) else {
        return Vec::new();
    };

    let melody_pitch = fold_window(melody.shifted(shift));
    let mut voices = vec![ResolvedNote::new(melody, melody_pitch, VoiceRole::Melody)];

    if chord.len() > 1 {
        voices.push(ResolvedNote::new(bass, fold_window(bass.shifted(shift)), VoiceRole::Bass));
    }
    voices
}

fn direct(chord: &Chord, shift: i32) -> Vec<ResolvedNote> {
    chord
        .notes
        .iter()
        .map(|n| ResolvedNote::new(n, fold_window(n.shifted(shift)), VoiceRole::Melody))
        .collect()
}
