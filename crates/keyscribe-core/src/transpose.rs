//! Whole-piece transposition: key shift plus octave centering

use serde::{Deserialize, Serialize};

use crate::key_estimate::{estimate_key, major_key_name};
use crate::note::Note;

/// Pitch the piece's duration-weighted average is pulled toward
/// (middle of the 48..=83 window)
pub const CENTER_TARGET: f64 = 65.5;
/// Average pitch assumed when the notes have no total duration
pub const FALLBACK_AVG_PITCH: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranspositionResult {
    pub key_shift: i32,
    pub octave_shift: i32,
    /// Always `key_shift + octave_shift`
    pub total_shift: i32,
    pub estimated_key: String,
    /// Duration-weighted mean pitch after the key shift
    pub weighted_avg_pitch: f64,
}

/// Duration-weighted mean of `pitch + shift`.
pub fn weighted_avg_pitch(notes: &[Note], shift: i32) -> f64 {
    let (weighted, total) = notes.iter().fold((0.0, 0.0), |(w, t), n| {
        let d = n.duration();
        (w + n.shifted(shift) as f64 * d, t + d)
    });
    if total > 0.0 { weighted / total } else { FALLBACK_AVG_PITCH }
}

/// Whole octaves that bring `avg` nearest the window center. Halves round to even.
pub fn octave_shift_for(avg: f64) -> i32 {
    ((CENTER_TARGET - avg) / 12.0).round_ties_even() as i32 * 12
}

/// Compute the single shift applied to every note of the piece.
///
/// `manual` wins over `auto`; with neither, the key shift is zero. The
/// octave shift is always applied.
pub fn compute_total_shift(notes: &[Note], auto: bool, manual: Option<i32>) -> TranspositionResult {
    let (key_shift, estimated_key) = match manual {
        Some(shift) => (shift, major_key_name(0)),
        None if auto && !notes.is_empty() => {
            let est = estimate_key(notes);
            (est.shift(), est.name())
        }
        None => (0, major_key_name(0)),
    };

    let avg = weighted_avg_pitch(notes, key_shift);
    let octave_shift = octave_shift_for(avg);
    let total_shift = key_shift + octave_shift;

    tracing::debug!(
        "Total shift {} (key {}, octave {}, weighted avg pitch {:.1})",
        total_shift,
        key_shift,
        octave_shift,
        avg
    );

    TranspositionResult {
        key_shift,
        octave_shift,
        total_shift,
        estimated_key,
        weighted_avg_pitch: avg,
    }
}
