//! Krumhansl-Schmuckler major-key estimation

use crate::note::Note;

/// Krumhansl-Kessler major profile, C through B
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Sharp spelling of the twelve tonics
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Best-matching major key of a note set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    /// Pitch class of the tonic (0 = C)
    pub tonic: usize,
    /// Pearson correlation of the winning rotation
    pub correlation: f64,
}

impl KeyEstimate {
    /// Semitones that move the estimated key onto C major.
    pub fn shift(&self) -> i32 {
        -(self.tonic as i32)
    }

    pub fn name(&self) -> String {
        major_key_name(self.tonic)
    }
}

/// e.g. "G Major"
pub fn major_key_name(tonic: usize) -> String {
    format!("{} Major", KEY_NAMES[tonic % 12])
}

/// Total sounding time per pitch class.
pub fn pitch_class_histogram(notes: &[Note]) -> [f64; 12] {
    let mut bins = [0.0; 12];
    for note in notes {
        bins[(note.pitch % 12) as usize] += note.duration();
    }
    bins
}

/// Pearson correlation with population moments. A constant input on either
/// side has no defined correlation and scores 0.
pub fn pearson(a: &[f64; 12], b: &[f64; 12]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON || !denom.is_finite() {
        return 0.0;
    }
    cov / denom
}

/// Correlate the histogram against all twelve rotations of the major profile.
/// Ties keep the lowest rotation.
pub fn estimate_key(notes: &[Note]) -> KeyEstimate {
    let histogram = pitch_class_histogram(notes);

    let mut best = KeyEstimate { tonic: 0, correlation: f64::NEG_INFINITY };
    for tonic in 0..12 {
        // Rotating right by `tonic` puts the profile's tonic weight on that pitch class
        let mut rotated = MAJOR_PROFILE;
        rotated.rotate_right(tonic);

        let correlation = pearson(&histogram, &rotated);
        if correlation > best.correlation {
            best = KeyEstimate { tonic, correlation };
        }
    }

    tracing::debug!("Key estimate: {} (r = {:.3})", best.name(), best.correlation);
    best
}

/// Semitones needed to bring the piece to C major.
pub fn estimate_shift(notes: &[Note]) -> i32 {
    estimate_key(notes).shift()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One note per scale degree, tonic and dominant held longest.
    fn major_scale(tonic: u8) -> Vec<Note> {
        let steps = [0, 2, 4, 5, 7, 9, 11];
        let lengths = [4.0, 1.0, 2.0, 1.0, 3.0, 1.0, 0.5];
        let mut t = 0.0;
        steps
            .iter()
            .zip(lengths)
            .map(|(&step, len)| {
                let note = Note::new(60 + tonic + step, t, t + len);
                t += len;
                note
            })
            .collect()
    }

    #[test]
    fn test_c_major_needs_no_shift() {
        assert_eq!(estimate_shift(&major_scale(0)), 0);
    }

    #[test]
    fn test_g_major_shifts_down_a_fifth() {
        let est = estimate_key(&major_scale(7));
        assert_eq!(est.tonic, 7);
        assert_eq!(est.shift(), -7);
        assert_eq!(est.name(), "G Major");
    }

    #[test]
    fn test_every_rotation_of_the_profile_is_found() {
        for tonic in 0..12 {
            // Durations are exactly the rotated profile
            let notes: Vec<Note> = (0..12)
                .map(|pc| {
                    let w = MAJOR_PROFILE[(pc + 12 - tonic) % 12];
                    Note::new(48 + pc as u8, 0.0, w)
                })
                .collect();
            let est = estimate_key(&notes);
            assert_eq!(est.tonic, tonic);
            assert!((est.correlation - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_flat_histogram_scores_zero() {
        // Every pitch class equally long: zero variance, no NaN
        let notes: Vec<Note> = (0..12).map(|pc| Note::new(60 + pc, 0.0, 1.0)).collect();
        let est = estimate_key(&notes);
        assert_eq!(est.tonic, 0);
        assert_eq!(est.correlation, 0.0);
    }

    #[test]
    fn test_pearson_matches_known_values() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut b = a;
        b.reverse();
        assert!((pearson(&a, &a) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &b) + 1.0).abs() < 1e-12);
    }
}
