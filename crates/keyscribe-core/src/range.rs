//! Octave folding into the playable window
//!
//! The window is three octaves, 48..=83: low 48..60, mid 60..72, high 72..84.
//! All helpers only ever move a pitch by whole octaves, so pitch class is kept.

/// Lowest playable pitch (C3)
pub const PLAYABLE_LOW: i32 = 48;
/// Highest playable pitch (B5)
pub const PLAYABLE_HIGH: i32 = 83;
/// Upper bound a bass voice is kept under (top of the mid band)
pub const BASS_CEILING: i32 = 71;

/// Fold by octaves until `lo <= pitch <= hi`. In-range pitches are untouched.
pub fn fold_to_range(pitch: i32, lo: i32, hi: i32) -> i32 {
    debug_assert!(hi - lo >= 11, "window narrower than an octave");
    let mut p = pitch;
    while p > hi {
        p -= 12;
    }
    while p < lo {
        p += 12;
    }
    p
}

/// Fold down to the lowest octave at or above `lo`.
///
/// The result always lands in `lo..lo + 12`, which keeps it under `ceiling`
/// for any ceiling at least 11 semitones above `lo`.
pub fn fold_to_lowest(pitch: i32, lo: i32, ceiling: i32) -> i32 {
    let mut p = pitch;
    while p - 12 >= lo {
        p -= 12;
    }
    while p < lo {
        p += 12;
    }
    debug_assert!(ceiling - lo < 11 || p <= ceiling);
    p
}

/// Pick the octave of `pitch` inside `lo..=hi` closest to `reference`.
///
/// Used for melody lines so a phrase crossing the window edge steps to the
/// nearest octave instead of jumping. In-range pitches come back unchanged.
/// Candidates are visited outward from the original pitch, and on equal
/// distance the first one visited wins.
pub fn wrap_preserving_contour(pitch: i32, reference: i32, lo: i32, hi: i32) -> i32 {
    if (lo..=hi).contains(&pitch) {
        return pitch;
    }

    let step = if pitch > hi { -12 } else { 12 };
    let mut best: Option<i32> = None;
    let mut p = pitch;
    while (step < 0 && p >= lo) || (step > 0 && p <= hi) {
        if (lo..=hi).contains(&p) {
            let closer = best.is_none_or(|b| (p - reference).abs() < (b - reference).abs());
            if closer {
                best = Some(p);
            }
        }
        p += step;
    }

    best.unwrap_or_else(|| pitch.clamp(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_to_range() {
        assert_eq!(fold_to_range(60, 48, 83), 60);
        assert_eq!(fold_to_range(84, 48, 83), 72);
        assert_eq!(fold_to_range(100, 48, 83), 76);
        assert_eq!(fold_to_range(30, 48, 83), 54);
        assert_eq!(fold_to_range(-5, 48, 83), 55);
    }

    #[test]
    fn test_fold_to_range_is_idempotent() {
        for p in PLAYABLE_LOW..=PLAYABLE_HIGH {
            assert_eq!(fold_to_range(p, PLAYABLE_LOW, PLAYABLE_HIGH), p);
        }
    }

    #[test]
    fn test_fold_to_lowest() {
        assert_eq!(fold_to_lowest(52, 48, BASS_CEILING), 52);
        assert_eq!(fold_to_lowest(67, 48, BASS_CEILING), 55);
        assert_eq!(fold_to_lowest(83, 48, BASS_CEILING), 59);
        assert_eq!(fold_to_lowest(36, 48, BASS_CEILING), 48);
        assert_eq!(fold_to_lowest(47, 48, BASS_CEILING), 59);
    }

    #[test]
    fn test_contour_steps_instead_of_jumping() {
        // Rising semitone past the top of the window from 83
        assert_eq!(wrap_preserving_contour(84, 83, 48, 83), 72);
        // Falling past the bottom from 48
        assert_eq!(wrap_preserving_contour(47, 48, 48, 83), 59);
        // Far above: choose the octave nearest the previous note
        assert_eq!(wrap_preserving_contour(91, 80, 48, 83), 79);
        assert_eq!(wrap_preserving_contour(91, 50, 48, 83), 55);
        assert_eq!(wrap_preserving_contour(91, 66, 48, 83), 67);
    }

    #[test]
    fn test_contour_keeps_in_range_pitch() {
        assert_eq!(wrap_preserving_contour(67, 50, 48, 83), 67);
        assert_eq!(wrap_preserving_contour(48, 83, 48, 83), 48);
    }

    #[test]
    fn test_contour_tie_prefers_first_visited() {
        // 90 folds to 78, 66, 54; reference 72 is 6 from both 78 and 66
        assert_eq!(wrap_preserving_contour(90, 72, 48, 83), 78);
        // 42 folds to 54, 66, 78; reference 60 is 6 from both 54 and 66
        assert_eq!(wrap_preserving_contour(42, 60, 48, 83), 54);
    }

    #[test]
    fn test_contour_clamps_when_window_has_no_octave() {
        assert_eq!(wrap_preserving_contour(70, 60, 60, 65), 65);
        assert_eq!(wrap_preserving_contour(55, 60, 60, 65), 60);
    }
}
