//! Onset quantization into simultaneous chords

use std::collections::BTreeMap;

use crate::note::Note;

/// Notes whose onsets share one quantization bucket, lowest pitch first
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    /// Index of the grid line the onsets were snapped to
    pub bucket: i64,
    /// Grid time of the bucket in seconds
    pub time: f64,
    /// Original notes, times untouched; equal pitches keep input order
    pub notes: Vec<Note>,
}

impl Chord {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn lowest(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn highest(&self) -> Option<&Note> {
        self.notes.last()
    }
}

/// Grid line nearest to `start`. Halves round to even.
pub fn bucket_of(start: f64, window: f64) -> i64 {
    (start / window).round_ties_even() as i64
}

/// Group notes by quantized onset, earliest bucket first.
///
/// `window` must be positive; the caller validates it.
pub fn group(notes: &[Note], window: f64) -> Vec<Chord> {
    let mut buckets: BTreeMap<i64, Vec<Note>> = BTreeMap::new();
    for note in notes {
        buckets.entry(bucket_of(note.start, window)).or_default().push(*note);
    }

    buckets
        .into_iter()
        .map(|(bucket, mut notes)| {
            notes.sort_by_key(|n| n.pitch);
            Chord { bucket, time: bucket as f64 * window, notes }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_near_onsets() {
        let notes = [
            Note::new(67, 0.004, 1.0),
            Note::new(60, 0.0, 1.0),
            Note::new(64, 0.008, 0.9),
            Note::new(72, 0.5, 1.0),
        ];
        let chords = group(&notes, 0.020);
        assert_eq!(chords.len(), 2);

        let pitches: Vec<u8> = chords[0].notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
        // Raw onsets survive quantization
        assert_eq!(chords[0].notes[1].start, 0.008);
        assert_eq!(chords[1].bucket, 25);
    }

    #[test]
    fn test_window_size_changes_grouping() {
        let notes = [Note::new(60, 0.0, 1.0), Note::new(64, 0.007, 1.0)];
        assert_eq!(group(&notes, 0.020).len(), 1);
        assert_eq!(group(&notes, 0.010).len(), 2);
    }

    #[test]
    fn test_members_stay_within_half_window() {
        let window = 0.02;
        let notes: Vec<Note> = (0..50)
            .map(|i| Note::new(60 + (i % 12) as u8, i as f64 * 0.0137, i as f64 * 0.0137 + 0.1))
            .collect();
        let chords = group(&notes, window);
        for chord in &chords {
            for note in &chord.notes {
                assert!((note.start - chord.time).abs() <= window / 2.0 + 1e-12);
            }
        }
        assert!(chords.windows(2).all(|w| w[0].bucket < w[1].bucket));
        assert_eq!(chords.iter().map(Chord::len).sum::<usize>(), notes.len());
    }

    #[test]
    fn test_equal_pitches_keep_input_order() {
        let notes = [Note::new(60, 0.0, 2.0), Note::new(60, 0.001, 1.0)];
        let chords = group(&notes, 0.02);
        assert_eq!(chords[0].notes[0].end, 2.0);
        assert_eq!(chords[0].notes[1].end, 1.0);
    }
}
