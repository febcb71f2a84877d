//! Fixed pitch-to-key layout of the target instrument
//!
//! The device has three rows of seven natural keys (one row per octave band).
//! Accidentals are played by holding Shift (sharp) or Ctrl (flat) with a
//! natural key. The device spells Eb and Bb as flats, so pitch class 3 is
//! Ctrl+E rather than Shift+D, and pitch class 10 is Ctrl+B.

use serde::{Deserialize, Serialize};

use crate::range::{PLAYABLE_HIGH, PLAYABLE_LOW};

/// Modifier key held together with a natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Shift,
    Ctrl,
}

impl Modifier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Ctrl => "ctrl",
        }
    }
}

/// One of the three physical key rows, 12 semitones each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    /// Band for a playable pitch, `None` outside 48..=83.
    pub fn of(pitch: i32) -> Option<Self> {
        match pitch {
            p if p < PLAYABLE_LOW => None,
            p if p < 60 => Some(Self::Low),
            p if p < 72 => Some(Self::Mid),
            p if p <= PLAYABLE_HIGH => Some(Self::High),
            _ => None,
        }
    }

    /// The seven natural keys of this row, C through B.
    pub fn keys(&self) -> &'static [char; 7] {
        match self {
            Self::Low => &['z', 'x', 'c', 'v', 'b', 'n', 'm'],
            Self::Mid => &['a', 's', 'd', 'f', 'g', 'h', 'j'],
            Self::High => &['q', 'w', 'e', 'r', 't', 'y', 'u'],
        }
    }
}

/// Pitch class (index) to natural key index within a band and modifier.
pub const CHROMATIC_MAP: [(usize, Option<Modifier>); 12] = [
    (0, None),                  // C
    (0, Some(Modifier::Shift)), // C#
    (1, None),                  // D
    (2, Some(Modifier::Ctrl)),  // Eb
    (2, None),                  // E
    (3, None),                  // F
    (3, Some(Modifier::Shift)), // F#
    (4, None),                  // G
    (4, Some(Modifier::Shift)), // G#
    (5, None),                  // A
    (6, Some(Modifier::Ctrl)),  // Bb
    (6, None),                  // B
];

/// A concrete key press on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: char,
    pub modifier: Option<Modifier>,
}

/// Map a pitch to its key binding. `None` when the pitch is outside the
/// playable window or the table has no entry for it.
pub fn lookup(pitch: i32) -> Option<KeyBinding> {
    let band = Band::of(pitch)?;
    let (key_idx, modifier) = *CHROMATIC_MAP.get(pitch.rem_euclid(12) as usize)?;
    let key = *band.keys().get(key_idx)?;
    Some(KeyBinding { key, modifier })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromatic_map_is_pinned() {
        use Modifier::{Ctrl, Shift};
        let expected = [
            (0, None),
            (0, Some(Shift)),
            (1, None),
            (2, Some(Ctrl)),
            (2, None),
            (3, None),
            (3, Some(Shift)),
            (4, None),
            (4, Some(Shift)),
            (5, None),
            (6, Some(Ctrl)),
            (6, None),
        ];
        assert_eq!(CHROMATIC_MAP, expected);
    }

    #[test]
    fn test_mid_row_lookup() {
        let row: Vec<(char, Option<Modifier>)> = (60..72)
            .map(|p| lookup(p).map(|b| (b.key, b.modifier)).unwrap())
            .collect();
        assert_eq!(
            row,
            vec![
                ('a', None),
                ('a', Some(Modifier::Shift)),
                ('s', None),
                ('d', Some(Modifier::Ctrl)),
                ('d', None),
                ('f', None),
                ('f', Some(Modifier::Shift)),
                ('g', None),
                ('g', Some(Modifier::Shift)),
                ('h', None),
                ('j', Some(Modifier::Ctrl)),
                ('j', None),
            ]
        );
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(Band::of(47), None);
        assert_eq!(Band::of(48), Some(Band::Low));
        assert_eq!(Band::of(59), Some(Band::Low));
        assert_eq!(Band::of(60), Some(Band::Mid));
        assert_eq!(Band::of(72), Some(Band::High));
        assert_eq!(Band::of(83), Some(Band::High));
        assert_eq!(Band::of(84), None);
    }

    #[test]
    fn test_same_class_different_rows() {
        assert_eq!(lookup(48).unwrap().key, 'z');
        assert_eq!(lookup(60).unwrap().key, 'a');
        assert_eq!(lookup(72).unwrap().key, 'q');
        assert_eq!(lookup(83).unwrap().key, 'u');
        assert!(lookup(84).is_none());
        assert!(lookup(-3).is_none());
    }
}
