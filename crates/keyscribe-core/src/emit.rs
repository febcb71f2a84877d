//! Turn resolved voices into timed key presses and releases

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::keymap::{self, KeyBinding, Modifier};
use crate::voice::ResolvedNote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Press,
    Release,
}

/// One key action at a point in time, seconds from the start of the piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub time: f64,
    pub action: KeyAction,
    pub key: char,
    pub modifier: Option<Modifier>,
}

impl InputEvent {
    pub fn binding(&self) -> KeyBinding {
        KeyBinding { key: self.key, modifier: self.modifier }
    }

    fn identity(&self) -> (u64, KeyAction, char, Option<Modifier>) {
        (self.time.to_bits(), self.action, self.key, self.modifier)
    }
}

/// Build the event list for a set of resolved notes.
///
/// Notes that have no key binding are skipped. Identical events collapse to
/// one, the list is stably sorted by time, and key holds are normalised so
/// each binding strictly alternates press and release.
pub fn emit(notes: &[ResolvedNote]) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(notes.len() * 2);

    for note in notes {
        let Some(binding) = keymap::lookup(note.pitch) else {
            tracing::warn!("No key for pitch {} at {:.3}s, skipping", note.pitch, note.start);
            continue;
        };
        events.push(InputEvent {
            time: note.start,
            action: KeyAction::Press,
            key: binding.key,
            modifier: binding.modifier,
        });
        events.push(InputEvent {
            time: note.end,
            action: KeyAction::Release,
            key: binding.key,
            modifier: binding.modifier,
        });
    }

    let mut events = dedup(events);
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    normalize_key_holds(events)
}

/// Drop repeats of an exact (time, action, key, modifier), keeping the first.
pub fn dedup(events: Vec<InputEvent>) -> Vec<InputEvent> {
    let mut seen = HashSet::with_capacity(events.len());
    events.into_iter().filter(|e| seen.insert(e.identity())).collect()
}

/// Make every binding alternate press/release on a time-sorted list.
///
/// A press on a key that is already down becomes a release and press at the
/// same instant. A release only lifts the key once every overlapping note on
/// it has ended; stray releases are dropped. Holds left open because dedup
/// merged their releases are closed at the last release seen for that key.
pub fn normalize_key_holds(events: Vec<InputEvent>) -> Vec<InputEvent> {
    struct Hold {
        count: usize,
        last_seen: f64,
        template: InputEvent,
    }

    let mut holds: BTreeMap<KeyBinding, Hold> = BTreeMap::new();
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        let hold = holds.entry(event.binding()).or_insert(Hold {
            count: 0,
            last_seen: event.time,
            template: event,
        });
        hold.last_seen = hold.last_seen.max(event.time);

        match event.action {
            KeyAction::Press => {
                if hold.count > 0 {
                    out.push(InputEvent { action: KeyAction::Release, ..event });
                }
                hold.count += 1;
                out.push(event);
            }
            KeyAction::Release => match hold.count {
                0 => {}
                1 => {
                    hold.count = 0;
                    out.push(event);
                }
                _ => hold.count -= 1,
            },
        }
    }

    let mut closed = false;
    for hold in holds.values().filter(|h| h.count > 0) {
        out.push(InputEvent {
            time: hold.last_seen,
            action: KeyAction::Release,
            ..hold.template
        });
        closed = true;
    }
    if closed {
        out.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceRole;

    fn resolved(pitch: i32, start: f64, end: f64) -> ResolvedNote {
        ResolvedNote { pitch, start, end, role: VoiceRole::Melody }
    }

    fn compact(events: &[InputEvent]) -> Vec<(f64, KeyAction, char)> {
        events.iter().map(|e| (e.time, e.action, e.key)).collect()
    }

    #[test]
    fn test_press_then_release_per_note() {
        let events = emit(&[resolved(63, 0.5, 1.0)]);
        assert_eq!(
            events,
            vec![
                InputEvent { time: 0.5, action: KeyAction::Press, key: 'd', modifier: Some(Modifier::Ctrl) },
                InputEvent { time: 1.0, action: KeyAction::Release, key: 'd', modifier: Some(Modifier::Ctrl) },
            ]
        );
    }

    #[test]
    fn test_sorted_by_time() {
        let events = emit(&[resolved(72, 1.0, 2.0), resolved(48, 0.0, 0.5), resolved(60, 0.25, 3.0)]);
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_octaves_are_not_merged() {
        let events = emit(&[resolved(60, 0.0, 1.0), resolved(72, 0.0, 1.0)]);
        assert_eq!(
            compact(&events),
            vec![
                (0.0, KeyAction::Press, 'a'),
                (0.0, KeyAction::Press, 'q'),
                (1.0, KeyAction::Release, 'a'),
                (1.0, KeyAction::Release, 'q'),
            ]
        );
    }

    #[test]
    fn test_identical_events_collapse() {
        let events = emit(&[resolved(60, 0.0, 1.0), resolved(60, 0.0, 1.0)]);
        assert_eq!(
            compact(&events),
            vec![(0.0, KeyAction::Press, 'a'), (1.0, KeyAction::Release, 'a')]
        );
    }

    #[test]
    fn test_unplayable_pitch_is_skipped() {
        let events = emit(&[resolved(20, 0.0, 1.0), resolved(62, 0.0, 1.0), resolved(99, 0.0, 1.0)]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, 's');
    }

    #[test]
    fn test_overlapping_holds_retrigger() {
        // Same key held 0..2 and pressed again at 1 until 3
        let events = emit(&[resolved(60, 0.0, 2.0), resolved(60, 1.0, 3.0)]);
        assert_eq!(
            compact(&events),
            vec![
                (0.0, KeyAction::Press, 'a'),
                (1.0, KeyAction::Release, 'a'),
                (1.0, KeyAction::Press, 'a'),
                (3.0, KeyAction::Release, 'a'),
            ]
        );
    }

    #[test]
    fn test_shared_onset_different_ends() {
        let events = emit(&[resolved(60, 0.0, 1.0), resolved(60, 0.0, 2.0)]);
        assert_eq!(
            compact(&events),
            vec![(0.0, KeyAction::Press, 'a'), (1.0, KeyAction::Release, 'a')]
        );
    }

    #[test]
    fn test_merged_release_does_not_stick() {
        // Both notes end at 2.0, so dedup leaves a single release
        let events = emit(&[resolved(60, 0.0, 2.0), resolved(60, 1.0, 2.0)]);
        assert_eq!(
            compact(&events),
            vec![
                (0.0, KeyAction::Press, 'a'),
                (1.0, KeyAction::Release, 'a'),
                (1.0, KeyAction::Press, 'a'),
                (2.0, KeyAction::Release, 'a'),
            ]
        );
    }

    #[test]
    fn test_zero_length_note_after_release() {
        let events = emit(&[resolved(60, 0.0, 1.0), resolved(60, 1.0, 1.0)]);
        assert_eq!(
            compact(&events),
            vec![
                (0.0, KeyAction::Press, 'a'),
                (1.0, KeyAction::Release, 'a'),
                (1.0, KeyAction::Press, 'a'),
                (1.0, KeyAction::Release, 'a'),
            ]
        );
    }

    #[test]
    fn test_back_to_back_notes() {
        // Later note listed first, so its press at 1.0 sorts ahead of the release
        let events = emit(&[resolved(67, 1.0, 2.0), resolved(67, 0.0, 1.0)]);
        assert_eq!(
            compact(&events),
            vec![
                (0.0, KeyAction::Press, 'g'),
                (1.0, KeyAction::Release, 'g'),
                (1.0, KeyAction::Press, 'g'),
                (2.0, KeyAction::Release, 'g'),
            ]
        );
    }
}
