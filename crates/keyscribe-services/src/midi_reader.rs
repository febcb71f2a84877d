//! Standard MIDI File reader producing a [`Score`]
//!
//! Each (track, channel) pair with notes becomes one instrument. Channel 10
//! (index 9) is the General MIDI drum channel and is flagged `is_drum`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use keyscribe_core::{Instrument, Note, Score};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::{ReadError, Result};

/// General MIDI percussion channel, zero-based
pub const DRUM_CHANNEL: u8 = 9;
/// 120 BPM, the tempo assumed until the file says otherwise
const DEFAULT_TEMPO_US: u32 = 500_000;

/// Read and parse a MIDI file from disk.
pub fn read_midi(path: &Path) -> Result<Score> {
    let data = std::fs::read(path)?;
    let score = parse_midi(&data)?;
    tracing::debug!(
        "Read {}: {} instruments, {:.2}s",
        path.display(),
        score.instruments.len(),
        score.end_time
    );
    Ok(score)
}

/// Parse an in-memory Standard MIDI File.
pub fn parse_midi(data: &[u8]) -> Result<Score> {
    let smf = Smf::parse(data).map_err(|e| ReadError::Parse(e.to_string()))?;
    let clock = TickClock::new(&smf);

    let mut instruments = Vec::new();
    let mut last_tick = 0u64;

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut tick = 0u64;
        let mut name: Option<String> = None;
        let mut programs: HashMap<u8, u8> = HashMap::new();
        // (channel, key) -> tick of the sounding note-on
        let mut open: HashMap<(u8, u8), u64> = HashMap::new();
        let mut parts: BTreeMap<u8, Vec<Note>> = BTreeMap::new();

        for event in track {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(raw)) => {
                    name = Some(String::from_utf8_lossy(raw).trim().to_string());
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            let key = key.as_int();
                            // A repeated note-on ends the note already sounding on that key
                            if let Some(start) = open.insert((channel, key), tick) {
                                parts
                                    .entry(channel)
                                    .or_default()
                                    .push(Note::new(key, clock.seconds(start), clock.seconds(tick)));
                            }
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let key = key.as_int();
                            if let Some(start) = open.remove(&(channel, key)) {
                                parts
                                    .entry(channel)
                                    .or_default()
                                    .push(Note::new(key, clock.seconds(start), clock.seconds(tick)));
                            }
                        }
                        MidiMessage::ProgramChange { program } => {
                            programs.insert(channel, program.as_int());
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        last_tick = last_tick.max(tick);

        // Notes still sounding at the end of the track
        let dangling = open.len();
        for ((channel, key), start) in open {
            parts
                .entry(channel)
                .or_default()
                .push(Note::new(key, clock.seconds(start), clock.seconds(tick)));
        }
        if dangling > 0 {
            tracing::warn!("Track {}: closed {} unterminated notes at track end", track_idx, dangling);
        }

        for (channel, mut notes) in parts {
            notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
            let label = name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Track {track_idx}"));
            instruments.push(Instrument {
                name: format!("{label} (ch {})", channel + 1),
                program: programs.get(&channel).copied().unwrap_or(0),
                is_drum: channel == DRUM_CHANNEL,
                notes,
            });
        }
    }

    Ok(Score {
        instruments,
        end_time: clock.seconds(last_tick),
    })
}

/// Converts absolute ticks to seconds using the file's tempo map
struct TickClock {
    /// Ticks per quarter note for metrical timing
    ticks_per_beat: Option<f64>,
    /// Fixed tick length for SMPTE timing
    seconds_per_tick: f64,
    /// (tick, seconds at tick, microseconds per beat from tick on)
    segments: Vec<(u64, f64, u32)>,
}

impl TickClock {
    fn new(smf: &Smf) -> Self {
        match smf.header.timing {
            Timing::Metrical(tpb) => {
                let tpb = (tpb.as_int() as f64).max(1.0);
                Self {
                    ticks_per_beat: Some(tpb),
                    seconds_per_tick: 0.0,
                    segments: tempo_segments(smf, tpb),
                }
            }
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = (fps.as_f32() as f64 * subframes as f64).max(1.0);
                Self {
                    ticks_per_beat: None,
                    seconds_per_tick: 1.0 / ticks_per_second,
                    segments: Vec::new(),
                }
            }
        }
    }

    fn seconds(&self, tick: u64) -> f64 {
        let Some(tpb) = self.ticks_per_beat else {
            return tick as f64 * self.seconds_per_tick;
        };
        let idx = self.segments.partition_point(|&(t, _, _)| t <= tick).saturating_sub(1);
        let (seg_tick, seg_secs, tempo) = self.segments[idx];
        seg_secs + (tick - seg_tick) as f64 / tpb * tempo as f64 / 1_000_000.0
    }
}

/// Tempo changes from every track merged into one timeline.
fn tempo_segments(smf: &Smf, tpb: f64) -> Vec<(u64, f64, u32)> {
    let mut changes: BTreeMap<u64, u32> = BTreeMap::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(us)) = event.kind {
                changes.insert(tick, us.as_int().max(1));
            }
        }
    }

    let mut segments = vec![(0u64, 0.0f64, DEFAULT_TEMPO_US)];
    let (mut prev_tick, mut prev_secs, mut prev_tempo) = segments[0];
    for (tick, tempo) in changes {
        let secs = prev_secs + (tick - prev_tick) as f64 / tpb * prev_tempo as f64 / 1_000_000.0;
        if tick == 0 {
            segments.clear();
        }
        segments.push((tick, secs, tempo));
        (prev_tick, prev_secs, prev_tempo) = (tick, secs, tempo);
    }
    segments
}
