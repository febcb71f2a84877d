//! keyscribe-services: MIDI file loading and result export

mod error;
pub mod export;
pub mod midi_reader;

pub use error::{ReadError, Result};
pub use export::{export_json, write_json};
pub use midi_reader::{parse_midi, read_midi, DRUM_CHANNEL};
