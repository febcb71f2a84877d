//! JSON export of a finished transcription

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use keyscribe_core::Transcription;

use crate::error::Result;

/// Write a transcription as pretty-printed JSON.
pub fn write_json<W: Write>(transcription: &Transcription, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, transcription)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a transcription to a JSON file, replacing it if present.
pub fn export_json(transcription: &Transcription, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_json(transcription, BufWriter::new(file))?;
    tracing::info!(
        "Exported {} events to {}",
        transcription.events.len(),
        path.display()
    );
    Ok(())
}
