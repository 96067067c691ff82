//! Writers for cooked frame sequences.
//!
//! JSON is the serde form of [`FrameSequence`] and can be read back by
//! playback tooling. CSV has one row per frame with one column per viseme,
//! for spreadsheets and quick plots.

use crate::error::Result;
use crate::pipeline::FrameSequence;
use crate::viseme;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialisation format of a cooked sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Guess the format from a file extension, `None` when unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }
}

/// Write `sequence` in `format` to `writer`.
pub fn write_sequence<W: Write>(
    writer: &mut W,
    sequence: &FrameSequence,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, sequence),
        OutputFormat::Csv => write_csv(writer, sequence),
    }
}

/// Pretty-printed JSON, newline terminated.
pub fn write_json<W: Write>(writer: &mut W, sequence: &FrameSequence) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, sequence)?;
    writeln!(writer)?;
    Ok(())
}

/// `index,time_ms,<viseme...>,laughter` with a header row.
pub fn write_csv<W: Write>(writer: &mut W, sequence: &FrameSequence) -> Result<()> {
    let channels = sequence.viseme_count();

    let mut header = vec!["index".to_string(), "time_ms".to_string()];
    header.extend((0..channels).map(column_name));
    header.push("laughter".to_string());
    writeln!(writer, "{}", header.join(","))?;

    for frame in sequence {
        write!(writer, "{},{}", frame.index, frame.time_ms())?;
        for channel in 0..channels {
            write!(writer, ",{}", frame.weight(channel))?;
        }
        writeln!(writer, ",{}", frame.laughter)?;
    }
    Ok(())
}

/// Write `sequence` to a file, replacing it if present.
pub fn save_sequence(path: &Path, sequence: &FrameSequence, format: OutputFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_sequence(&mut writer, sequence, format)?;
    writer.flush()?;
    Ok(())
}

fn column_name(channel: usize) -> String {
    match viseme::name_of(channel) {
        Some(name) => name.to_string(),
        None => format!("v{channel}"),
    }
}
