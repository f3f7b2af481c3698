//! Frame decoding and replay commands.
//!
//! Input holds one delta frame per line, either bare or as a JSON string
//! literal (frames never need escaping, so the quotes are simply stripped).
//! Blank lines and lines starting with `#` are ignored.

use std::io::{self, BufRead};

use clientmetric_proto::{RecordReader, ReplayState};
use thiserror::Error;
use tracing::{debug, warn};

use crate::formatter::{Formatter, LineRecord};

/// Command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Reading the input failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A frame could not be parsed or applied.
    #[error("line {line}: {source}")]
    Frame {
        line: usize,
        #[source]
        source: clientmetric_proto::Error,
    },
}

/// Strip the quotes of a JSON-embedded frame.
fn frame_text(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(
        line.strip_prefix('"')
            .and_then(|l| l.strip_suffix('"'))
            .unwrap_or(line),
    )
}

/// Read all frames from `input` as `(line number, frame)` pairs.
fn read_frames<R: BufRead>(input: R) -> Result<Vec<(usize, String)>, CommandError> {
    let mut frames = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if let Some(frame) = frame_text(&line) {
            frames.push((index + 1, frame.to_string()));
        }
    }
    debug!(frames = frames.len(), "read frames");
    Ok(frames)
}

/// Decode every frame in `input` and format its records.
pub fn decode<R: BufRead>(input: R, formatter: &dyn Formatter) -> Result<String, CommandError> {
    let frames = read_frames(input)?;

    let mut records = Vec::new();
    for (line, frame) in &frames {
        for record in RecordReader::new(frame) {
            let record = record.map_err(|source| CommandError::Frame {
                line: *line,
                source,
            })?;
            records.push(LineRecord {
                line: *line,
                record,
            });
        }
    }

    Ok(formatter.format_records(&records))
}

/// Apply every frame in `input` in order and format the resulting values.
///
/// With `skip_invalid`, malformed frames are logged and skipped instead of
/// aborting the replay.
pub fn replay<R: BufRead>(
    input: R,
    skip_invalid: bool,
    formatter: &dyn Formatter,
) -> Result<String, CommandError> {
    let mut state = ReplayState::new();

    for (line, frame) in read_frames(input)? {
        match state.apply_frame(&frame) {
            Ok(applied) => debug!(line, applied, "applied frame"),
            Err(source) if skip_invalid => {
                warn!(line, error = %source, "skipping malformed frame");
            }
            Err(source) => return Err(CommandError::Frame { line, source }),
        }
    }

    Ok(formatter.format_state(&state))
}
