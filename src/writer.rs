//! Append-only CSV log: one open → write → close cycle per row or block.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::warn;

use crate::destination::Destination;
use crate::error::CaptureError;
use crate::event::{format_timestamp, KeyEvent};

pub const HEADER: [&str; 2] = ["timestamp", "key"];
pub const MANUAL_SAVE_LABEL: &str = "--- Manual save at";
const LINE_TERMINATOR: &str = "\r\n";

/// Durable sink for captured events. Failures are returned, never retried.
pub trait EventLog {
    /// Open the destination for append and close it again without writing.
    fn probe(&mut self, destination: &Destination) -> Result<(), CaptureError>;

    /// Write the header row if this destination has none yet. Returns whether a
    /// row was written.
    fn write_header(&mut self, destination: &mut Destination) -> Result<bool, CaptureError>;

    fn append(&mut self, event: &KeyEvent, destination: &Destination)
        -> Result<(), CaptureError>;

    /// Append a marker row followed by `lines`, all stamped with `as_of`.
    fn flush_block(
        &mut self,
        lines: &[String],
        destination: &Destination,
        as_of: NaiveDateTime,
    ) -> Result<(), CaptureError>;
}

/// Render one CSV record, quoting fields that contain delimiters, quotes, or
/// line breaks.
pub fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut row = String::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            row.push(',');
        }
        let field = field.as_ref();
        if field.contains([',', '"', '\r', '\n']) {
            row.push('"');
            row.push_str(&field.replace('"', "\"\""));
            row.push('"');
        } else {
            row.push_str(field);
        }
    }
    row.push_str(LINE_TERMINATOR);
    row
}

/// Sink that can be cut back to an earlier length.
trait Truncate {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `payload` in one call; on failure cut `sink` back to `before` bytes.
fn write_or_rollback<W: Write + Truncate>(
    sink: &mut W,
    before: u64,
    payload: &[u8],
    path: &Path,
) -> Result<(), CaptureError> {
    if let Err(source) = sink.write_all(payload).and_then(|_| sink.flush()) {
        if let Err(err) = sink.truncate_to(before) {
            warn!(path = %path.display(), error = %err, "partial row could not be removed");
        }
        return Err(CaptureError::io("writing", path, source));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct CsvLogWriter {
    headers_written: HashSet<PathBuf>,
}

impl CsvLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `payload` in a single call. On failure the file is cut back to its
    /// previous length so no partial row survives.
    fn append_raw(&self, path: &Path, payload: &str) -> Result<(), CaptureError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| CaptureError::io("opening", path, source))?;
        let before = file
            .metadata()
            .map_err(|source| CaptureError::io("inspecting", path, source))?
            .len();
        write_or_rollback(&mut file, before, payload.as_bytes(), path)
    }
}

impl EventLog for CsvLogWriter {
    fn probe(&mut self, destination: &Destination) -> Result<(), CaptureError> {
        let path = destination.path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(drop)
            .map_err(|source| CaptureError::io("opening", path, source))
    }

    fn write_header(&mut self, destination: &mut Destination) -> Result<bool, CaptureError> {
        let path = destination.path().to_path_buf();
        if destination.header_written() || self.headers_written.contains(&path) {
            destination.mark_header_written();
            return Ok(false);
        }
        let existing = fs::metadata(&path)
            .map_err(|source| CaptureError::io("inspecting", &path, source))?
            .len();
        if existing == 0 {
            self.append_raw(&path, &csv_row(&HEADER))?;
        }
        self.headers_written.insert(path);
        destination.mark_header_written();
        Ok(existing == 0)
    }

    fn append(
        &mut self,
        event: &KeyEvent,
        destination: &Destination,
    ) -> Result<(), CaptureError> {
        let row = csv_row(&[event.timestamp_text(), event.representation()]);
        self.append_raw(destination.path(), &row)
    }

    fn flush_block(
        &mut self,
        lines: &[String],
        destination: &Destination,
        as_of: NaiveDateTime,
    ) -> Result<(), CaptureError> {
        let stamp = format_timestamp(as_of);
        let mut block = csv_row(&[MANUAL_SAVE_LABEL, stamp.as_str()]);
        for line in lines {
            block.push_str(&csv_row(&[stamp.as_str(), line.as_str()]));
        }
        self.append_raw(destination.path(), &block)
    }
}
