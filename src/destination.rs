//! Turning an operator choice (or the generated default) into a writable log file.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::CaptureError;
use crate::event::{now_seconds, Clock, SystemClock};

/// Folder created under the documents root for generated logs.
pub const DEFAULT_LOG_DIR: &str = "keylogs";

/// A resolved, writable log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    path: PathBuf,
    header_written: bool,
}

impl Destination {
    pub fn new(path: impl Into<PathBuf>, header_written: bool) -> Self {
        Self {
            path: path.into(),
            header_written,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Only ever flips to `true`.
    pub(crate) fn mark_header_written(&mut self) {
        self.header_written = true;
    }
}

pub trait DestinationResolver {
    /// Validate an operator-chosen path, creating missing parent folders.
    fn resolve(&self, path: &Path) -> Result<Destination, CaptureError>;

    /// Create a timestamped file under the default log folder.
    fn generate_default(&self) -> Result<Destination, CaptureError>;
}

/// `<root>/keylogs/typing_log_<YYYYMMDD_HHMMSS>.csv`
pub fn default_log_path(documents_root: &Path, at: NaiveDateTime) -> PathBuf {
    documents_root
        .join(DEFAULT_LOG_DIR)
        .join(format!("typing_log_{}.csv", at.format("%Y%m%d_%H%M%S")))
}

/// `$HOME/Documents` (`%USERPROFILE%\Documents` on Windows), falling back to the
/// working directory when neither is set.
pub fn documents_root() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Documents"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolver backed by the real filesystem.
pub struct FsDestinationResolver {
    documents_root: PathBuf,
    clock: Box<dyn Clock>,
}

impl FsDestinationResolver {
    pub fn new(documents_root: impl Into<PathBuf>) -> Self {
        Self::with_clock(documents_root, SystemClock)
    }

    pub fn with_clock(documents_root: impl Into<PathBuf>, clock: impl Clock + 'static) -> Self {
        Self {
            documents_root: documents_root.into(),
            clock: Box::new(clock),
        }
    }

    pub fn default_dir(&self) -> PathBuf {
        self.documents_root.join(DEFAULT_LOG_DIR)
    }
}

impl DestinationResolver for FsDestinationResolver {
    fn resolve(&self, path: &Path) -> Result<Destination, CaptureError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| CaptureError::io("creating folder", parent, source))?;
        }
        // Opening for append both proves writability and creates the file.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| CaptureError::io("opening", path, source))?;
        let len = fs::metadata(path)
            .map_err(|source| CaptureError::io("inspecting", path, source))?
            .len();
        Ok(Destination::new(path, len > 0))
    }

    fn generate_default(&self) -> Result<Destination, CaptureError> {
        let path = default_log_path(&self.documents_root, now_seconds(self.clock.as_ref()));
        self.resolve(&path)
    }
}
