use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse failure classes the session controller dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    IoError,
    NoDestination,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("permission denied while {operation} {path}: {source}")]
    PermissionDenied {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no log destination chosen")]
    NoDestination,
}

impl CaptureError {
    /// Classify a filesystem error against the path it was raised for.
    pub fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                operation,
                path,
                source,
            }
        } else {
            Self::Io {
                operation,
                path,
                source,
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PermissionDenied { .. } => FailureKind::PermissionDenied,
            Self::Io { .. } => FailureKind::IoError,
            Self::NoDestination => FailureKind::NoDestination,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied { path, .. } | Self::Io { path, .. } => Some(path),
            Self::NoDestination => None,
        }
    }

    /// Short operator-facing summary for the status bar.
    pub fn headline(&self) -> &'static str {
        match self.kind() {
            FailureKind::PermissionDenied => "Permission denied",
            FailureKind::IoError => "File error",
            FailureKind::NoDestination => "No file",
        }
    }
}
