//! Error types for StructView operations.

use crate::scanner::archive::ArchiveFormat;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using [`AnalyzeError`].
pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that end an analysis or an export.
///
/// Unreadable sub-paths found *during* a walk are not errors: they are
/// recorded in [`Report::skipped`](crate::scanner::Report::skipped) and the
/// walk continues.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The root path does not exist.
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The root path exists but cannot be read.
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// `top_k` must keep at least one extension.
    #[error("top-k must be at least 1 (got {0})")]
    InvalidTopK(usize),

    /// Recognised archive that no reader is available for.
    #[error("unsupported archive format ({format}): {}", path.display())]
    UnsupportedArchive { path: PathBuf, format: ArchiveFormat },

    /// Archive whose member list could not be read.
    #[error("corrupt or unreadable {format} archive {}: {message}", path.display())]
    CorruptArchive {
        path: PathBuf,
        format: ArchiveFormat,
        message: String,
    },

    /// Any other I/O failure on a named path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing an export or chart failed.
    #[error("write error: {0}")]
    Write(#[from] io::Error),

    /// JSON serialisation failed.
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialisation failed.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalyzeError {
    /// Classify an I/O error on `path` into the matching variant.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
