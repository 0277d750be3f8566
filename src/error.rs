//! Error taxonomy for analysis runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::analysis::{FileError, FileErrorKind};

/// Errors that can occur while analyzing a tree.
///
/// `Walk`, `Frontend` and `Config` always abort a run. `Io` and `Parse` are
/// per-file: under the default policy they are downgraded to [`FileError`]
/// entries in the report.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("{language} front-end unavailable: {message}")]
    Frontend { language: String, message: String },
    #[error("invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl AnalysisError {
    /// Whether the run can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::Io { .. } | AnalysisError::Parse { .. })
    }

    /// Report entry for a recoverable error, reporting `file` as its path.
    pub fn to_file_error(&self, file: &str) -> Option<FileError> {
        let (kind, message) = match self {
            AnalysisError::Io { source, .. } => (FileErrorKind::Io, source.to_string()),
            AnalysisError::Parse { message, .. } => (FileErrorKind::Parse, message.clone()),
            _ => return None,
        };
        Some(FileError {
            file: file.to_string(),
            kind,
            message,
        })
    }
}
