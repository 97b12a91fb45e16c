//! Filesystem operation errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by sandboxed file operations
#[derive(Debug, Error)]
pub enum FsError {
    #[error("Permission denied: {path} is outside the base directory {base}")]
    PermissionDenied { path: String, base: PathBuf },

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Unable to read file (binary or encoding issue): {path}")]
    UnsupportedEncoding { path: String },

    #[error("Invalid base directory {path}: {source}")]
    InvalidBase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Wrap an IO error, mapping `NotFound` to the dedicated variant
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound { path },
            std::io::ErrorKind::InvalidData => FsError::UnsupportedEncoding { path },
            _ => FsError::Io { path, source },
        }
    }

    /// True for sandbox escapes
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, FsError::PermissionDenied { .. })
    }
}
