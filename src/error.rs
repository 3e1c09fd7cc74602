use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the persisted configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures reported by a [`crate::TrashService`]. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum TrashError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("path no longer exists")]
    NotFound,

    #[error("trash unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for TrashError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}
