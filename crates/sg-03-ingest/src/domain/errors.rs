//! # Storage Errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the durable sinks (telemetry log, snapshot files).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The sink refused the write (used by test doubles and custom sinks).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
