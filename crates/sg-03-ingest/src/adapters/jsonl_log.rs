//! Append-only JSON Lines telemetry log.
//!
//! One `{timestamp, sensor_id, data}` object per line. Lines are written
//! whole under a mutex, so concurrent appends never interleave.

use crate::domain::errors::StorageError;
use crate::ports::outbound::TelemetryLog;
use parking_lot::Mutex;
use shared_types::LogRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct JsonlTelemetryLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlTelemetryLog {
    /// Open (or create) the log for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::io(&path, e))?;
        info!("[sg-03] Telemetry log at {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetryLog for JsonlTelemetryLog {
    fn append(&self, record: &LogRecord) -> Result<(), StorageError> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|e| StorageError::io(&self.path, e))
    }
}
