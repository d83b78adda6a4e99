//! Snapshot files: `sensor_data_cycle_{N}.json` in a directory.
//!
//! Each file is a pretty-printed JSON object mapping sensor_id to its last
//! accepted record. Files are written to a temp path and renamed into place;
//! a failed write removes its temp file.

use crate::domain::errors::StorageError;
use crate::ports::outbound::SnapshotSink;
use shared_types::Snapshot;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name for a cycle.
pub fn snapshot_file_name(cycle: u64) -> String {
    format!("sensor_data_cycle_{cycle}.json")
}

/// Cycle number encoded in a snapshot file name.
pub fn parse_snapshot_file_name(name: &str) -> Option<u64> {
    name.strip_prefix("sensor_data_cycle_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

pub struct FileSnapshotSink {
    dir: PathBuf,
}

impl FileSnapshotSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, cycle: u64) -> PathBuf {
        self.dir.join(snapshot_file_name(cycle))
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<String, StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let bytes = serde_json::to_vec_pretty(&snapshot.entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let path = self.path_for(snapshot.cycle);
        let temp_path = path.with_extension("json.tmp");
        let written = std::fs::File::create(&temp_path)
            .and_then(|mut file| file.write_all(&bytes).and_then(|()| file.sync_all()))
            .map_err(|e| StorageError::io(&temp_path, e))
            .and_then(|()| std::fs::rename(&temp_path, &path).map_err(|e| StorageError::io(&path, e)));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %cleanup, "[sg-03] Could not remove temp snapshot");
                }
            }
            return Err(e);
        }

        debug!(cycle = snapshot.cycle, bytes = bytes.len(), "[sg-03] Snapshot file written");
        Ok(path.display().to_string())
    }

    fn last_cycle(&self) -> Result<u64, StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };
        let mut last = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            if !entry.file_type().map_or(false, |t| t.is_file()) {
                continue;
            }
            if let Some(cycle) = entry.file_name().to_str().and_then(parse_snapshot_file_name) {
                last = last.max(cycle);
            }
        }
        Ok(last)
    }
}
