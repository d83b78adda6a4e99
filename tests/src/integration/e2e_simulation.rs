//! # End-to-End Simulation Tests
//!
//! Run the discrete-event simulator against a fully wired gateway and check
//! what lands on disk.
//!
//! ## Flow Tested:
//!
//! ```text
//! VirtualSensor ──emit──→ GatewayIngestPipeline ──→ sensor_log.jsonl
//!                               │
//!                               ↓ (every flush_interval)
//!                        FlushCoordinator ──→ snapshots/sensor_data_cycle_N.json
//! ```

#[cfg(test)]
mod tests {
    use gateway_runtime::{GatewayConfig, GatewayRuntime};
    use sg_03_ingest::snapshot_file_name;
    use shared_types::{LogRecord, SensorId, SnapshotEntry};
    use std::collections::{BTreeMap, HashMap};
    use std::path::Path;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn soil_sensors(n: u32) -> Vec<SensorId> {
        (1..=n).map(|i| SensorId::new(format!("soil_{i:02}"))).collect()
    }

    fn config(dir: &Path, duration: u64, flush_interval: u64) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.storage.data_dir = dir.to_path_buf();
        config.simulation.duration = duration;
        config.simulation.flush_interval = flush_interval;
        config
    }

    fn read_snapshot(path: &Path) -> BTreeMap<SensorId, SnapshotEntry> {
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn read_log(path: &Path) -> Vec<LogRecord> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    // =============================================================================
    // E2E: SIMULATION → STORAGE
    // =============================================================================

    /// Five soil sensors over one flush interval produce exactly one snapshot.
    #[test]
    fn test_single_cycle_run_writes_one_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let runtime =
            GatewayRuntime::with_sensors(config(dir.path(), 300, 300), &soil_sensors(5)).unwrap();

        let report = runtime.run_simulation().unwrap();
        assert_eq!(report.rejected_total(), 0);
        assert_eq!(report.snapshots.len(), 1);

        let snapshot_dir = runtime.config().storage.snapshot_path();
        let files: Vec<_> = std::fs::read_dir(&snapshot_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec![snapshot_file_name(1)]);

        let snapshot = read_snapshot(&snapshot_dir.join(snapshot_file_name(1)));
        assert!(!snapshot.is_empty() && snapshot.len() <= 5);
        for (id, entry) in &snapshot {
            assert_eq!(&entry.sensor_id, id);
            assert_eq!(entry.sensor_type.as_str(), "soil");
            assert!(entry.data.contains_key("moisture"));
        }
    }

    /// Every snapshot entry is the newest log record for its sensor.
    #[test]
    fn test_snapshot_holds_latest_logged_reading() {
        let dir = tempfile::tempdir().unwrap();
        let ids = [
            SensorId::new("soil_01"),
            SensorId::new("atmospheric_02"),
            SensorId::new("threat_04"),
        ];
        let runtime = GatewayRuntime::with_sensors(config(dir.path(), 120, 120), &ids).unwrap();
        let report = runtime.run_simulation().unwrap();

        let log = read_log(&runtime.config().storage.log_path());
        assert_eq!(log.len() as u64, report.accepted);

        let mut latest: HashMap<SensorId, LogRecord> = HashMap::new();
        for record in log {
            latest.insert(record.sensor_id.clone(), record);
        }

        let snapshot = read_snapshot(
            &runtime
                .config()
                .storage
                .snapshot_path()
                .join(snapshot_file_name(1)),
        );
        assert_eq!(snapshot.len(), latest.len());
        for (id, entry) in snapshot {
            let record = &latest[&id];
            assert_eq!(entry.timestamp, record.timestamp);
            assert_eq!(entry.data, record.data);
        }
    }

    /// Default schedule: three cycles, each snapshot only holds that cycle's readings.
    #[test]
    fn test_default_duration_three_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let runtime =
            GatewayRuntime::with_sensors(config(dir.path(), 900, 300), &soil_sensors(3)).unwrap();
        let report = runtime.run_simulation().unwrap();

        let cycles: Vec<_> = report.snapshots.iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, vec![1, 2, 3]);

        let dir = runtime.config().storage.snapshot_path();
        let mut previous_max = None;
        for cycle in 1..=3 {
            let snapshot = read_snapshot(&dir.join(snapshot_file_name(cycle)));
            let newest = snapshot.values().map(|e| e.timestamp).max();
            let oldest = snapshot.values().map(|e| e.timestamp).min();
            if let (Some(prev), Some(oldest)) = (previous_max, oldest) {
                assert!(oldest > prev, "cycle {cycle} holds a reading from an earlier cycle");
            }
            previous_max = newest.or(previous_max);
        }
    }

    /// The full 25-sensor deployment runs clean with signatures required.
    #[test]
    fn test_default_fleet_signed_run() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = GatewayRuntime::new(config(dir.path(), 30, 30)).unwrap();
        assert_eq!(runtime.sensors().len(), 25);
        assert!(runtime.sensors().iter().all(|s| s.is_signed()));

        let report = runtime.run_simulation().unwrap();
        assert_eq!(report.emit_failures, 0);
        assert_eq!(report.rejected_total(), 0);
        assert!(report.accepted >= 25);
        assert_eq!(report.snapshots[0].entries, 25);
    }

    /// Keys persisted to a key directory are reused by the next run.
    #[test]
    fn test_key_directory_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 30, 30);
        cfg.keys.key_dir = Some(dir.path().join("keys"));

        let first = GatewayRuntime::with_sensors(cfg.clone(), &soil_sensors(2)).unwrap();
        first.run_simulation().unwrap();

        cfg.keys.generate_missing = false;
        let second = GatewayRuntime::with_sensors(cfg, &soil_sensors(2)).unwrap();
        let report = second.run_simulation().unwrap();
        assert_eq!(report.rejected_total(), 0);
        assert!(dir.path().join("keys").join("soil_01_priv.pem").exists());
        assert!(dir.path().join("keys").join("gateway_1_pub.pem").exists());
    }
}
