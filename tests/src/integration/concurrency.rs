//! # Concurrent Ingest
//!
//! Many sensors deliver in parallel while the flush coordinator swaps the
//! store out underneath them. Nothing accepted may be lost or land in two
//! snapshots.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sg_03_ingest::{
        FlushCoordinator, GatewayIngestPipeline, IngestApi, IngestConfig, InMemorySnapshotSink,
        InMemoryTelemetryLog,
    };
    use sg_04_simulation::Fleet;
    use shared_crypto::SymmetricKey;
    use shared_types::{SensorId, Timestamp};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 9, 1, 6, 0, 0).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_senders_with_concurrent_flushes() {
        const PER_SENSOR: i64 = 20;

        let ids: Vec<_> = (1..=5)
            .flat_map(|i| {
                [
                    SensorId::new(format!("soil_{i:02}")),
                    SensorId::new(format!("water_{i:02}")),
                ]
            })
            .collect();
        let key = SymmetricKey::from_bytes(&[0x42; 32]).unwrap();
        let fleet = Fleet::with_shared_key(&ids, &key).unwrap();
        let log = Arc::new(InMemoryTelemetryLog::new());
        let pipeline = Arc::new(GatewayIngestPipeline::new(
            fleet.registry,
            Arc::clone(&log),
            IngestConfig::default(),
        ));
        let flush = Arc::new(FlushCoordinator::new(
            pipeline.store(),
            InMemorySnapshotSink::new(),
        ));

        let mut senders = Vec::new();
        for (index, sensor) in fleet.sensors.into_iter().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            senders.push(tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(index as u64);
                let mut last = None;
                for step in 0..PER_SENSOR {
                    let at = epoch() + Duration::milliseconds(step * 10);
                    let msg = sensor.emit(at, &mut rng).unwrap();
                    assert!(pipeline.receive(&msg, at).is_accepted());
                    last = Some(at);
                    tokio::task::yield_now().await;
                }
                (sensor.sensor_id().clone(), last.unwrap())
            }));
        }

        let flusher = {
            let flush = Arc::clone(&flush);
            tokio::spawn(async move {
                for _ in 0..10 {
                    flush.flush(epoch()).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut last_sent = HashMap::new();
        for sender in senders {
            let (id, at) = sender.await.unwrap();
            last_sent.insert(id, at);
        }
        flusher.await.unwrap();
        flush.flush(epoch()).unwrap();

        assert_eq!(log.len(), ids.len() * PER_SENSOR as usize);

        // Each sensor's newest reading is in exactly the last snapshot that mentions it.
        let snapshots = flush.sink().snapshots();
        let cycles: Vec<_> = snapshots.iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, (1..=11).collect::<Vec<_>>());

        let mut newest: HashMap<SensorId, Timestamp> = HashMap::new();
        for snapshot in &snapshots {
            for (id, entry) in &snapshot.entries {
                let seen = newest.entry(id.clone()).or_insert(entry.timestamp);
                assert!(entry.timestamp >= *seen, "{id} went backwards across cycles");
                *seen = entry.timestamp;
            }
        }
        assert_eq!(newest, last_sent);
        assert!(pipeline.store().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_message_from_many_tasks_accepted_once() {
        let ids = [SensorId::new("plant_01")];
        let fleet = Fleet::with_shared_key(&ids, &SymmetricKey::from_array(&[0x11; 16])).unwrap();
        let log = Arc::new(InMemoryTelemetryLog::new());
        let pipeline = Arc::new(GatewayIngestPipeline::new(
            fleet.registry,
            Arc::clone(&log),
            IngestConfig::default(),
        ));
        let msg = fleet.sensors[0]
            .emit(epoch(), &mut StdRng::seed_from_u64(5))
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let msg = msg.clone();
                tokio::spawn(async move { pipeline.receive(&msg, epoch()).is_accepted() })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(log.len(), 1);
    }
}
