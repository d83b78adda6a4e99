//! # Security Flows
//!
//! Attacks against a gateway whose fleet was provisioned by ECDH key
//! agreement with signatures required. Each test captures genuine traffic
//! from a virtual sensor, then replays, relabels, strips or mangles it.
//!
//! ## Attacks Covered:
//!
//! 1. **Replay** - resend a captured message
//! 2. **Impersonation** - relabel one sensor's message as another's
//! 3. **Downgrade** - strip the detached signature
//! 4. **Delay** - deliver a genuine message after the freshness window
//! 5. **Flooding** - exceed the per-sensor rate under `Enforce`
//! 6. **Wire tampering** - corrupt the text transport fields

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sg_01_authorization::AuthorizationRegistry;
    use sg_02_replay_guard::{RateLimitConfig, RateLimitPolicy};
    use sg_03_ingest::{
        GatewayIngestPipeline, IngestApi, IngestConfig, IngestResult, InMemoryTelemetryLog,
        RejectReason,
    };
    use sg_04_simulation::{Fleet, VirtualSensor};
    use shared_crypto::SensorKeyPair;
    use shared_types::{SensorId, Timestamp, WireEncoding};
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Pipeline = GatewayIngestPipeline<AuthorizationRegistry, Arc<InMemoryTelemetryLog>>;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 9, 1, 6, 0, 0).unwrap()
    }

    struct Deployment {
        pipeline: Pipeline,
        log: Arc<InMemoryTelemetryLog>,
        sensors: Vec<VirtualSensor>,
        rng: StdRng,
    }

    impl Deployment {
        fn sensor(&self, id: &str) -> &VirtualSensor {
            self.sensors
                .iter()
                .find(|s| s.sensor_id().as_str() == id)
                .unwrap()
        }

        fn capture(&mut self, id: &str, at: Timestamp) -> shared_types::EncryptedMessage {
            let sensor = self
                .sensors
                .iter()
                .find(|s| s.sensor_id().as_str() == id)
                .unwrap();
            sensor.emit(at, &mut self.rng).unwrap()
        }
    }

    fn deploy(config: IngestConfig) -> Deployment {
        let gateway = SensorKeyPair::generate();
        let ids = [
            SensorId::new("soil_01"),
            SensorId::new("soil_02"),
            SensorId::new("threat_04"),
        ];
        let fleet = Fleet::generate(&gateway, &ids, true).unwrap();
        let log = Arc::new(InMemoryTelemetryLog::new());
        Deployment {
            pipeline: GatewayIngestPipeline::new(fleet.registry, Arc::clone(&log), config),
            log,
            sensors: fleet.sensors,
            rng: StdRng::seed_from_u64(99),
        }
    }

    fn reason(result: &IngestResult) -> Option<RejectReason> {
        result.reason()
    }

    // =============================================================================
    // REPLAY / DELAY
    // =============================================================================

    #[test]
    fn test_captured_message_replayed() {
        let mut d = deploy(IngestConfig::default());
        let msg = d.capture("soil_01", now());

        assert!(d.pipeline.receive(&msg, now()).is_accepted());
        let replayed = d.pipeline.receive(&msg, now() + Duration::seconds(2));
        assert_eq!(reason(&replayed), Some(RejectReason::Replay));
        assert_eq!(d.log.len(), 1);
    }

    #[test]
    fn test_delayed_delivery_is_stale() {
        let mut d = deploy(IngestConfig::default());
        let msg = d.capture("threat_04", now());

        let late = d.pipeline.receive(&msg, now() + Duration::seconds(45));
        assert_eq!(reason(&late), Some(RejectReason::Stale));
        assert!(d.pipeline.store().is_empty());
    }

    // =============================================================================
    // IMPERSONATION / DOWNGRADE
    // =============================================================================

    #[test]
    fn test_relabelled_as_sibling_fails_authentication() {
        let mut d = deploy(IngestConfig::default());
        let mut msg = d.capture("soil_01", now());
        msg.sensor_id = SensorId::new("soil_02");

        let result = d.pipeline.receive(&msg, now());
        assert_eq!(reason(&result), Some(RejectReason::AuthenticationFailure));
        assert!(d.pipeline.store().get(&SensorId::new("soil_02")).is_none());
    }

    #[test]
    fn test_relabelled_as_unlisted_sensor() {
        let mut d = deploy(IngestConfig::default());
        let mut msg = d.capture("soil_01", now());
        msg.sensor_id = SensorId::new("soil_06");

        assert_eq!(
            reason(&d.pipeline.receive(&msg, now())),
            Some(RejectReason::Unauthorized)
        );
    }

    #[test]
    fn test_stripped_signature_rejected() {
        let mut d = deploy(IngestConfig::default());
        assert!(d.sensor("soil_01").is_signed());
        let mut msg = d.capture("soil_01", now());
        msg.signature = None;

        assert_eq!(
            reason(&d.pipeline.receive(&msg, now())),
            Some(RejectReason::AuthenticationFailure)
        );
    }

    #[test]
    fn test_signature_from_other_sensor_rejected() {
        let mut d = deploy(IngestConfig::default());
        let donor = d.capture("soil_02", now());
        let mut msg = d.capture("soil_01", now());
        msg.signature = donor.signature;

        assert_eq!(
            reason(&d.pipeline.receive(&msg, now())),
            Some(RejectReason::AuthenticationFailure)
        );
    }

    /// A failed attempt does not burn the genuine message's nonce.
    #[test]
    fn test_rejected_tamper_does_not_block_original() {
        let mut d = deploy(IngestConfig::default());
        let genuine = d.capture("soil_01", now());
        let mut forged = genuine.clone();
        forged.signature = None;

        assert!(!d.pipeline.receive(&forged, now()).is_accepted());
        assert!(d.pipeline.receive(&genuine, now()).is_accepted());
    }

    // =============================================================================
    // FLOODING
    // =============================================================================

    #[test]
    fn test_flood_throttled_under_enforce() {
        let mut d = deploy(IngestConfig {
            rate_limit: RateLimitConfig {
                max_requests: 5,
                window_secs: 60,
                policy: RateLimitPolicy::Enforce,
            },
            ..Default::default()
        });

        let outcomes: Vec<_> = (0..8)
            .map(|_| {
                let msg = d.capture("threat_04", now());
                d.pipeline.receive(&msg, now())
            })
            .collect();
        assert!(outcomes[..5].iter().all(IngestResult::is_accepted));
        assert!(outcomes[5..]
            .iter()
            .all(|r| reason(r) == Some(RejectReason::RateLimited)));

        // Other sensors keep their own budget.
        let other = d.capture("soil_01", now());
        assert!(d.pipeline.receive(&other, now()).is_accepted());
    }

    // =============================================================================
    // WIRE TRANSPORT
    // =============================================================================

    #[test]
    fn test_wire_round_trip_base64() {
        let mut d = deploy(IngestConfig {
            wire_encoding: WireEncoding::Base64,
            ..Default::default()
        });
        let msg = d.capture("soil_02", now());
        let wire = d.pipeline.codec().to_wire(&msg);

        let json = serde_json::to_string(&wire).unwrap();
        let parsed = serde_json::from_str(&json).unwrap();
        assert!(d.pipeline.receive_wire(&parsed, now()).is_accepted());
    }

    #[test]
    fn test_corrupted_wire_fields_malformed() {
        let mut d = deploy(IngestConfig::default());
        let msg = d.capture("soil_02", now());

        let mut bad_nonce = d.pipeline.codec().to_wire(&msg);
        bad_nonce.nonce = "not-hex".into();
        assert_eq!(
            reason(&d.pipeline.receive_wire(&bad_nonce, now())),
            Some(RejectReason::MalformedEnvelope)
        );

        let mut bad_time = d.pipeline.codec().to_wire(&msg);
        bad_time.timestamp = "yesterday".into();
        assert_eq!(
            reason(&d.pipeline.receive_wire(&bad_time, now())),
            Some(RejectReason::MalformedEnvelope)
        );

        // The untouched message still goes through.
        assert!(d.pipeline.receive(&msg, now()).is_accepted());
    }
}
