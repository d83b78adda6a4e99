//! # Gateway Ingest Pipeline
//!
//! Implements `IngestApi`: the fixed-order validation of one encrypted
//! message, followed by store update and log append on acceptance.

use crate::adapters::alert::TracingAlert;
use crate::domain::result::{IngestResult, IngestStage, RejectReason};
use crate::domain::store::LatestReadingsStore;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::inbound::IngestApi;
use crate::ports::outbound::{AlertKind, OperatorAlert, SensorAuthorizer, TelemetryLog};
use sg_02_replay_guard::{
    Admission, RateLimitConfig, ReplayConfig, ReplayConfigError, ReplayGuard, ReplayVerdict,
    SensorRateLimiter,
};
use shared_crypto::{decrypt, verify, AeadNonce, CryptoError};
use shared_types::{
    EncryptedMessage, LogRecord, TelemetryCodec, TelemetryEnvelope, Timestamp, WireEncoding,
    WireEnvelope,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    pub replay: ReplayConfig,
    pub rate_limit: RateLimitConfig,
    pub wire_encoding: WireEncoding,
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), ReplayConfigError> {
        self.replay.validate()?;
        self.rate_limit.validate()
    }
}

/// The gateway's ingest service.
///
/// Owns the replay guard and rate windows; shares the latest-readings store
/// with the `FlushCoordinator` through an `Arc`.
pub struct GatewayIngestPipeline<A: SensorAuthorizer, L: TelemetryLog> {
    authorizer: A,
    log: L,
    codec: TelemetryCodec,
    replay_guard: ReplayGuard,
    rate_limiter: SensorRateLimiter,
    store: Arc<LatestReadingsStore>,
    alert: Arc<dyn OperatorAlert>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<A: SensorAuthorizer, L: TelemetryLog> GatewayIngestPipeline<A, L> {
    /// Create a pipeline with a fresh store, tracing alerts and no metrics.
    pub fn new(authorizer: A, log: L, config: IngestConfig) -> Self {
        Self {
            authorizer,
            log,
            codec: TelemetryCodec::new(config.wire_encoding),
            replay_guard: ReplayGuard::new(&config.replay),
            rate_limiter: SensorRateLimiter::new(config.rate_limit),
            store: Arc::new(LatestReadingsStore::new()),
            alert: Arc::new(TracingAlert),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<LatestReadingsStore>) -> Self {
        self.store = store;
        self
    }

    #[must_use]
    pub fn with_alert(mut self, alert: Arc<dyn OperatorAlert>) -> Self {
        self.alert = alert;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Store shared with the flush coordinator.
    pub fn store(&self) -> Arc<LatestReadingsStore> {
        Arc::clone(&self.store)
    }

    pub fn codec(&self) -> &TelemetryCodec {
        &self.codec
    }

    pub fn replay_guard(&self) -> &ReplayGuard {
        &self.replay_guard
    }

    /// Drop idle per-sensor rate windows and expired nonces.
    pub fn housekeeping(&self, now: Timestamp) {
        self.rate_limiter.cleanup(now);
        self.replay_guard.prune_expired(now);
    }

    fn validate(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult {
        let sensor_id = &message.sensor_id;
        let mut stage = IngestStage::Received;

        // 1. Authorization: allow-list, then credential. No crypto yet.
        if !self.authorizer.is_authorized(sensor_id) {
            return IngestResult::reject(stage, RejectReason::Unauthorized);
        }
        let Some(credential) = self.authorizer.credential(sensor_id) else {
            return IngestResult::reject(stage, RejectReason::Unauthorized);
        };
        stage = IngestStage::AuthorizationChecked;

        // 2. Decrypt + authenticate, then decode the canonical plaintext.
        let nonce = AeadNonce::from_bytes(message.aead_nonce);
        let plaintext = match decrypt(
            &nonce,
            &message.ciphertext,
            credential.symmetric_key().as_bytes(),
        ) {
            Ok(plaintext) => plaintext,
            Err(CryptoError::InvalidKeyLength { .. }) => {
                return IngestResult::reject(stage, RejectReason::InvalidKeyLength)
            }
            Err(_) => return IngestResult::reject(stage, RejectReason::AuthenticationFailure),
        };
        stage = IngestStage::Decrypted;

        let envelope = match self.codec.decode_envelope(&plaintext) {
            Ok(envelope)
                if envelope.sensor_id == *sensor_id
                    && sensor_id.sensor_type() == Some(envelope.sensor_type) =>
            {
                envelope
            }
            Ok(envelope) => {
                warn!(
                    sensor_id = %sensor_id,
                    inner_sensor_id = %envelope.sensor_id,
                    inner_type = %envelope.sensor_type,
                    "[sg-03] Authenticated id or type does not match routing id"
                );
                return IngestResult::reject(stage, RejectReason::MalformedEnvelope);
            }
            Err(e) => {
                debug!(sensor_id = %sensor_id, error = %e, "[sg-03] Undecodable plaintext");
                return IngestResult::reject(stage, RejectReason::MalformedEnvelope);
            }
        };

        // 3. Detached signature over the decrypted canonical bytes.
        if let Some(verifying_key) = credential.verifying_key() {
            let valid = message
                .signature
                .as_deref()
                .is_some_and(|signature| verify(verifying_key, &plaintext, signature));
            if !valid {
                return IngestResult::reject(stage, RejectReason::AuthenticationFailure);
            }
            stage = IngestStage::SignatureVerified;
        }

        // 4 + 5. Rate window around replay / freshness. Only messages that
        // pass the replay guard count against the sensor's budget.
        let admitted = self.rate_limiter.admit(sensor_id, now, || {
            match self
                .replay_guard
                .check_and_record(envelope.nonce, envelope.timestamp, now)
            {
                ReplayVerdict::Accepted => Ok(()),
                ReplayVerdict::RejectedReplay => Err(RejectReason::Replay),
                ReplayVerdict::RejectedStale => Err(RejectReason::Stale),
            }
        });
        match admitted {
            Ok(decision) if decision.is_exceeded() => {
                self.metrics.record_rate_limit_signal(sensor_id);
                warn!(sensor_id = %sensor_id, ?decision, "[sg-03] Rate limit exceeded");
            }
            Ok(_) => {}
            Err(Admission::Refused(reason)) => return IngestResult::reject(stage, reason),
            Err(Admission::Throttled(decision)) => {
                // A known nonce is still a replay, whatever the budget.
                if self.replay_guard.contains(&envelope.nonce) {
                    return IngestResult::reject(stage, RejectReason::Replay);
                }
                self.metrics.record_rate_limit_signal(sensor_id);
                warn!(sensor_id = %sensor_id, ?decision, "[sg-03] Rate limit exceeded");
                return IngestResult::reject(stage, RejectReason::RateLimited);
            }
        }

        self.commit(&envelope);
        IngestResult::Accepted(envelope.with_signature(message.signature.clone()))
    }

    fn commit(&self, envelope: &TelemetryEnvelope) {
        self.store.upsert(envelope.clone());
        if let Err(e) = self.log.append(&LogRecord::from(envelope)) {
            self.metrics.record_storage_failure();
            self.alert.raise(
                AlertKind::LogAppendFailed,
                &format!("log append failed for {}: {e}", envelope.sensor_id),
            );
        }
    }
}

impl<A: SensorAuthorizer, L: TelemetryLog> IngestApi for GatewayIngestPipeline<A, L> {
    fn receive(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult {
        let result = self.validate(message, now);
        match &result {
            IngestResult::Accepted(envelope) => {
                self.metrics.record_accepted(&envelope.sensor_id);
                info!(
                    sensor_id = %envelope.sensor_id,
                    fields = envelope.payload.len(),
                    "[sg-03] Accepted telemetry"
                );
            }
            IngestResult::Rejected(rejection) => {
                self.metrics.record_rejected(rejection.reason);
                warn!(
                    sensor_id = %message.sensor_id,
                    stage = %rejection.stage,
                    reason = %rejection.reason,
                    sent_at = %message.sent_at,
                    "[sg-03] Rejected telemetry"
                );
            }
        }
        result
    }

    fn receive_wire(&self, wire: &WireEnvelope, now: Timestamp) -> IngestResult {
        match self.codec.from_wire(wire) {
            Ok(message) => self.receive(&message, now),
            Err(e) => {
                self.metrics.record_rejected(RejectReason::MalformedEnvelope);
                warn!(
                    sensor_id = %wire.sensor_id,
                    error = %e,
                    "[sg-03] Rejected undecodable wire envelope"
                );
                IngestResult::reject(IngestStage::Received, RejectReason::MalformedEnvelope)
            }
        }
    }
}
