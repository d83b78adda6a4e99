//! # Ingest Outcomes
//!
//! The per-message state machine and the rejection taxonomy.

use shared_types::TelemetryEnvelope;
use std::fmt;

/// Progress of one message through the pipeline.
///
/// A `Rejection` records the last stage the message completed before the
/// failing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IngestStage {
    Received,
    AuthorizationChecked,
    Decrypted,
    SignatureVerified,
    ReplayChecked,
    Accepted,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Received => "received",
            IngestStage::AuthorizationChecked => "authorization_checked",
            IngestStage::Decrypted => "decrypted",
            IngestStage::SignatureVerified => "signature_verified",
            IngestStage::ReplayChecked => "replay_checked",
            IngestStage::Accepted => "accepted",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Sensor not on its type's allow-list, or without a credential.
    Unauthorized,
    /// The credential's key is not 16, 24 or 32 bytes.
    InvalidKeyLength,
    /// AEAD tag or detached signature did not verify. The two are
    /// deliberately indistinguishable.
    AuthenticationFailure,
    /// Protocol nonce already seen.
    Replay,
    /// Timestamp outside the freshness window.
    Stale,
    /// Sensor over its request rate (only under the `Enforce` policy).
    RateLimited,
    /// Undecodable wire fields or plaintext, or inner/outer id mismatch.
    MalformedEnvelope,
}

impl RejectReason {
    /// All reasons, in taxonomy order.
    pub const ALL: [RejectReason; 7] = [
        RejectReason::Unauthorized,
        RejectReason::InvalidKeyLength,
        RejectReason::AuthenticationFailure,
        RejectReason::Replay,
        RejectReason::Stale,
        RejectReason::RateLimited,
        RejectReason::MalformedEnvelope,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Unauthorized => "unauthorized",
            RejectReason::InvalidKeyLength => "invalid_key_length",
            RejectReason::AuthenticationFailure => "authentication_failure",
            RejectReason::Replay => "replay",
            RejectReason::Stale => "stale",
            RejectReason::RateLimited => "rate_limited",
            RejectReason::MalformedEnvelope => "malformed_envelope",
        }
    }

    /// Response class the request-handling collaborator should report.
    pub fn status_class(&self) -> StatusClass {
        match self {
            RejectReason::Unauthorized => StatusClass::Forbidden,
            RejectReason::InvalidKeyLength
            | RejectReason::AuthenticationFailure
            | RejectReason::MalformedEnvelope => StatusClass::BadRequest,
            RejectReason::Replay => StatusClass::Conflict,
            RejectReason::Stale => StatusClass::Timeout,
            RejectReason::RateLimited => StatusClass::TooManyRequests,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            RejectReason::Unauthorized => 0,
            RejectReason::InvalidKeyLength => 1,
            RejectReason::AuthenticationFailure => 2,
            RejectReason::Replay => 3,
            RejectReason::Stale => 4,
            RejectReason::RateLimited => 5,
            RejectReason::MalformedEnvelope => 6,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborator-facing response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Forbidden,
    BadRequest,
    Conflict,
    Timeout,
    TooManyRequests,
}

impl StatusClass {
    /// Conventional HTTP status for the class.
    pub fn http_status(&self) -> u16 {
        match self {
            StatusClass::Success => 200,
            StatusClass::Forbidden => 403,
            StatusClass::BadRequest => 400,
            StatusClass::Conflict => 409,
            StatusClass::Timeout => 408,
            StatusClass::TooManyRequests => 429,
        }
    }
}

/// A rejected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub stage: IngestStage,
    pub reason: RejectReason,
}

/// Outcome of `receive`.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestResult {
    /// The authenticated envelope, with its detached signature if one was sent.
    Accepted(TelemetryEnvelope),
    Rejected(Rejection),
}

impl IngestResult {
    pub(crate) fn reject(stage: IngestStage, reason: RejectReason) -> Self {
        IngestResult::Rejected(Rejection { stage, reason })
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestResult::Accepted(_))
    }

    /// Rejection reason, if rejected.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            IngestResult::Accepted(_) => None,
            IngestResult::Rejected(rejection) => Some(rejection.reason),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        self.reason()
            .map_or(StatusClass::Success, |reason| reason.status_class())
    }
}
