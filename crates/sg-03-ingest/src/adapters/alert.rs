//! Operator alert adapters.

use crate::ports::outbound::{AlertKind, OperatorAlert};
use parking_lot::Mutex;
use tracing::error;

/// Emits alerts as `error!` events tagged `alert = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlert;

impl OperatorAlert for TracingAlert {
    fn raise(&self, kind: AlertKind, detail: &str) {
        error!(alert = true, kind = kind.as_str(), "[sg-03] OPERATOR ALERT: {detail}");
    }
}

/// One captured alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub kind: AlertKind,
    pub detail: String,
}

/// Captures alerts in memory (and still logs them).
#[derive(Debug, Default)]
pub struct RecordingAlert {
    raised: Mutex<Vec<AlertRecord>>,
}

impl RecordingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raised(&self) -> Vec<AlertRecord> {
        self.raised.lock().clone()
    }

    pub fn count(&self, kind: AlertKind) -> usize {
        self.raised.lock().iter().filter(|a| a.kind == kind).count()
    }
}

impl OperatorAlert for RecordingAlert {
    fn raise(&self, kind: AlertKind, detail: &str) {
        TracingAlert.raise(kind, detail);
        self.raised.lock().push(AlertRecord {
            kind,
            detail: detail.to_string(),
        });
    }
}
