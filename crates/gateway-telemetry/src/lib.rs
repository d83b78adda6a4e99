//! # Gateway Telemetry
//!
//! Logging and metrics setup shared by the gateway binary and tests.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, JSON in
//!   containers and human-readable in development
//! - **Metrics**: Prometheus counters and gauges in a dedicated registry,
//!   exported with [`gather_text`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Events and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `sensor-gateway` | Service name on every log line |
//! | `SG_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `SG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SG_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_text, register_metrics, INGEST_ACCEPTED, INGEST_REJECTED, LAST_SNAPSHOT_CYCLE,
    LAST_SNAPSHOT_ENTRIES, RATE_LIMIT_SIGNALS, SNAPSHOTS_WRITTEN, STORAGE_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        filter = %config.log_level,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Logs a final line when dropped.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_filter_fails_before_install() {
        let config = TelemetryConfig {
            log_level: "sg_03_ingest=loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_telemetry(config), Err(TelemetryError::Config(_))));
    }
}
