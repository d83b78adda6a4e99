//! # Sensor Gateway
//!
//! Entry point for the secure sensor-telemetry gateway.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics registry)
//! 2. Load `SG_*` configuration; an optional first argument overrides the mode
//! 3. Provision keys and wire the ingest pipeline to storage
//! 4. Run the simulation to completion, or the live fleet until Ctrl-C

use anyhow::{Context, Result};
use gateway_runtime::{GatewayConfig, GatewayRuntime, RunMode};
use gateway_telemetry::{gather_text, init_telemetry, TelemetryConfig};
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env()).context("telemetry init failed")?;

    let mut config = GatewayConfig::from_env().context("invalid SG_* configuration")?;
    if let Some(mode) = std::env::args().nth(1) {
        config.runtime.mode = mode.parse::<RunMode>().map_err(anyhow::Error::msg)?;
    }
    config.validate().context("configuration rejected")?;

    let mode = config.runtime.mode;
    let runtime = Arc::new(GatewayRuntime::new(config).context("failed to start gateway")?);

    match mode {
        RunMode::Simulate => {
            let report = tokio::task::spawn_blocking({
                let runtime = Arc::clone(&runtime);
                move || runtime.run_simulation()
            })
            .await
            .context("simulation task panicked")??;

            info!(
                events = report.events_processed,
                emitted = report.emitted,
                accepted = report.accepted,
                rejected = report.rejected_total(),
                snapshots = report.snapshots.len(),
                flush_failures = report.flush_failures,
                "Simulation complete"
            );
        }
        RunMode::Live => {
            let report = runtime.run_live().await?;
            info!(
                accepted = report.accepted,
                rejected = report.rejected,
                emit_failures = report.emit_failures,
                "Live run complete"
            );
        }
    }

    let metrics = gather_text().context("metrics export failed")?;
    debug!("Final metrics:\n{metrics}");
    Ok(())
}
