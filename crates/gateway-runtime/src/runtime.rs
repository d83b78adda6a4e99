//! # Gateway Runtime
//!
//! Owns the wired subsystems and runs them in one of two modes.
//!
//! ## Wiring
//!
//! ```text
//! keys ──→ Fleet ──┬─→ AuthorizationRegistry ──→ GatewayIngestPipeline ──→ JsonlTelemetryLog
//!                  │                                  │ (shared store)
//!                  └─→ VirtualSensor × N              └──→ FlushCoordinator ──→ FileSnapshotSink
//! ```
//!
//! ## Shutdown Sequence (live mode)
//!
//! 1. Ctrl-C or `request_shutdown()` flips the watch channel
//! 2. Sensor tasks and the flush ticker stop at their next await point
//! 3. An in-flight flush finishes (the coordinator serializes flushes)
//! 4. A final flush writes whatever arrived since the last cycle

use crate::adapters::PrometheusRecorder;
use crate::config::{ConfigError, GatewayConfig};
use crate::keys::{provision_fleet, KeyError};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sg_01_authorization::{default_fleet, AuthorizationRegistry};
use sg_03_ingest::{
    FileSnapshotSink, FlushCoordinator, FlushReport, GatewayIngestPipeline, IngestApi,
    JsonlTelemetryLog, MetricsRecorder, StorageError,
};
use sg_04_simulation::{
    Fleet, LocalGateway, SensorSimEngine, SimulationError, SimulationReport, VirtualSensor,
};
use shared_types::SensorId;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub type GatewayPipeline = GatewayIngestPipeline<AuthorizationRegistry, JsonlTelemetryLog>;
pub type GatewayFlush = FlushCoordinator<FileSnapshotSink>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keys(#[from] KeyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Totals from a live run.
#[derive(Debug, Clone, Default)]
pub struct LiveReport {
    pub accepted: u64,
    pub rejected: u64,
    pub emit_failures: u64,
    pub final_snapshot: Option<FlushReport>,
}

impl LiveReport {
    fn merge(&mut self, other: LiveReport) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.emit_failures += other.emit_failures;
    }
}

pub struct GatewayRuntime {
    config: GatewayConfig,
    pipeline: Arc<GatewayPipeline>,
    flush: Arc<GatewayFlush>,
    sensors: Vec<VirtualSensor>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayRuntime {
    /// Runtime for the default 25-sensor deployment.
    pub fn new(config: GatewayConfig) -> Result<Self, RuntimeError> {
        Self::with_sensors(config, &default_fleet())
    }

    /// Runtime for an explicit set of sensors.
    pub fn with_sensors(config: GatewayConfig, sensor_ids: &[SensorId]) -> Result<Self, RuntimeError> {
        config.validate()?;

        let (_gateway_keys, fleet) = provision_fleet(
            &config.keys,
            &config.simulation.gateway_id,
            sensor_ids,
            config.security.require_signatures,
        )?;
        let Fleet { sensors, registry } = fleet;

        let metrics: Arc<dyn MetricsRecorder> = Arc::new(PrometheusRecorder);
        let log = JsonlTelemetryLog::open(config.storage.log_path())?;
        let pipeline = GatewayIngestPipeline::new(registry, log, config.ingest_config())
            .with_metrics(Arc::clone(&metrics));
        let flush = FlushCoordinator::resume(
            pipeline.store(),
            FileSnapshotSink::new(config.storage.snapshot_path()),
        )?
        .with_metrics(metrics);

        info!(
            sensors = sensors.len(),
            signed = config.security.require_signatures,
            last_cycle = flush.cycles_completed(),
            data_dir = %config.storage.data_dir.display(),
            "Gateway runtime wired"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            flush: Arc::new(flush),
            sensors,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Arc<GatewayPipeline> {
        &self.pipeline
    }

    pub fn flush_coordinator(&self) -> &Arc<GatewayFlush> {
        &self.flush
    }

    pub fn sensors(&self) -> &[VirtualSensor] {
        &self.sensors
    }

    /// Ask a running `run_live` to stop.
    pub fn request_shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }

    /// Discrete-event run over `simulation.duration` units. Blocking.
    pub fn run_simulation(&self) -> Result<SimulationReport, RuntimeError> {
        let gateway = LocalGateway::from_parts(Arc::clone(&self.pipeline), Arc::clone(&self.flush));
        let mut engine = SensorSimEngine::new(
            self.config.simulation_config(Utc::now()),
            gateway,
            self.sensors.clone(),
        )?;
        Ok(engine.run())
    }

    /// Wall-clock run until Ctrl-C or `request_shutdown`.
    pub async fn run_live(&self) -> Result<LiveReport, RuntimeError> {
        let unit = Duration::from_millis(self.config.runtime.unit_millis);
        let schedule = &self.config.simulation;
        let mut sensor_tasks = JoinSet::new();

        for sensor in self.sensors.iter().cloned() {
            let pipeline = Arc::clone(&self.pipeline);
            let mut shutdown = self.shutdown_rx.clone();
            let (min, max) = (schedule.min_interval, schedule.max_interval);
            let mut rng = live_rng();

            sensor_tasks.spawn(async move {
                let mut stats = LiveReport::default();
                loop {
                    let units = u32::try_from(rng.gen_range(min..=max)).unwrap_or(u32::MAX);
                    tokio::select! {
                        _ = tokio::time::sleep(unit * units) => {}
                        _ = shutdown.changed() => break,
                    }
                    let now = Utc::now();
                    match sensor.emit(now, &mut rng) {
                        Ok(message) if pipeline.receive(&message, now).is_accepted() => {
                            stats.accepted += 1;
                        }
                        Ok(_) => stats.rejected += 1,
                        Err(e) => {
                            stats.emit_failures += 1;
                            error!(sensor_id = %sensor.sensor_id(), error = %e, "[sg-04] Emission failed");
                        }
                    }
                }
                stats
            });
        }

        let flusher = {
            let flush = Arc::clone(&self.flush);
            let pipeline = Arc::clone(&self.pipeline);
            let mut shutdown = self.shutdown_rx.clone();
            let period = unit * u32::try_from(schedule.flush_interval).unwrap_or(u32::MAX);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let flush = Arc::clone(&flush);
                            let pipeline = Arc::clone(&pipeline);
                            let cycle = tokio::task::spawn_blocking(move || {
                                let now = Utc::now();
                                pipeline.housekeeping(now);
                                flush.flush(now)
                            })
                            .await;
                            match cycle {
                                Ok(Ok(_)) => {}
                                Ok(Err(e)) => warn!(error = %e, "Periodic flush failed; retrying next cycle"),
                                Err(e) => error!(error = %e, "Periodic flush task panicked"),
                            }
                        }
                        _ = shutdown.changed() => break,
                    }
                }
            })
        };

        info!(sensors = self.sensors.len(), "Gateway is running. Press Ctrl+C to stop.");
        let mut shutdown = self.shutdown_rx.clone();
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Ctrl-C received, initiating graceful shutdown...");
            }
            _ = shutdown.changed() => info!("Shutdown requested"),
        }
        self.request_shutdown();

        flusher.await.map_err(|e| RuntimeError::Task(e.to_string()))?;
        let mut report = LiveReport::default();
        while let Some(joined) = sensor_tasks.join_next().await {
            report.merge(joined.map_err(|e| RuntimeError::Task(e.to_string()))?);
        }

        let flush = Arc::clone(&self.flush);
        let final_snapshot = tokio::task::spawn_blocking(move || flush.flush(Utc::now()))
            .await
            .map_err(|e| RuntimeError::Task(e.to_string()))??;
        info!(
            cycle = final_snapshot.cycle,
            entries = final_snapshot.entries,
            accepted = report.accepted,
            rejected = report.rejected,
            "Final flush complete, shutdown complete"
        );
        report.final_snapshot = Some(final_snapshot);
        Ok(report)
    }
}

/// Per-sensor generator for live mode. Protocol nonces come from it, so it
/// is seeded from the OS; `simulation.seed` only drives simulate mode.
fn live_rng() -> StdRng {
    StdRng::from_entropy()
}
