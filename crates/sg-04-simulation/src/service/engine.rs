//! # Sensor Simulation Engine
//!
//! Discrete-event driver: each virtual sensor emits on its own random
//! schedule, messages are routed (for logging) and delivered to the gateway,
//! and the gateway store is flushed every `flush_interval` units.
//!
//! One event handler runs at a time. Simulated time maps to the gateway
//! clock as `epoch + t` seconds, so envelope timestamps and receipt times
//! are identical and a seeded run is reproducible.

use crate::domain::errors::SimulationError;
use crate::domain::scheduler::{Event, EventQueue, SimTime};
use crate::domain::sensor::VirtualSensor;
use crate::domain::topology::{NetworkTopology, Router};
use crate::ports::outbound::TelemetryGateway;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sg_03_ingest::{Clock, FlushReport, IngestResult, RejectReason, SimulatedClock};
use shared_types::Timestamp;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Default gateway node name.
pub const DEFAULT_GATEWAY_ID: &str = "gateway_1";

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// RNG seed for schedules, readings and protocol nonces.
    pub seed: u64,
    /// Run length in simulated units; events at exactly `duration` still run.
    pub duration: SimTime,
    pub flush_interval: SimTime,
    pub min_interval: SimTime,
    pub max_interval: SimTime,
    pub gateway_id: String,
    /// Wall-clock time of simulated t = 0.
    pub epoch: Timestamp,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration: 900,
            flush_interval: 300,
            min_interval: 5,
            max_interval: 10,
            gateway_id: DEFAULT_GATEWAY_ID.to_string(),
            epoch: Utc::now(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.flush_interval == 0 {
            return Err(SimulationError::InvalidConfig("flush_interval must be > 0".into()));
        }
        if self.min_interval == 0 || self.min_interval > self.max_interval {
            return Err(SimulationError::InvalidConfig(format!(
                "emit interval [{}, {}] must be non-empty and start above 0",
                self.min_interval, self.max_interval
            )));
        }
        if self.gateway_id.is_empty() {
            return Err(SimulationError::InvalidConfig("gateway_id is empty".into()));
        }
        Ok(())
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub events_processed: u64,
    pub emitted: u64,
    pub accepted: u64,
    pub rejected: HashMap<RejectReason, u64>,
    /// Emissions that failed before reaching the gateway.
    pub emit_failures: u64,
    pub snapshots: Vec<FlushReport>,
    pub flush_failures: u64,
}

impl SimulationReport {
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }
}

pub struct SensorSimEngine<G: TelemetryGateway> {
    config: SimulationConfig,
    gateway: G,
    sensors: Vec<VirtualSensor>,
    topology: NetworkTopology,
    clock: SimulatedClock,
    rng: StdRng,
}

impl<G: TelemetryGateway> SensorSimEngine<G> {
    /// Build an engine over `sensors`, all attached directly to the gateway.
    pub fn new(
        config: SimulationConfig,
        gateway: G,
        sensors: Vec<VirtualSensor>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let topology = NetworkTopology::star(
            &config.gateway_id,
            sensors.iter().map(|s| s.sensor_id().as_str()),
        );
        Ok(Self {
            clock: SimulatedClock::new(config.epoch),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            gateway,
            sensors,
            topology,
        })
    }

    /// Replace the star topology. Sensors without a route to the gateway
    /// still deliver; the missing path is logged.
    #[must_use]
    pub fn with_topology(mut self, topology: NetworkTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    fn next_interval(&mut self) -> SimTime {
        self.rng
            .gen_range(self.config.min_interval..=self.config.max_interval)
    }

    /// Process events until simulated time passes `duration`.
    pub fn run(&mut self) -> SimulationReport {
        let mut queue = EventQueue::new();
        let mut report = SimulationReport::default();

        for index in 0..self.sensors.len() {
            let due = self.next_interval();
            queue.schedule_emit(due, index, self.sensors[index].sensor_id());
        }
        queue.schedule_flush(self.config.flush_interval);

        info!(
            sensors = self.sensors.len(),
            duration = self.config.duration,
            flush_interval = self.config.flush_interval,
            seed = self.config.seed,
            "[sg-04] Simulation started"
        );

        while let Some((key, event)) = queue.pop_next() {
            if key.time > self.config.duration {
                break;
            }
            self.clock.set(key.time);
            report.events_processed += 1;

            match event {
                Event::Emit { sensor } => {
                    self.emit(sensor, &mut report);
                    let due = key.time + self.next_interval();
                    queue.schedule_emit(due, sensor, self.sensors[sensor].sensor_id());
                }
                Event::Flush => {
                    self.flush(key.time, &mut report);
                    queue.schedule_flush(key.time + self.config.flush_interval);
                }
            }
        }

        info!(
            events = report.events_processed,
            accepted = report.accepted,
            rejected = report.rejected_total(),
            snapshots = report.snapshots.len(),
            "[sg-04] Simulation finished"
        );
        report
    }

    fn emit(&mut self, index: usize, report: &mut SimulationReport) {
        let now = self.clock.now();
        let sensor = &self.sensors[index];
        let message = match sensor.emit(now, &mut self.rng) {
            Ok(message) => message,
            Err(e) => {
                report.emit_failures += 1;
                error!(sensor_id = %sensor.sensor_id(), error = %e, "[sg-04] Emission failed");
                return;
            }
        };
        report.emitted += 1;

        match Router::shortest_path(&self.topology, sensor.sensor_id().as_str(), &self.config.gateway_id) {
            Some(path) => debug!(
                t = self.clock.elapsed(),
                sensor_id = %sensor.sensor_id(),
                path = %path.join(" -> "),
                "[sg-04] Sending"
            ),
            None => warn!(
                sensor_id = %sensor.sensor_id(),
                gateway = %self.config.gateway_id,
                "[sg-04] No route to gateway"
            ),
        }

        match self.gateway.deliver(&message, now) {
            IngestResult::Accepted(_) => report.accepted += 1,
            IngestResult::Rejected(rejection) => {
                *report.rejected.entry(rejection.reason).or_insert(0) += 1;
            }
        }
    }

    fn flush(&mut self, t: SimTime, report: &mut SimulationReport) {
        match self.gateway.flush(self.clock.now()) {
            Ok(flushed) => {
                info!(
                    t,
                    cycle = flushed.cycle,
                    entries = flushed.entries,
                    "[sg-04] Store flushed"
                );
                report.snapshots.push(flushed);
            }
            Err(e) => {
                report.flush_failures += 1;
                error!(t, error = %e, "[sg-04] Flush failed; entries kept for next cycle");
            }
        }
    }
}
