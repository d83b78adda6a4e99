//! # Gateway Configuration
//!
//! Unified configuration for the subsystems and the runtime.
//!
//! Every field has a default; `SG_*` environment variables override them.
//! Configuration files are not read.

use sg_02_replay_guard::{RateLimitConfig, RateLimitPolicy, ReplayConfig, ReplayConfigError};
use sg_03_ingest::IngestConfig;
use sg_04_simulation::{SimulationConfig, DEFAULT_GATEWAY_ID};
use shared_types::{Timestamp, WireEncoding};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Complete gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationSettings,
    pub keys: KeyConfig,
    pub runtime: RuntimeConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not valid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid replay/rate settings: {0}")]
    Security(#[from] ReplayConfigError),

    #[error("Invalid simulation settings: {0}")]
    Simulation(String),

    #[error("Invalid runtime settings: {0}")]
    Runtime(String),
}

/// Replay, rate-limit and signature settings.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub replay: ReplayConfig,
    pub rate_limit: RateLimitConfig,
    /// Provision sensors with ECDSA keys and require a signature on every
    /// message.
    pub require_signatures: bool,
    pub wire_encoding: WireEncoding,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            replay: ReplayConfig::default(),
            rate_limit: RateLimitConfig::default(),
            require_signatures: true,
            wire_encoding: WireEncoding::Hex,
        }
    }
}

/// Where accepted telemetry goes.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// JSON Lines log, relative to `data_dir`.
    pub log_file: String,
    /// Snapshot directory, relative to `data_dir`.
    pub snapshot_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_file: "sensor_log.jsonl".to_string(),
            snapshot_dir: "snapshots".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_dir)
    }
}

/// Fleet schedule, shared by both run modes.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub seed: u64,
    /// Simulated units to run (simulate mode only).
    pub duration: u64,
    pub flush_interval: u64,
    pub min_interval: u64,
    pub max_interval: u64,
    pub gateway_id: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            duration: 900,
            flush_interval: 300,
            min_interval: 5,
            max_interval: 10,
            gateway_id: DEFAULT_GATEWAY_ID.to_string(),
        }
    }
}

/// Key provisioning.
#[derive(Debug, Clone)]
pub struct KeyConfig {
    /// Directory of `<id>_priv.pem` / `<id>_pub.pem`. Keys are kept in memory
    /// only when unset.
    pub key_dir: Option<PathBuf>,
    /// Create and save keys that are missing from `key_dir`.
    pub generate_missing: bool,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            key_dir: None,
            generate_missing: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Discrete-event run in simulated time.
    #[default]
    Simulate,
    /// Wall-clock tasks until shutdown.
    Live,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulate" | "sim" => Ok(Self::Simulate),
            "live" => Ok(Self::Live),
            other => Err(format!("unknown mode {other:?} (expected simulate or live)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub mode: RunMode,
    /// Wall-clock milliseconds per schedule unit in live mode.
    pub unit_millis: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Simulate,
            unit_millis: 1000,
        }
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected true or false".into(),
        }),
    }
}

fn parse_encoding(value: String) -> Result<WireEncoding, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "hex" => Ok(WireEncoding::Hex),
        "base64" => Ok(WireEncoding::Base64),
        _ => Err(ConfigError::InvalidValue {
            key: "SG_WIRE_ENCODING",
            value,
            reason: "expected hex or base64".into(),
        }),
    }
}

impl GatewayConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from `lookup`.
    ///
    /// # Variables
    ///
    /// - `SG_MODE`: simulate | live
    /// - `SG_DATA_DIR`, `SG_LOG_FILE`, `SG_SNAPSHOT_DIR`
    /// - `SG_KEY_DIR`, `SG_GENERATE_KEYS`
    /// - `SG_FRESHNESS_WINDOW_SECS`, `SG_MAX_TRACKED_NONCES`
    /// - `SG_RATE_LIMIT_MAX`, `SG_RATE_LIMIT_WINDOW_SECS`, `SG_RATE_LIMIT_POLICY`
    /// - `SG_REQUIRE_SIGNATURES`, `SG_WIRE_ENCODING`
    /// - `SG_SEED`, `SG_DURATION`, `SG_FLUSH_INTERVAL`, `SG_MIN_INTERVAL`,
    ///   `SG_MAX_INTERVAL`, `SG_GATEWAY_ID`
    /// - `SG_UNIT_MILLIS`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SG_MODE") {
            config.runtime.mode = parse("SG_MODE", v)?;
        }
        if let Some(v) = lookup("SG_UNIT_MILLIS") {
            config.runtime.unit_millis = parse("SG_UNIT_MILLIS", v)?;
        }

        // Storage
        if let Some(v) = lookup("SG_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SG_LOG_FILE") {
            config.storage.log_file = v;
        }
        if let Some(v) = lookup("SG_SNAPSHOT_DIR") {
            config.storage.snapshot_dir = v;
        }

        // Keys
        if let Some(v) = lookup("SG_KEY_DIR").filter(|v| !v.is_empty()) {
            config.keys.key_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SG_GENERATE_KEYS") {
            config.keys.generate_missing = parse_bool("SG_GENERATE_KEYS", v)?;
        }

        // Security
        let security = &mut config.security;
        if let Some(v) = lookup("SG_FRESHNESS_WINDOW_SECS") {
            security.replay.freshness_window_secs = parse("SG_FRESHNESS_WINDOW_SECS", v)?;
        }
        if let Some(v) = lookup("SG_MAX_TRACKED_NONCES") {
            security.replay.max_tracked_nonces = parse("SG_MAX_TRACKED_NONCES", v)?;
        }
        if let Some(v) = lookup("SG_RATE_LIMIT_MAX") {
            security.rate_limit.max_requests = parse("SG_RATE_LIMIT_MAX", v)?;
        }
        if let Some(v) = lookup("SG_RATE_LIMIT_WINDOW_SECS") {
            security.rate_limit.window_secs = parse("SG_RATE_LIMIT_WINDOW_SECS", v)?;
        }
        if let Some(v) = lookup("SG_RATE_LIMIT_POLICY") {
            security.rate_limit.policy = parse::<RateLimitPolicy>("SG_RATE_LIMIT_POLICY", v)?;
        }
        if let Some(v) = lookup("SG_REQUIRE_SIGNATURES") {
            security.require_signatures = parse_bool("SG_REQUIRE_SIGNATURES", v)?;
        }
        if let Some(v) = lookup("SG_WIRE_ENCODING") {
            security.wire_encoding = parse_encoding(v)?;
        }

        // Schedule
        let sim = &mut config.simulation;
        if let Some(v) = lookup("SG_SEED") {
            sim.seed = parse("SG_SEED", v)?;
        }
        if let Some(v) = lookup("SG_DURATION") {
            sim.duration = parse("SG_DURATION", v)?;
        }
        if let Some(v) = lookup("SG_FLUSH_INTERVAL") {
            sim.flush_interval = parse("SG_FLUSH_INTERVAL", v)?;
        }
        if let Some(v) = lookup("SG_MIN_INTERVAL") {
            sim.min_interval = parse("SG_MIN_INTERVAL", v)?;
        }
        if let Some(v) = lookup("SG_MAX_INTERVAL") {
            sim.max_interval = parse("SG_MAX_INTERVAL", v)?;
        }
        if let Some(v) = lookup("SG_GATEWAY_ID") {
            sim.gateway_id = v;
        }

        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ingest_config().validate()?;
        self.simulation_config(chrono::Utc::now())
            .validate()
            .map_err(|e| ConfigError::Simulation(e.to_string()))?;
        if self.runtime.unit_millis == 0 {
            return Err(ConfigError::Runtime("unit_millis must be > 0".into()));
        }
        if self.storage.log_file.is_empty() {
            return Err(ConfigError::Runtime("log_file is empty".into()));
        }
        Ok(())
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            replay: self.security.replay.clone(),
            rate_limit: self.security.rate_limit.clone(),
            wire_encoding: self.security.wire_encoding,
        }
    }

    /// Engine settings with simulated t = 0 at `epoch`.
    pub fn simulation_config(&self, epoch: Timestamp) -> SimulationConfig {
        let sim = &self.simulation;
        SimulationConfig {
            seed: sim.seed,
            duration: sim.duration,
            flush_interval: sim.flush_interval,
            min_interval: sim.min_interval,
            max_interval: sim.max_interval,
            gateway_id: sim.gateway_id.clone(),
            epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<_, _> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.replay.freshness_window_secs, 30);
        assert_eq!(config.simulation.flush_interval, 300);
        assert_eq!(config.runtime.mode, RunMode::Simulate);
        assert_eq!(config.storage.log_path(), PathBuf::from("./data/sensor_log.jsonl"));
    }

    #[test]
    fn test_env_overrides() {
        let config = from(&[
            ("SG_MODE", "live"),
            ("SG_RATE_LIMIT_POLICY", "enforce"),
            ("SG_WIRE_ENCODING", "base64"),
            ("SG_REQUIRE_SIGNATURES", "false"),
            ("SG_KEY_DIR", "/etc/sg/keys"),
            ("SG_DURATION", "300"),
        ])
        .unwrap();
        assert_eq!(config.runtime.mode, RunMode::Live);
        assert_eq!(config.security.rate_limit.policy, RateLimitPolicy::Enforce);
        assert_eq!(config.security.wire_encoding, WireEncoding::Base64);
        assert!(!config.security.require_signatures);
        assert_eq!(config.keys.key_dir, Some(PathBuf::from("/etc/sg/keys")));
        assert_eq!(config.simulation.duration, 300);
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = from(&[("SG_SEED", "forty-two")]).unwrap_err();
        assert!(err.to_string().contains("SG_SEED"));
        assert!(from(&[("SG_RATE_LIMIT_POLICY", "drop")]).is_err());
        assert!(from(&[("SG_WIRE_ENCODING", "ascii85")]).is_err());
    }

    #[test]
    fn test_validate_catches_cross_field_errors() {
        let mut config = GatewayConfig::default();
        config.simulation.min_interval = 20;
        assert!(matches!(config.validate(), Err(ConfigError::Simulation(_))));

        let mut config = GatewayConfig::default();
        config.security.replay.freshness_window_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Security(_))));
    }
}
