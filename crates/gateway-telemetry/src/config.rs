//! Telemetry configuration from environment variables.

use std::env;

/// Logging and metrics settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// `EnvFilter` directive (trace, debug, info, warn, error, or per-target).
    pub log_level: String,

    /// Whether to write logs to stdout at all.
    pub console_output: bool,

    /// JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sensor-gateway".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: sensor-gateway)
    /// - `SG_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `SG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SG_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F, is_container: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("SG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("SG_CONSOLE_OUTPUT")
                .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
                .unwrap_or(true),

            json_logs: lookup("SG_JSON_LOGS")
                .map(|v| flag(&v))
                .unwrap_or(is_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "sensor-gateway");
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_sg_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(
            lookup(&[("SG_LOG_LEVEL", "debug"), ("RUST_LOG", "warn")]),
            false,
        );
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "warn")]), false);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_flags() {
        let config = TelemetryConfig::from_lookup(
            lookup(&[("SG_JSON_LOGS", "TRUE"), ("SG_CONSOLE_OUTPUT", "0")]),
            false,
        );
        assert!(config.json_logs);
        assert!(!config.console_output);

        let in_container = TelemetryConfig::from_lookup(lookup(&[]), true);
        assert!(in_container.json_logs);
    }
}
