//! Replay guard and rate limiter configuration with validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Freshness window and nonce retention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReplayConfig {
    /// Maximum |now - timestamp| in seconds. Exactly this much skew is fresh.
    pub freshness_window_secs: u64,
    /// Minimum seconds between two prune passes.
    pub gc_interval_secs: u64,
    /// Nonce count at which a prune runs regardless of the interval.
    pub max_tracked_nonces: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: 30,
            gc_interval_secs: 10,
            max_tracked_nonces: 100_000,
        }
    }
}

impl ReplayConfig {
    /// Nonces older than this are dropped: twice the freshness window.
    pub fn retention_secs(&self) -> u64 {
        self.freshness_window_secs.saturating_mul(2)
    }

    pub fn validate(&self) -> Result<(), ReplayConfigError> {
        if self.freshness_window_secs == 0 {
            return Err(ReplayConfigError::ZeroFreshnessWindow);
        }
        if self.max_tracked_nonces == 0 {
            return Err(ReplayConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// What the gateway does when a sensor exceeds its rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitPolicy {
    /// Log and count the signal; the message continues.
    #[default]
    Warn,
    /// Reject the message with `RateLimited`.
    Enforce,
}

impl std::str::FromStr for RateLimitPolicy {
    type Err = ReplayConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "enforce" => Ok(Self::Enforce),
            other => Err(ReplayConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Sliding-window rate limit applied per sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed within one window.
    pub max_requests: usize,
    /// Window length in seconds.
    pub window_secs: u64,
    pub policy: RateLimitPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window_secs: 60,
            policy: RateLimitPolicy::Warn,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ReplayConfigError> {
        if self.max_requests == 0 {
            return Err(ReplayConfigError::ZeroMaxRequests);
        }
        if self.window_secs == 0 {
            return Err(ReplayConfigError::ZeroRateWindow);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplayConfigError {
    #[error("freshness_window_secs cannot be 0")]
    ZeroFreshnessWindow,
    #[error("max_tracked_nonces cannot be 0")]
    ZeroCapacity,
    #[error("max_requests cannot be 0")]
    ZeroMaxRequests,
    #[error("rate window_secs cannot be 0")]
    ZeroRateWindow,
    #[error("Unknown rate limit policy: {0}")]
    UnknownPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let replay = ReplayConfig::default();
        assert!(replay.validate().is_ok());
        assert_eq!(replay.freshness_window_secs, 30);
        assert_eq!(replay.retention_secs(), 60);

        let rate = RateLimitConfig::default();
        assert!(rate.validate().is_ok());
        assert_eq!((rate.max_requests, rate.window_secs), (20, 60));
        assert_eq!(rate.policy, RateLimitPolicy::Warn);
    }

    #[test]
    fn test_zero_values_rejected() {
        let replay = ReplayConfig {
            freshness_window_secs: 0,
            ..Default::default()
        };
        assert_eq!(replay.validate(), Err(ReplayConfigError::ZeroFreshnessWindow));

        let rate = RateLimitConfig {
            max_requests: 0,
            ..Default::default()
        };
        assert_eq!(rate.validate(), Err(ReplayConfigError::ZeroMaxRequests));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Enforce".parse::<RateLimitPolicy>(), Ok(RateLimitPolicy::Enforce));
        assert_eq!("warn".parse::<RateLimitPolicy>(), Ok(RateLimitPolicy::Warn));
        assert!("block".parse::<RateLimitPolicy>().is_err());
    }
}
