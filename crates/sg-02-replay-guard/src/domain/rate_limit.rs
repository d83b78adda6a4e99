//! Sliding-window rate limiting per sensor.
//!
//! A window keeps at most `max_requests + 1` timestamps: enough to tell
//! whether more than `max_requests` arrived within the window, and no more.

use super::config::{RateLimitConfig, RateLimitPolicy};
use super::replay::secs;
use chrono::Duration;
use dashmap::DashMap;
use shared_types::{SensorId, Timestamp};
use std::collections::VecDeque;
use tracing::debug;

/// Result of recording one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// At most `max_requests` in the window (count includes this request).
    Within { count: usize },
    /// More than `max_requests` in the window.
    Exceeded { count: usize },
}

impl RateDecision {
    pub fn is_exceeded(&self) -> bool {
        matches!(self, RateDecision::Exceeded { .. })
    }
}

/// Request-time queue for a single sender.
#[derive(Debug, Clone)]
pub struct SlidingWindowRateLimiter {
    max_requests: usize,
    window: Duration,
    times: VecDeque<Timestamp>,
}

impl SlidingWindowRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            times: VecDeque::with_capacity(max_requests + 1),
        }
    }

    /// Record a request at `now` and report whether the window overflowed.
    pub fn record(&mut self, now: Timestamp) -> RateDecision {
        self.times.push_back(now);
        while let Some(&oldest) = self.times.front() {
            if now - oldest > self.window {
                self.times.pop_front();
            } else {
                break;
            }
        }
        while self.times.len() > self.max_requests + 1 {
            self.times.pop_front();
        }
        self.decide(self.times.len())
    }

    /// The decision `record(now)` would return, without recording.
    pub fn peek(&self, now: Timestamp) -> RateDecision {
        let in_window = self
            .times
            .iter()
            .filter(|&&t| now - t <= self.window)
            .count();
        self.decide((in_window + 1).min(self.max_requests + 1))
    }

    fn decide(&self, count: usize) -> RateDecision {
        if count > self.max_requests {
            RateDecision::Exceeded { count }
        } else {
            RateDecision::Within { count }
        }
    }

    /// Timestamps currently retained.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn is_idle(&self, now: Timestamp) -> bool {
        self.times.back().map_or(true, |&last| now - last > self.window)
    }
}

/// Why `SensorRateLimiter::admit` turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission<E> {
    /// Over budget under `Enforce`; `gate` was not run.
    Throttled(RateDecision),
    /// `gate` refused the request.
    Refused(E),
}

/// One sliding window per sensor.
pub struct SensorRateLimiter {
    config: RateLimitConfig,
    windows: DashMap<SensorId, SlidingWindowRateLimiter>,
}

impl SensorRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.config.policy
    }

    /// Record a request from `sensor_id` at `now`.
    pub fn record(&self, sensor_id: &SensorId, now: Timestamp) -> RateDecision {
        let window = secs(self.config.window_secs);
        let mut entry = self
            .windows
            .entry(sensor_id.clone())
            .or_insert_with(|| SlidingWindowRateLimiter::new(self.config.max_requests, window));
        entry.record(now)
    }

    /// Run `gate` and count the request only if it passes.
    ///
    /// The sensor's window stays locked across `gate`, so concurrent
    /// requests cannot both squeeze into the last slot. Requests that
    /// `gate` refuses never touch the budget.
    pub fn admit<E, F>(&self, sensor_id: &SensorId, now: Timestamp, gate: F) -> Result<RateDecision, Admission<E>>
    where
        F: FnOnce() -> Result<(), E>,
    {
        let window = secs(self.config.window_secs);
        let mut entry = self
            .windows
            .entry(sensor_id.clone())
            .or_insert_with(|| SlidingWindowRateLimiter::new(self.config.max_requests, window));

        let decision = entry.peek(now);
        if self.blocks(decision) {
            return Err(Admission::Throttled(decision));
        }
        gate().map_err(Admission::Refused)?;
        Ok(entry.record(now))
    }

    /// Whether a decision should reject the message under the configured policy.
    pub fn blocks(&self, decision: RateDecision) -> bool {
        decision.is_exceeded() && self.config.policy == RateLimitPolicy::Enforce
    }

    /// Drop windows whose newest request is older than the window.
    pub fn cleanup(&self, now: Timestamp) {
        self.windows.retain(|sensor_id, window| {
            let idle = window.is_idle(now);
            if idle {
                debug!(sensor_id = %sensor_id, "[sg-02] Removing idle rate window");
            }
            !idle
        });
    }

    /// Number of sensors with a live window.
    pub fn tracked_sensors(&self) -> usize {
        self.windows.len()
    }
}

impl Default for SensorRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
