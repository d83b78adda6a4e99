//! # Replay Guard
//!
//! Time-bounded nonce cache for replay and staleness rejection.
//!
//! ## Security Design
//!
//! - Check order: recorded nonce ⇒ replay; |now - timestamp| beyond the
//!   freshness window ⇒ stale; otherwise record and accept.
//! - Nonces are stored with their receipt time and dropped after twice the
//!   freshness window.
//! - Pruning runs at most once per GC interval, and always when the cache
//!   reaches `max_tracked_nonces`.

use super::config::ReplayConfig;
use chrono::Duration;
use parking_lot::Mutex;
use shared_types::Timestamp;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of `ReplayGuard::check_and_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayVerdict {
    /// Fresh and unseen; the nonce is now recorded.
    Accepted,
    /// The nonce was already recorded.
    RejectedReplay,
    /// The timestamp is outside the freshness window.
    RejectedStale,
}

struct NonceCache {
    /// nonce -> receipt time.
    seen: HashMap<Uuid, Timestamp>,
    last_gc: Option<Timestamp>,
}

/// Replay and freshness guard, safe to share between threads.
pub struct ReplayGuard {
    freshness_window: Duration,
    retention: Duration,
    gc_interval: Duration,
    max_tracked_nonces: usize,
    cache: Mutex<NonceCache>,
}

impl ReplayGuard {
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            freshness_window: secs(config.freshness_window_secs),
            retention: secs(config.retention_secs()),
            gc_interval: secs(config.gc_interval_secs),
            max_tracked_nonces: config.max_tracked_nonces,
            cache: Mutex::new(NonceCache {
                seen: HashMap::new(),
                last_gc: None,
            }),
        }
    }

    /// Check a message's protocol nonce and timestamp, recording the nonce if
    /// the message is accepted. The whole operation is one critical section.
    pub fn check_and_record(&self, nonce: Uuid, timestamp: Timestamp, now: Timestamp) -> ReplayVerdict {
        let mut cache = self.cache.lock();

        if cache.seen.contains_key(&nonce) {
            return ReplayVerdict::RejectedReplay;
        }

        let skew = if now >= timestamp {
            now - timestamp
        } else {
            timestamp - now
        };
        if skew > self.freshness_window {
            return ReplayVerdict::RejectedStale;
        }

        let gc_due = cache
            .last_gc
            .map_or(true, |last| now - last >= self.gc_interval);
        if gc_due || cache.seen.len() >= self.max_tracked_nonces {
            self.prune(&mut cache, now);
        }

        cache.seen.insert(nonce, now);
        ReplayVerdict::Accepted
    }

    /// Whether a nonce is currently recorded.
    pub fn contains(&self, nonce: &Uuid) -> bool {
        self.cache.lock().seen.contains_key(nonce)
    }

    /// Number of recorded nonces.
    pub fn len(&self) -> usize {
        self.cache.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().seen.is_empty()
    }

    /// Force a prune pass relative to `now`.
    pub fn prune_expired(&self, now: Timestamp) {
        let mut cache = self.cache.lock();
        self.prune(&mut cache, now);
    }

    fn prune(&self, cache: &mut NonceCache, now: Timestamp) {
        let before = cache.seen.len();
        let retention = self.retention;
        cache.seen.retain(|_, received| now - *received <= retention);
        cache.last_gc = Some(now);

        let removed = before - cache.seen.len();
        if removed > 0 {
            debug!(removed, remaining = cache.seen.len(), "[sg-02] Pruned expired nonces");
        }
        if cache.seen.len() >= self.max_tracked_nonces {
            warn!(
                tracked = cache.seen.len(),
                capacity = self.max_tracked_nonces,
                "[sg-02] Nonce cache still at capacity after pruning"
            );
        }
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(&ReplayConfig::default())
    }
}

pub(crate) fn secs(value: u64) -> Duration {
    Duration::seconds(value.min(u64::from(u32::MAX)) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_nonce_accepted_and_recorded() {
        let guard = ReplayGuard::default();
        let nonce = Uuid::new_v4();
        assert_eq!(guard.check_and_record(nonce, t0(), t0()), ReplayVerdict::Accepted);
        assert!(guard.contains(&nonce));
    }

    #[test]
    fn test_duplicate_nonce_rejected() {
        let guard = ReplayGuard::default();
        let nonce = Uuid::new_v4();
        guard.check_and_record(nonce, t0(), t0());
        let later = t0() + Duration::seconds(1);
        assert_eq!(
            guard.check_and_record(nonce, later, later),
            ReplayVerdict::RejectedReplay
        );
    }

    #[test]
    fn test_replay_wins_over_staleness() {
        let guard = ReplayGuard::default();
        let nonce = Uuid::new_v4();
        guard.check_and_record(nonce, t0(), t0());
        let now = t0() + Duration::seconds(45);
        assert_eq!(guard.check_and_record(nonce, t0(), now), ReplayVerdict::RejectedReplay);
    }

    #[test]
    fn test_staleness_boundary() {
        let guard = ReplayGuard::default();
        let now = t0();
        let cases = [
            (-31, ReplayVerdict::RejectedStale),
            (-30, ReplayVerdict::Accepted),
            (-29, ReplayVerdict::Accepted),
            (29, ReplayVerdict::Accepted),
            (30, ReplayVerdict::Accepted),
            (31, ReplayVerdict::RejectedStale),
        ];
        for (offset, expected) in cases {
            let ts = now + Duration::seconds(offset);
            assert_eq!(
                guard.check_and_record(Uuid::new_v4(), ts, now),
                expected,
                "offset {offset}"
            );
        }
    }

    #[test]
    fn test_stale_nonce_not_recorded() {
        let guard = ReplayGuard::default();
        let nonce = Uuid::new_v4();
        let ts = t0() - Duration::seconds(60);
        assert_eq!(guard.check_and_record(nonce, ts, t0()), ReplayVerdict::RejectedStale);
        assert!(!guard.contains(&nonce));
    }

    #[test]
    fn test_nonces_pruned_after_retention() {
        let guard = ReplayGuard::default();
        let old = Uuid::new_v4();
        guard.check_and_record(old, t0(), t0());

        // Within retention (60 s): still tracked.
        let mid = t0() + Duration::seconds(50);
        guard.check_and_record(Uuid::new_v4(), mid, mid);
        assert!(guard.contains(&old));

        let late = t0() + Duration::seconds(61);
        guard.check_and_record(Uuid::new_v4(), late, late);
        assert!(!guard.contains(&old));
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn test_gc_runs_at_capacity() {
        let config = ReplayConfig {
            gc_interval_secs: 3_600,
            max_tracked_nonces: 3,
            ..Default::default()
        };
        let guard = ReplayGuard::new(&config);
        for _ in 0..3 {
            guard.check_and_record(Uuid::new_v4(), t0(), t0());
        }
        assert_eq!(guard.len(), 3);

        // GC interval not elapsed, but the cache is full: expired entries go.
        let later = t0() + Duration::seconds(120);
        guard.check_and_record(Uuid::new_v4(), later, later);
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_concurrent_duplicate_only_one_wins() {
        let guard = ReplayGuard::default();
        let nonce = Uuid::new_v4();
        let accepted = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    if guard.check_and_record(nonce, t0(), t0()) == ReplayVerdict::Accepted {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }
}
