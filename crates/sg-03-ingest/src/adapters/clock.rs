//! Clock adapters.

use crate::ports::outbound::Clock;
use chrono::{Duration, Utc};
use shared_types::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock UTC time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Simulated time: `epoch + t` seconds, where `t` is advanced by the driver.
#[derive(Debug)]
pub struct SimulatedClock {
    epoch: Timestamp,
    elapsed_secs: AtomicI64,
}

impl SimulatedClock {
    pub fn new(epoch: Timestamp) -> Self {
        Self {
            epoch,
            elapsed_secs: AtomicI64::new(0),
        }
    }

    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }

    /// Move simulated time to `t` seconds after the epoch.
    pub fn set(&self, t: u64) {
        let t = i64::try_from(t).unwrap_or(i64::from(u32::MAX));
        self.elapsed_secs.store(t, Ordering::SeqCst);
    }

    /// Seconds since the epoch.
    pub fn elapsed(&self) -> i64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Timestamp at `t` seconds after the epoch, without moving the clock.
    pub fn at(&self, t: u64) -> Timestamp {
        self.epoch + Duration::seconds(i64::try_from(t).unwrap_or(i64::from(u32::MAX)))
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Timestamp {
        self.epoch + Duration::seconds(self.elapsed())
    }
}
