//! # Event Queue
//!
//! Simulated-time ordered agenda. Keys sort by `(time, kind, sensor_id, seq)`
//! so sensor emissions at an instant run before a flush at the same instant,
//! and simultaneous emissions run in sensor-id order.

use shared_types::SensorId;
use std::collections::BTreeMap;

/// Simulated time in whole units since the epoch.
pub type SimTime = u64;

/// Event class. Declaration order is processing order at equal times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Emit,
    Flush,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventKey {
    pub time: SimTime,
    pub kind: EventKind,
    pub sensor_id: Option<SensorId>,
    pub seq: u64,
}

/// What to do when the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Sensor at this index in the engine's fleet emits one message.
    Emit { sensor: usize },
    Flush,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_emit(&mut self, time: SimTime, sensor: usize, sensor_id: &SensorId) {
        self.push(time, EventKind::Emit, Some(sensor_id.clone()), Event::Emit { sensor });
    }

    pub fn schedule_flush(&mut self, time: SimTime) {
        self.push(time, EventKind::Flush, None, Event::Flush);
    }

    fn push(&mut self, time: SimTime, kind: EventKind, sensor_id: Option<SensorId>, event: Event) {
        let key = EventKey {
            time,
            kind,
            sensor_id,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.events.insert(key, event);
    }

    /// Remove and return the earliest event.
    pub fn pop_next(&mut self) -> Option<(EventKey, Event)> {
        self.events.pop_first()
    }

    /// Time of the earliest event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.events.first_key_value().map(|(key, _)| key.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
