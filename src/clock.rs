// src/clock.rs

// clock module definition and implementations

// dependencies
use std::time::Instant;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync).
/// The `now` method returns a monotonic timestamp in nanoseconds as a u64.
/// Only differences between two readings are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Monotonic clock backed by `std::time::Instant`.
/// Readings are nanoseconds elapsed since the clock was created,
/// so they never go backwards even if the wall clock is adjusted.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Convert a duration in seconds to clock nanoseconds, saturating at zero.
pub(crate) fn seconds_to_nanos(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1_000_000_000.0) as u64
}

/// Convert clock nanoseconds back to seconds.
pub(crate) fn nanos_to_seconds(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}
