// src/burst_window.rs

//! Sliding window event counter.

// dependencies
use std::collections::VecDeque;

/// Counts events inside a trailing time horizon.
///
/// Timestamps are kept oldest-first and trimmed lazily on every record and
/// every count. An event exactly `window` old is still inside the horizon;
/// only strictly older events are dropped.
#[derive(Debug, Clone)]
pub struct BurstWindow {
    window_nanos: u64,
    events: VecDeque<u64>,
}

impl BurstWindow {
    pub fn new(window_nanos: u64) -> Self {
        Self {
            window_nanos,
            events: VecDeque::new(),
        }
    }

    /// Append an event at `now_nanos`.
    ///
    /// Callers share one clock, so timestamps arrive in non-decreasing order;
    /// a reading older than the newest retained event is clamped up to it.
    pub fn record_event(&mut self, now_nanos: u64) {
        let stamp = self
            .events
            .back()
            .map_or(now_nanos, |&newest| newest.max(now_nanos));
        self.events.push_back(stamp);
        self.trim(now_nanos);
    }

    /// Number of events with timestamp `>= now - window`; the boundary
    /// event is included
    pub fn count(&mut self, now_nanos: u64) -> usize {
        self.trim(now_nanos);
        self.events.len()
    }

    fn trim(&mut self, now_nanos: u64) {
        let Some(cutoff) = now_nanos.checked_sub(self.window_nanos) else {
            return;
        };
        while let Some(&oldest) = self.events.front() {
            if oldest < cutoff {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}
