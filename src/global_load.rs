// src/global_load.rs

// aggregate request rate across every client

// dependencies
use crate::burst_window::BurstWindow;

const ONE_SECOND_NANOS: u64 = 1_000_000_000;

/// Trailing one-second request counter shared by all clients.
/// Only used as an escalation trigger, never as a per-client gate.
#[derive(Debug, Clone)]
pub struct GlobalLoadMonitor {
    window: BurstWindow,
}

impl GlobalLoadMonitor {
    pub fn new() -> Self {
        Self {
            window: BurstWindow::new(ONE_SECOND_NANOS),
        }
    }

    pub fn record_event(&mut self, now_nanos: u64) {
        self.window.record_event(now_nanos);
    }

    /// Requests observed in the trailing second
    pub fn current_rate(&mut self, now_nanos: u64) -> usize {
        self.window.count(now_nanos)
    }
}

impl Default for GlobalLoadMonitor {
    fn default() -> Self {
        Self::new()
    }
}
