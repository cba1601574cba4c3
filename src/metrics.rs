// src/metrics.rs

//! Outcome counters and the end-of-run report.

// dependencies
use crate::decision::Outcome;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Passive, lock-free outcome counters.
#[derive(Debug, Default)]
pub struct MetricsSink {
    total_requests: AtomicU64,
    accepted: AtomicU64,
    blocked_rate_limit: AtomicU64,
    blocked_blacklist: AtomicU64,
    blocked_burst: AtomicU64,
    blocked_signature: AtomicU64,
    honeypot_hits: AtomicU64,
    challenges: AtomicU64,
    challenges_passed: AtomicU64,
    rejected_invalid: AtomicU64,
    overload_activations: AtomicU64,
}

impl MetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump the single outcome counter that matches `outcome`.
    /// A signature hit was still processed, so it counts as accepted and is
    /// tallied in `blocked_signature` on the side.
    pub(crate) fn record_outcome(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Admitted | Outcome::BlockedSignature => &self.accepted,
            Outcome::BlockedBanned => &self.blocked_blacklist,
            Outcome::BlockedRateLimit => &self.blocked_rate_limit,
            Outcome::BlockedBurstNoChallenge => &self.blocked_burst,
            Outcome::RedirectedHoneypot => &self.honeypot_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if outcome == Outcome::BlockedSignature {
            self.blocked_signature.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_challenge(&self, passed: bool) {
        self.challenges.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.challenges_passed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_invalid(&self) {
        self.rejected_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overload(&self) {
        self.overload_activations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            blocked_rate_limit: self.blocked_rate_limit.load(Ordering::Relaxed),
            blocked_blacklist: self.blocked_blacklist.load(Ordering::Relaxed),
            blocked_burst: self.blocked_burst.load(Ordering::Relaxed),
            blocked_signature: self.blocked_signature.load(Ordering::Relaxed),
            honeypot_hits: self.honeypot_hits.load(Ordering::Relaxed),
            challenges: self.challenges.load(Ordering::Relaxed),
            challenges_passed: self.challenges_passed.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            overload_activations: self.overload_activations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub accepted: u64,
    pub blocked_rate_limit: u64,
    pub blocked_blacklist: u64,
    pub blocked_burst: u64,
    pub blocked_signature: u64,
    pub honeypot_hits: u64,
    pub challenges: u64,
    pub challenges_passed: u64,
    pub rejected_invalid: u64,
    pub overload_activations: u64,
}

impl MetricsSnapshot {
    /// Sum of the per-outcome counters; equals `total_requests` once all
    /// in-flight decisions have finished
    pub fn outcomes(&self) -> u64 {
        self.accepted
            + self.blocked_rate_limit
            + self.blocked_blacklist
            + self.blocked_burst
            + self.honeypot_hits
    }
}

/// Summary of a run: counters plus the keys worth a second look
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationReport {
    pub metrics: MetricsSnapshot,
    pub permanently_banned: Vec<String>,
    pub honeypot_observed: Vec<String>,
}
