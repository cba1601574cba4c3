// src/decision.rs

// request inputs and decision outputs of the mitigation pipeline

// dependencies
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a request claims to come from.
/// Payload signatures are only checked for untrusted origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceHint {
    Trusted,
    Untrusted,
}

/// Reason attached to every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Admitted,
    BlockedBanned,
    BlockedRateLimit,
    BlockedBurstNoChallenge,
    RedirectedHoneypot,
    /// Processed, then escalated because the payload carried a malicious marker
    BlockedSignature,
}

impl Outcome {
    /// Stable reason code
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Admitted => "admitted",
            Outcome::BlockedBanned => "blocked_banned",
            Outcome::BlockedRateLimit => "blocked_rate_limit",
            Outcome::BlockedBurstNoChallenge => "blocked_burst",
            Outcome::RedirectedHoneypot => "redirected_honeypot",
            Outcome::BlockedSignature => "blocked_signature",
        }
    }

    /// Whether the request was processed by the protected service
    pub fn is_admitted(&self) -> bool {
        matches!(self, Outcome::Admitted | Outcome::BlockedSignature)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a mitigation decision with metadata for the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Whether the request was processed
    pub admitted: bool,
    /// Why
    pub outcome: Outcome,
    /// Client events inside the sliding window when the decision was taken
    pub burst_count: usize,
    /// Seconds until the client may try again: remaining temporary ban, or
    /// refill time for a rate-limited client. None for permanent bans and
    /// outcomes without a meaningful wait.
    pub retry_after_seconds: Option<f64>,
}

impl Decision {
    pub(crate) fn new(outcome: Outcome, burst_count: usize) -> Self {
        Self {
            admitted: outcome.is_admitted(),
            outcome,
            burst_count,
            retry_after_seconds: None,
        }
    }

    pub(crate) fn retry_after(mut self, seconds: Option<f64>) -> Self {
        self.retry_after_seconds = seconds;
        self
    }
}
