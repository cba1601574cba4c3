// src/token_bucket.rs

// per-client token bucket with lazy refill

// dependencies
use crate::clock::nanos_to_seconds;

/// Token bucket admission primitive.
///
/// Refill is lazy: nothing happens between calls, and each `consume`
/// first credits `elapsed * refill_rate` tokens, capped at `capacity`.
/// Timestamps are clock nanoseconds supplied by the caller.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_rate: f64,
    last_refill_nanos: u64,
}

impl TokenBucket {
    /// Create a full bucket whose refill clock starts at `now_nanos`
    pub fn new(capacity: f64, refill_rate: f64, now_nanos: u64) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_rate,
            last_refill_nanos: now_nanos,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Stored token count, without crediting any pending refill
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Try to take `amount` tokens. On rejection the token count is left untouched.
    pub fn consume(&mut self, amount: f64, now_nanos: u64) -> bool {
        self.refill(now_nanos);
        if self.tokens >= amount {
            self.tokens -= amount;
            true
        } else {
            false
        }
    }

    /// Lower the token count to at most `ceiling`; never raises it
    pub fn cap_tokens(&mut self, ceiling: f64) {
        self.tokens = self.tokens.min(ceiling);
    }

    /// Seconds until `amount` tokens will be available, assuming no other consumers
    pub fn seconds_until(&self, amount: f64) -> f64 {
        ((amount - self.tokens) / self.refill_rate).max(0.0)
    }

    fn refill(&mut self, now_nanos: u64) {
        // clock readings taken before the last refill credit nothing
        if now_nanos > self.last_refill_nanos {
            let elapsed = nanos_to_seconds(now_nanos - self.last_refill_nanos);
            self.tokens = self.capacity.min(self.tokens + elapsed * self.refill_rate);
            self.last_refill_nanos = now_nanos;
        }
    }
}
