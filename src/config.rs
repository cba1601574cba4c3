// src/config.rs

//! Configuration types for the mitigation engine

// dependencies
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunables for every stage of the decision pipeline.
///
/// All fields have defaults, so a partially specified object (for example a
/// JSON document naming only `temp_ban_seconds`) overrides just those fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationConfig {
    pub(crate) token_bucket_capacity: f64,
    pub(crate) token_bucket_refill_rate: f64,
    pub(crate) sliding_window_seconds: f64,
    pub(crate) sliding_window_threshold: u32,
    pub(crate) global_rate_threshold: u32,
    pub(crate) temp_ban_seconds: f64,
    pub(crate) perm_ban_threshold: u32,
    pub(crate) challenge_pass_rate: f64,
    pub(crate) honeypot_sample_rate: f64,
    pub(crate) overload_factor: f64,
    pub(crate) signature_markers: Vec<String>,
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            token_bucket_capacity: 10.0,
            token_bucket_refill_rate: 5.0,
            sliding_window_seconds: 10.0,
            sliding_window_threshold: 30,
            global_rate_threshold: 200,
            temp_ban_seconds: 20.0,
            perm_ban_threshold: 3,
            challenge_pass_rate: 0.4,
            honeypot_sample_rate: 0.3,
            overload_factor: 0.2,
            signature_markers: vec!["mal_sig".to_string()],
        }
    }
}

impl MitigationConfig {
    /// Create a configuration with the default tunables
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set token bucket capacity
    pub fn capacity(mut self, capacity: f64) -> Self {
        self.token_bucket_capacity = capacity;
        self
    }

    /// Builder-style: set token bucket refill rate (tokens per second)
    pub fn refill_rate(mut self, tokens_per_second: f64) -> Self {
        self.token_bucket_refill_rate = tokens_per_second;
        self
    }

    /// Builder-style: set the sliding window duration in seconds
    pub fn window_seconds(mut self, seconds: f64) -> Self {
        self.sliding_window_seconds = seconds;
        self
    }

    /// Builder-style: set the per-client burst threshold
    pub fn burst_threshold(mut self, threshold: u32) -> Self {
        self.sliding_window_threshold = threshold;
        self
    }

    /// Builder-style: set the aggregate requests-per-second alert level
    pub fn global_rate_threshold(mut self, requests_per_second: u32) -> Self {
        self.global_rate_threshold = requests_per_second;
        self
    }

    /// Builder-style: set the temporary ban duration in seconds
    pub fn temp_ban_seconds(mut self, seconds: f64) -> Self {
        self.temp_ban_seconds = seconds;
        self
    }

    /// Builder-style: set the offense count that makes a ban permanent
    pub fn perm_ban_threshold(mut self, offenses: u32) -> Self {
        self.perm_ban_threshold = offenses;
        self
    }

    /// Builder-style: set the challenge pass probability
    pub fn challenge_pass_rate(mut self, probability: f64) -> Self {
        self.challenge_pass_rate = probability;
        self
    }

    /// Builder-style: set the probability a failed challenge goes to the honeypot
    pub fn honeypot_sample_rate(mut self, probability: f64) -> Self {
        self.honeypot_sample_rate = probability;
        self
    }

    /// Builder-style: set the fraction of capacity kept during global overload
    pub fn overload_factor(mut self, factor: f64) -> Self {
        self.overload_factor = factor;
        self
    }

    /// Builder-style: replace the malicious payload markers
    pub fn signature_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if not_positive(self.token_bucket_capacity) {
            return Err(ConfigError::InvalidCapacity(self.token_bucket_capacity));
        }
        if not_positive(self.token_bucket_refill_rate) {
            return Err(ConfigError::InvalidRefillRate(
                self.token_bucket_refill_rate,
            ));
        }
        if not_positive(self.sliding_window_seconds) {
            return Err(ConfigError::InvalidWindow(self.sliding_window_seconds));
        }
        if self.temp_ban_seconds.is_nan() || self.temp_ban_seconds < 0.0 {
            return Err(ConfigError::InvalidBanDuration(self.temp_ban_seconds));
        }
        if self.perm_ban_threshold == 0 {
            return Err(ConfigError::InvalidPermBanThreshold);
        }
        check_unit_interval("challenge_pass_rate", self.challenge_pass_rate)?;
        check_unit_interval("honeypot_sample_rate", self.honeypot_sample_rate)?;
        check_unit_interval("overload_factor", self.overload_factor)?;
        Ok(())
    }
}

// NaN compares false against everything, so it has to be caught explicitly
fn not_positive(value: f64) -> bool {
    value.is_nan() || value <= 0.0
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}
