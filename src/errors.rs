// src/errors.rs

// error types for the mitigation engine

// dependencies
use thiserror::Error;

/// Rejection of a request before it enters the decision pipeline.
/// No client or global state is touched when one of these is returned.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client key is missing")]
    EmptyClientKey,
    #[error("client key is malformed: {0:?}")]
    MalformedClientKey(String),
}

/// Error type for MitigationConfig issues.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("token bucket capacity must be positive, got {0}")]
    InvalidCapacity(f64),
    #[error("token bucket refill rate must be positive, got {0}")]
    InvalidRefillRate(f64),
    #[error("sliding window duration must be positive, got {0}s")]
    InvalidWindow(f64),
    #[error("temporary ban duration must be non-negative, got {0}s")]
    InvalidBanDuration(f64),
    #[error("permanent ban threshold must be at least 1")]
    InvalidPermBanThreshold,
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },
}
