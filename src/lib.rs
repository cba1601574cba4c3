// src/lib.rs

//! # Flux Warden
//!
//! An in-process abuse mitigation engine. Each request is identified by a
//! client key and run through a fixed pipeline: ban check, global overload
//! throttling, burst detection with a probabilistic challenge (and optional
//! honeypot diversion), a per-client token bucket, and payload signature
//! screening. Repeat offenders are escalated from temporary to permanent bans.
//!
//! ## Quick Example
//!
//! ```rust
//! use flux_warden::{MitigationConfig, MitigationEngine, SourceHint};
//!
//! let config = MitigationConfig::new().capacity(10.0).refill_rate(5.0);
//! let engine = MitigationEngine::new(config).unwrap();
//!
//! let decision = engine
//!     .handle_request("10.1.1.1", "GET /resource", SourceHint::Trusted)
//!     .unwrap();
//! if decision.admitted {
//!     println!("Request allowed");
//! } else {
//!     println!("Blocked ({}) - retry after {:.2}s",
//!              decision.outcome,
//!              decision.retry_after_seconds.unwrap_or(0.0));
//! }
//! ```

// private modules
mod burst_window;
mod clock;
mod config;
mod decision;
mod engine;
mod errors;
mod global_load;
mod metrics;
mod random;
mod registry;
mod token_bucket;

// public API exports
pub use burst_window::BurstWindow;
pub use clock::{Clock, MonotonicClock};
pub use config::MitigationConfig;
pub use decision::{Decision, Outcome, SourceHint};
pub use engine::{MAX_CLIENT_KEY_LEN, MitigationEngine, validate_client_key};
pub use errors::{ConfigError, ValidationError};
pub use global_load::GlobalLoadMonitor;
pub use metrics::{MetricsSink, MetricsSnapshot, MitigationReport};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use registry::{BanEscalation, ClientRecord, ClientRegistry, ClientSnapshot};
pub use token_bucket::TokenBucket;
