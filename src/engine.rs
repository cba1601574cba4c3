// src/engine.rs

// flux-warden: per-request abuse mitigation pipeline

// dependencies
use crate::clock::{Clock, MonotonicClock, nanos_to_seconds};
use crate::config::MitigationConfig;
use crate::decision::{Decision, Outcome, SourceHint};
use crate::errors::{ConfigError, ValidationError};
use crate::global_load::GlobalLoadMonitor;
use crate::metrics::{MetricsSink, MetricsSnapshot, MitigationReport};
use crate::random::{RandomSource, ThreadRandom};
use crate::registry::{ClientRecord, ClientRegistry, ClientSnapshot};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest accepted client key, in bytes (the longest DNS name)
pub const MAX_CLIENT_KEY_LEN: usize = 253;

/// The main MitigationEngine model.
/// C is the clock type, defaulting to MonotonicClock.
/// R is the random source for challenges and honeypot sampling, defaulting to ThreadRandom.
///
/// One engine is shared (behind an `Arc`) by every request producer. A
/// decision holds the read side of `sweep_gate` plus the lock of the one
/// record it touches; the global overload sweep takes the write side, so it
/// never races an in-flight decision.
#[derive(Debug)]
pub struct MitigationEngine<C = MonotonicClock, R = ThreadRandom>
where
    C: Clock,
    R: RandomSource,
{
    config: MitigationConfig,
    registry: Arc<ClientRegistry>,
    global_load: Mutex<GlobalLoadMonitor>,
    metrics: MetricsSink,
    sweep_gate: RwLock<()>,
    clock: C,
    random: R,
}

impl MitigationEngine {
    /// Engine on the monotonic clock and thread-local randomness
    pub fn new(config: MitigationConfig) -> Result<Self, ConfigError> {
        Self::with_config(config, MonotonicClock::new(), ThreadRandom)
    }
}

// methods for the MitigationEngine type
impl<C, R> MitigationEngine<C, R>
where
    C: Clock,
    R: RandomSource,
{
    // method to create a new engine from a config object, with a fresh registry
    pub fn with_config(config: MitigationConfig, clock: C, random: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = Arc::new(ClientRegistry::from_config(&config));
        Ok(Self::assemble(config, registry, clock, random))
    }

    /// Create an engine around an existing registry.
    /// The registry should have been built from the same config.
    pub fn with_registry(
        config: MitigationConfig,
        registry: Arc<ClientRegistry>,
        clock: C,
        random: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, registry, clock, random))
    }

    fn assemble(config: MitigationConfig, registry: Arc<ClientRegistry>, clock: C, random: R) -> Self {
        Self {
            config,
            registry,
            global_load: Mutex::new(GlobalLoadMonitor::new()),
            metrics: MetricsSink::new(),
            sweep_gate: RwLock::new(()),
            clock,
            random,
        }
    }

    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Pre-register a client before traffic starts
    pub fn register_client(&self, client_key: &str) -> Result<(), ValidationError> {
        validate_client_key(client_key)?;
        self.registry.register(client_key, self.clock.now());
        Ok(())
    }

    pub fn client(&self, client_key: &str) -> Option<ClientSnapshot> {
        self.registry.snapshot(client_key)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn permanently_banned_keys(&self) -> Vec<String> {
        self.registry.permanently_banned_keys()
    }

    pub fn honeypot_keys(&self) -> Vec<String> {
        self.registry.honeypot_keys()
    }

    /// Counters plus the permanently banned and honeypot-observed keys
    pub fn report(&self) -> MitigationReport {
        MitigationReport {
            metrics: self.metrics.snapshot(),
            permanently_banned: self.registry.permanently_banned_keys(),
            honeypot_observed: self.registry.honeypot_keys(),
        }
    }

    /// Decide what to do with one request.
    ///
    /// Stages run in order and the first terminal outcome wins: ban check,
    /// global overload, burst challenge, token bucket, payload signature.
    /// Only a missing or malformed key is an error; it is rejected before
    /// any client or global state changes.
    pub fn handle_request(
        &self,
        client_key: &str,
        payload: &str,
        source: SourceHint,
    ) -> Result<Decision, ValidationError> {
        if let Err(error) = validate_client_key(client_key) {
            self.metrics.record_invalid();
            debug!(%error, "request rejected before mitigation");
            return Err(error);
        }

        let (decision, overloaded) = {
            let _gate = self.sweep_gate.read();
            let record = self.registry.get_or_create(client_key, self.clock.now());
            let mut record = record.lock();
            // sampled under the record lock so one client's timestamps never go backwards
            let now = self.clock.now();
            self.metrics.record_request();
            self.global_load.lock().record_event(now);
            self.evaluate(&mut record, payload, source, now)
        };

        self.metrics.record_outcome(decision.outcome);
        if overloaded {
            self.apply_overload_sweep();
        }
        Ok(decision)
    }

    // the pipeline proper; returns the decision and whether global overload fired
    fn evaluate(
        &self,
        record: &mut ClientRecord,
        payload: &str,
        source: SourceHint,
        now: u64,
    ) -> (Decision, bool) {
        record.last_seen_nanos = now;
        record.window.record_event(now);

        if self.registry.ban_status(record, now) {
            let burst_count = record.window.count(now);
            debug!(
                client = %record.key,
                permanent = record.permanently_banned,
                "blocked: client is banned"
            );
            let decision = Decision::new(Outcome::BlockedBanned, burst_count)
                .retry_after(ban_retry_after(record, now));
            return (decision, false);
        }

        let global_rate = self.global_load.lock().current_rate(now);
        let overloaded = global_rate > self.config.global_rate_threshold as usize;
        if overloaded {
            self.metrics.record_overload();
            warn!(
                global_rate,
                threshold = self.config.global_rate_threshold,
                "global request rate above threshold, capping all token buckets"
            );
            // the requesting client is capped now; everyone else after the decision
            let ceiling = record.bucket.capacity() * self.config.overload_factor;
            record.bucket.cap_tokens(ceiling);
        }

        let burst_count = record.window.count(now);
        let burst_threshold = self.config.sliding_window_threshold as usize;
        if burst_count > burst_threshold {
            let passed = self.random.next_f64() < self.config.challenge_pass_rate;
            self.metrics.record_challenge(passed);
            info!(client = %record.key, burst_count, passed, "burst suspicion, challenge issued");
            if !passed {
                if self.random.next_f64() < self.config.honeypot_sample_rate {
                    record.honeypot_redirects = record.honeypot_redirects.saturating_add(1);
                    warn!(client = %record.key, "redirecting to honeypot for analysis");
                    return (Decision::new(Outcome::RedirectedHoneypot, burst_count), overloaded);
                }
                self.registry.escalate_ban(record, now);
                let decision = Decision::new(Outcome::BlockedBurstNoChallenge, burst_count)
                    .retry_after(ban_retry_after(record, now));
                return (decision, overloaded);
            }
        }

        if !record.bucket.consume(1.0, now) {
            debug!(client = %record.key, "blocked by token bucket");
            let mut retry_after = Some(record.bucket.seconds_until(1.0));
            if burst_count > burst_threshold / 2 {
                self.registry.escalate_ban(record, now);
                retry_after = ban_retry_after(record, now);
            }
            let decision =
                Decision::new(Outcome::BlockedRateLimit, burst_count).retry_after(retry_after);
            return (decision, overloaded);
        }

        if source == SourceHint::Untrusted && self.matches_signature(payload) {
            warn!(client = %record.key, "known malicious signature in payload");
            record.offense_count = record.offense_count.saturating_add(1);
            self.registry.escalate_ban(record, now);
            return (Decision::new(Outcome::BlockedSignature, burst_count), overloaded);
        }

        debug!(client = %record.key, "admitted");
        (Decision::new(Outcome::Admitted, burst_count), overloaded)
    }

    fn matches_signature(&self, payload: &str) -> bool {
        self.config
            .signature_markers
            .iter()
            .any(|marker| !marker.is_empty() && payload.contains(marker.as_str()))
    }

    // Runs after the triggering decision releases its read gate, so decisions
    // admitted in between may still spend tokens above the overload ceiling.
    fn apply_overload_sweep(&self) {
        let _exclusive = self.sweep_gate.write();
        self.registry.cap_all_tokens(self.config.overload_factor);
    }
}

// seconds left on a temporary ban; None when permanent or not banned
fn ban_retry_after(record: &ClientRecord, now: u64) -> Option<f64> {
    if record.permanently_banned {
        return None;
    }
    record
        .banned_until_nanos
        .filter(|&until| until > now)
        .map(|until| nanos_to_seconds(until - now))
}

/// Reject keys that are empty, too long, or contain whitespace/control characters
pub fn validate_client_key(client_key: &str) -> Result<(), ValidationError> {
    if client_key.trim().is_empty() {
        return Err(ValidationError::EmptyClientKey);
    }
    if client_key.len() > MAX_CLIENT_KEY_LEN
        || client_key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::MalformedClientKey(client_key.to_string()));
    }
    Ok(())
}
