// src/registry.rs

//! Per-client state and the registry that owns it.

// dependencies
use crate::burst_window::BurstWindow;
use crate::clock::seconds_to_nanos;
use crate::config::MitigationConfig;
use crate::token_bucket::TokenBucket;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the engine knows about one client key.
#[derive(Debug)]
pub struct ClientRecord {
    pub(crate) key: String,
    pub(crate) bucket: TokenBucket,
    pub(crate) window: BurstWindow,
    pub(crate) offense_count: u32,
    pub(crate) banned_until_nanos: Option<u64>,
    pub(crate) permanently_banned: bool,
    pub(crate) last_seen_nanos: u64,
    pub(crate) honeypot_redirects: u32,
}

impl ClientRecord {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Permanent ban, or a temporary ban that has not yet expired
    pub fn is_banned(&self, now_nanos: u64) -> bool {
        self.permanently_banned
            || self
                .banned_until_nanos
                .is_some_and(|until| now_nanos < until)
    }

    fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            key: self.key.clone(),
            tokens: self.bucket.tokens(),
            capacity: self.bucket.capacity(),
            offense_count: self.offense_count,
            banned_until_nanos: self.banned_until_nanos,
            permanently_banned: self.permanently_banned,
            last_seen_nanos: self.last_seen_nanos,
            honeypot_redirects: self.honeypot_redirects,
        }
    }
}

/// Read-only copy of a ClientRecord.
/// `tokens` is the stored count; refill owed since the last consume is not credited.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    pub key: String,
    pub tokens: f64,
    pub capacity: f64,
    pub offense_count: u32,
    pub banned_until_nanos: Option<u64>,
    pub permanently_banned: bool,
    pub last_seen_nanos: u64,
    pub honeypot_redirects: u32,
}

/// Outcome of a single ban escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanEscalation {
    Temporary { until_nanos: u64 },
    Permanent,
}

/// Exclusive owner of all ClientRecords.
///
/// Each record sits behind its own mutex, so requests for different keys
/// only contend on the map shard while looking the record up. Records are
/// never removed for the lifetime of the registry.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: DashMap<String, Arc<Mutex<ClientRecord>>>,
    capacity: f64,
    refill_rate: f64,
    window_nanos: u64,
    temp_ban_nanos: u64,
    perm_ban_threshold: u32,
}

impl ClientRegistry {
    /// Build an empty registry whose new records follow `config`.
    /// The config is expected to be validated already.
    pub fn from_config(config: &MitigationConfig) -> Self {
        Self {
            clients: DashMap::new(),
            capacity: config.token_bucket_capacity,
            refill_rate: config.token_bucket_refill_rate,
            window_nanos: seconds_to_nanos(config.sliding_window_seconds),
            temp_ban_nanos: seconds_to_nanos(config.temp_ban_seconds),
            perm_ban_threshold: config.perm_ban_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.clients.contains_key(key)
    }

    /// Pre-register a key with a full bucket. Existing records are left untouched.
    pub fn register(&self, key: &str, now_nanos: u64) {
        self.get_or_create(key, now_nanos);
    }

    /// Fetch the record for `key`, creating it on first sight.
    ///
    /// The `Arc` is cloned out of the map, so the caller can lock the record
    /// without holding a shard guard.
    pub fn get_or_create(&self, key: &str, now_nanos: u64) -> Arc<Mutex<ClientRecord>> {
        if let Some(existing) = self.clients.get(key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .clients
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(self.new_record(key, now_nanos))));
        Arc::clone(entry.value())
    }

    pub fn ban_status(&self, record: &ClientRecord, now_nanos: u64) -> bool {
        record.is_banned(now_nanos)
    }

    /// Register one more offense: a fresh temporary ban, promoted to a
    /// permanent one once the offense count reaches the threshold.
    pub fn escalate_ban(&self, record: &mut ClientRecord, now_nanos: u64) -> BanEscalation {
        record.offense_count = record.offense_count.saturating_add(1);
        let until_nanos = now_nanos.saturating_add(self.temp_ban_nanos);
        record.banned_until_nanos = Some(until_nanos);
        info!(
            client = %record.key,
            offenses = record.offense_count,
            ban_seconds = self.temp_ban_nanos as f64 / 1_000_000_000.0,
            "temporarily banned"
        );
        if record.offense_count >= self.perm_ban_threshold {
            if !record.permanently_banned {
                warn!(client = %record.key, "permanently banned after repeated offenses");
            }
            record.permanently_banned = true;
            return BanEscalation::Permanent;
        }
        BanEscalation::Temporary { until_nanos }
    }

    /// Cap every record's stored tokens at `fraction` of its capacity.
    ///
    /// Locks each record in turn; the engine only calls this while it holds
    /// exclusive access, so no record lock is held elsewhere.
    pub fn cap_all_tokens(&self, fraction: f64) {
        for entry in self.clients.iter() {
            let mut record = entry.value().lock();
            let ceiling = record.bucket.capacity() * fraction;
            record.bucket.cap_tokens(ceiling);
        }
    }

    pub fn snapshot(&self, key: &str) -> Option<ClientSnapshot> {
        let record = self.clients.get(key).map(|entry| Arc::clone(entry.value()))?;
        let guard = record.lock();
        Some(guard.snapshot())
    }

    /// Keys that are permanently banned, sorted
    pub fn permanently_banned_keys(&self) -> Vec<String> {
        self.collect_keys(|record| record.permanently_banned)
    }

    /// Keys redirected to the honeypot at least once, sorted
    pub fn honeypot_keys(&self) -> Vec<String> {
        self.collect_keys(|record| record.honeypot_redirects > 0)
    }

    fn collect_keys(&self, predicate: impl Fn(&ClientRecord) -> bool) -> Vec<String> {
        let records: Vec<Arc<Mutex<ClientRecord>>> = self
            .clients
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut keys: Vec<String> = records
            .iter()
            .filter_map(|record| {
                let guard = record.lock();
                if predicate(&*guard) {
                    Some(guard.key.clone())
                } else {
                    None
                }
            })
            .collect();
        keys.sort();
        keys
    }

    fn new_record(&self, key: &str, now_nanos: u64) -> ClientRecord {
        ClientRecord {
            key: key.to_string(),
            bucket: TokenBucket::new(self.capacity, self.refill_rate, now_nanos),
            window: BurstWindow::new(self.window_nanos),
            offense_count: 0,
            banned_until_nanos: None,
            permanently_banned: false,
            last_seen_nanos: now_nanos,
            honeypot_redirects: 0,
        }
    }
}
