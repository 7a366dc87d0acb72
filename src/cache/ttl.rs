//! TTL Store Module
//!
//! Store whose entries expire a fixed duration after their last write.
//!
//! Expiration is lazy: a stale entry stays in the map until an operation looks
//! at it. `get`, `contains` and `time_left` drop the single key they touch;
//! `size` sweeps the whole map. There is no background timer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::{require_positive, CacheStats, Stash, TtlEntry};
use crate::error::{Result, StashError};

// == TTL State ==
#[derive(Debug, Default)]
struct TtlState {
    entries: HashMap<String, TtlEntry>,
    stats: CacheStats,
}

impl TtlState {
    /// Returns the entry for `key` if it is fresh at `now`.
    ///
    /// A stale entry is removed as a side effect.
    fn fresh(&mut self, key: &str, now: Instant) -> Option<&TtlEntry> {
        let stale = !self.entries.get(key)?.is_fresh_at(now);
        if stale {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            trace!(key, "expired entry on access");
            return None;
        }
        self.entries.get(key)
    }

    /// Removes every entry that is stale at `now`, returning how many.
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now));
        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }
}

// == Time Stash ==
/// Thread-safe store where every entry lives for the same fixed TTL.
///
/// The TTL is anchored to the last `put` of a key; reads never extend it.
/// Every operation takes the lock exclusively because any of them may
/// remove stale entries.
#[derive(Debug)]
pub struct TimeStash {
    ttl: Duration,
    inner: Mutex<TtlState>,
}

impl TimeStash {
    // == Constructor ==
    /// Creates a store whose entries live for `ttl_seconds`.
    ///
    /// # Errors
    /// Returns [`StashError::Validation`] if `ttl_seconds` is zero or negative.
    pub fn new(ttl_seconds: i64) -> Result<Self> {
        let ttl_seconds = require_positive(ttl_seconds, "TIMESTASH TTL must be positive")?;
        Self::with_ttl(Duration::from_secs(ttl_seconds))
    }

    /// Creates a store whose entries live for `ttl`.
    ///
    /// # Errors
    /// Returns [`StashError::Validation`] if `ttl` is zero.
    pub fn with_ttl(ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(StashError::Validation(
                "TIMESTASH TTL must be positive".to_string(),
            ));
        }
        debug!(ttl_ms = ttl.as_millis() as u64, "created TTL stash");
        Ok(Self {
            ttl,
            inner: Mutex::new(TtlState::default()),
        })
    }

    /// Returns the TTL applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Time Left ==
    /// Returns how long `key` stays fresh, or `None` if it is absent or stale.
    ///
    /// A stale entry is removed, the same as with `get`.
    pub fn time_left(&self, key: &str) -> Option<Duration> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        inner.fresh(key, now).map(|entry| entry.time_left_at(now))
    }

    // == Purge Expired ==
    /// Removes all stale entries and returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let removed = self.inner.lock().purge(Instant::now());
        if removed > 0 {
            debug!(removed, "swept expired entries");
        }
        removed
    }
}

impl Stash for TimeStash {
    fn put(&self, key: &str, value: &str) {
        let mut inner = self.inner.lock();
        // Expiry is stamped under the lock so it follows the order puts land in.
        let entry = TtlEntry::new(value.to_string(), Instant::now(), self.ttl);
        inner.entries.insert(key.to_string(), entry);
    }

    fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let value = inner
            .fresh(key, Instant::now())
            .map(|entry| entry.value.clone());
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.lock().fresh(key, Instant::now()).is_some()
    }

    /// Removes `key` whether or not it has gone stale.
    ///
    /// Returns true for a stale entry that no read has swept yet, even though
    /// `get` and `contains` would already report it absent.
    fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    fn clear(&self) {
        self.inner.lock().entries.clear();
        trace!("cleared TTL stash");
    }

    fn size(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = inner.purge(Instant::now());
        if removed > 0 {
            debug!(removed, "swept expired entries");
        }
        inner.entries.len()
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        inner.stats.snapshot(inner.entries.len())
    }
}
