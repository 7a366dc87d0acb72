//! Cache Module
//!
//! Provides the two in-memory stores behind the host's cache classes:
//! a capacity-bounded LRU store and a fixed-duration TTL store.

mod entry;
mod lru;
mod stats;
mod ttl;


use std::fmt::Debug;

use crate::error::{Result, StashError};

// Re-export public types
pub use entry::{TtlEntry, MAX_LIFETIME};
pub use lru::MemStash;
pub use stats::CacheStats;
pub use ttl::TimeStash;

// == Cache Contract ==
/// Operation set shared by every stash.
///
/// All methods take `&self`; implementations serialize access with their own
/// per-instance lock, so a stash can be shared between threads behind an `Arc`
/// without any caller-side locking. Keys and values are copied on the way in
/// and on the way out.
pub trait Stash: Send + Sync + Debug {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str);

    /// Returns the value stored under `key`, or `None` if it is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns true if `key` is currently present.
    fn contains(&self, key: &str) -> bool;

    /// Removes `key`, returning true if an entry was actually removed.
    fn delete(&self, key: &str) -> bool;

    /// Removes every entry.
    fn clear(&self);

    /// Returns the number of entries currently held.
    fn size(&self) -> usize;

    /// Returns a snapshot of the store's counters.
    fn stats(&self) -> CacheStats;
}

// == Validation ==
/// Checks that a constructor argument is strictly positive.
///
/// `message` is the error text reported when it is not.
pub(crate) fn require_positive(value: i64, message: &str) -> Result<u64> {
    if value <= 0 {
        return Err(StashError::Validation(message.to_string()));
    }
    Ok(value as u64)
}
