//! Cache Entry Module
//!
//! Defines the structure for TTL cache entries.

use std::time::{Duration, Instant};

/// Longest lifetime an entry can actually get. Larger TTLs are capped here so
/// the expiry instant stays representable.
pub const MAX_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == TTL Entry ==
/// A stored value with its absolute expiry time.
#[derive(Debug, Clone)]
pub struct TtlEntry {
    /// The stored value
    pub value: String,
    /// Monotonic instant after which the entry is stale
    pub expires_at: Instant,
}

impl TtlEntry {
    // == Constructor ==
    /// Creates an entry that stays fresh for `ttl` starting at `now`.
    ///
    /// A `ttl` past what the clock can represent is capped at
    /// [`MAX_LIFETIME`], which in practice never expires.
    pub fn new(value: String, now: Instant, ttl: Duration) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(MAX_LIFETIME))
            .unwrap_or(now);
        Self { value, expires_at }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still fresh at `now`.
    ///
    /// Boundary condition: an entry is fresh up to and including its expiry
    /// instant and stale strictly after it.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now <= self.expires_at
    }

    // == Time Left ==
    /// Returns how long the entry stays fresh after `now`, zero once stale.
    pub fn time_left_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fresh_until_expiry() {
        let now = Instant::now();
        let entry = TtlEntry::new("v".to_string(), now, Duration::from_secs(10));

        assert_eq!(entry.value, "v");
        assert!(entry.is_fresh_at(now));
        assert!(entry.is_fresh_at(now + Duration::from_secs(9)));
        assert!(!entry.is_fresh_at(now + Duration::from_secs(11)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = TtlEntry::new("v".to_string(), now, Duration::from_secs(1));

        assert!(entry.is_fresh_at(entry.expires_at), "fresh at the boundary");
        assert!(!entry.is_fresh_at(entry.expires_at + Duration::from_nanos(1)));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = TtlEntry::new("v".to_string(), now, Duration::MAX);

        assert!(entry.is_fresh_at(now));
        assert!(entry.time_left_at(now) >= MAX_LIFETIME);

        let entry = TtlEntry::new("v".to_string(), now, Duration::from_secs(i64::MAX as u64));
        assert!(entry.is_fresh_at(now + Duration::from_secs(3600)));
    }

    #[test]
    fn test_time_left() {
        let now = Instant::now();
        let entry = TtlEntry::new("v".to_string(), now, Duration::from_secs(10));

        assert_eq!(entry.time_left_at(now), Duration::from_secs(10));
        assert_eq!(entry.time_left_at(now + Duration::from_secs(4)), Duration::from_secs(6));
        assert_eq!(entry.time_left_at(now + Duration::from_secs(30)), Duration::ZERO);
    }
}
