//! Cache Statistics Module
//!
//! Tracks cache lookups: hits, misses, and lazily evicted expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that returned nothing (absent or expired)
    pub misses: u64,
    /// Entries dropped because their TTL had elapsed
    pub expirations: u64,
    /// Current number of entries, expired ones included until evicted
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recording ==
    /// Counts a lookup that returned a live value.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a lookup that returned nothing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts `count` entries dropped after their TTL elapsed.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    /// Updates the entry count snapshot.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
