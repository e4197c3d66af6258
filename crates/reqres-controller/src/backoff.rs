//! Per-key exponential backoff for retried reconciles

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Upper bound for any single retry delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Entries untouched for this long belong to keys that stopped retrying
/// (converged elsewhere, or deleted while backing off) and are dropped.
pub const STALE_AFTER: Duration = Duration::from_secs(2 * 300);

#[derive(Debug, Clone, Copy)]
struct Attempts {
    count: u32,
    last: Instant,
}

/// Tracks consecutive retries per record key.
///
/// The first retry uses the requested delay as is, every further consecutive
/// retry of the same key doubles it up to [`MAX_BACKOFF`]. A converged pass
/// resets the key. Keys that go quiet for [`STALE_AFTER`] are forgotten, so
/// records deleted mid-retry do not accumulate.
#[derive(Debug)]
pub struct KeyBackoff {
    attempts: DashMap<String, Attempts>,
    stale_after: Duration,
}

impl Default for KeyBackoff {
    fn default() -> Self {
        Self::with_stale_after(STALE_AFTER)
    }
}

impl KeyBackoff {
    /// Create an empty backoff table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backoff table with a custom staleness window
    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            attempts: DashMap::new(),
            stale_after,
        }
    }

    /// Delay before the next retry of `key`, recording the attempt
    pub fn next_delay(&self, key: &str, base: Duration) -> Duration {
        self.evict_stale();

        let now = Instant::now();
        let mut attempts = self.attempts.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            last: now,
        });
        let factor = 2u32.saturating_pow(attempts.count);
        attempts.count = attempts.count.saturating_add(1);
        attempts.last = now;
        base.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Forget the retry history of `key`
    pub fn reset(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Consecutive retries recorded for `key`
    pub fn attempts(&self, key: &str) -> u32 {
        self.attempts.get(key).map(|a| a.count).unwrap_or(0)
    }

    /// Number of keys currently backing off
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Whether no key is backing off
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    fn evict_stale(&self) {
        let stale_after = self.stale_after;
        self.attempts
            .retain(|_, attempts| attempts.last.elapsed() < stale_after);
    }
}
