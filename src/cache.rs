//! Time-bounded memoization for warehouse fetches.
//!
//! One cache slot per fetch: concurrent dashboard viewers share a single
//! materialized result per refresh interval instead of hammering the
//! mirror. Staleness within the TTL is acceptable; a poisoned lock
//! degrades to an uncached fetch, never a panic.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default refresh interval for warehouse fetches.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if it is younger than the TTL, otherwise run
    /// `refresh` and cache its result. A failed refresh leaves any stale
    /// entry untouched so the next call retries.
    pub fn get_or_refresh<E>(&self, refresh: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::warn!("cache lock poisoned; fetching without caching");
                return refresh();
            }
        };

        if let Some(entry) = slot.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.value.clone());
            }
        }

        let value = refresh()?;
        *slot = Some(Entry {
            fetched_at: Instant::now(),
            value: value.clone(),
        });
        Ok(value)
    }

    /// Drop the cached entry so the next call refetches.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
