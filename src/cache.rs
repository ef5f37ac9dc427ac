// Time-boxed memoization of upstream calls

use crate::model::FetchError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub const DEFAULT_TTL_SECONDS: i64 = 600;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: &'static str,
    pub args: String,
}

impl CacheKey {
    pub fn new(operation: &'static str, args: impl Into<String>) -> Self {
        Self {
            operation,
            args: args.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: Result<V, FetchError>,
    pub created_at: DateTime<Utc>,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<CacheEntry<V>>>>;

/// Memoizes results (successes and errors alike) by operation and canonical
/// arguments for `ttl`.
///
/// Each key has its own async lock held across check-then-populate, so
/// concurrent callers for the same key share a single upstream call. Expired
/// entries are replaced on the next call for their key, and reclaimed when
/// any other key is requested.
pub struct TtlCache<V> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Slot<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(clock: Arc<dyn Clock>) -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECONDS), clock)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of keys held, including stale ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn slot(&self, key: &CacheKey) -> Slot<V> {
        let now = self.clock.now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        // Drop expired slots that no caller holds or waits on.
        slots.retain(|k, slot| {
            if k == key || Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|e| self.is_live(e, now)),
                Err(_) => true,
            }
        });

        slots.entry(key.clone()).or_default().clone()
    }

    fn is_live(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.created_at < self.ttl
    }

    /// Returns the live entry for `key`, or runs `fetch` and stores whatever it returns.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>>,
    {
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if self.is_live(entry, self.clock.now()) {
                debug!("Cache hit: {} {}", key.operation, key.args);
                return entry.value.clone();
            }
            debug!("Cache entry expired: {}", key.operation);
        } else {
            debug!("Cache miss: {}", key.operation);
        }

        let value = fetch().await;
        *guard = Some(CacheEntry {
            value: value.clone(),
            created_at: self.clock.now(),
        });
        value
    }
}
