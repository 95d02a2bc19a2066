//! A single-entry, time-boxed cache slot with an injectable clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Useful to exercise expiry
/// deterministically.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

/// Returns true once an entry stored at `stored_at` has reached `ttl` in age.
pub fn is_expired(stored_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(stored_at) >= ttl
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Holds at most one value together with the time it was stored.
pub struct TtlSlot<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: Mutex<Option<Entry<V>>>,
}

impl<V> TtlSlot<V>
where
    V: Clone + Send,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Locks the slot. Holding the guard across a refresh keeps concurrent
    /// callers from fetching twice.
    pub async fn lock(&self) -> SlotGuard<'_, V> {
        SlotGuard {
            entry: self.entry.lock().await,
            ttl: self.ttl,
            clock: self.clock.as_ref(),
        }
    }

    pub async fn get(&self) -> Option<V> {
        self.lock().await.fresh()
    }

    pub async fn put(&self, value: V) {
        self.lock().await.store(value);
    }
}

pub struct SlotGuard<'a, V> {
    entry: MutexGuard<'a, Option<Entry<V>>>,
    ttl: Duration,
    clock: &'a dyn Clock,
}

impl<V: Clone> SlotGuard<'_, V> {
    /// The stored value, if any, while it is younger than the ttl.
    pub fn fresh(&self) -> Option<V> {
        match (*self.entry).as_ref() {
            Some(entry) if !is_expired(entry.stored_at, self.clock.now(), self.ttl) => {
                debug!("Cache HIT");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired");
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    /// Replaces the stored value wholesale and restarts its age.
    pub fn store(&mut self, value: V) {
        debug!("Cache PUT");
        *self.entry = Some(Entry {
            value,
            stored_at: self.clock.now(),
        });
    }
}
