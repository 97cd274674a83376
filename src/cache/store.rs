//! Shared result cache with per-key single-flight.
//!
//! The map lock is held only long enough to find or create a key's slot.
//! The computation itself runs under the slot's own guard, so concurrent
//! requests for one uncached key wait for a single engine call while other
//! keys proceed independently. Lock order is always slot, then map.

use crate::cache::CacheKey;
use crate::core::EvaluationResult;
use crate::error::{ComputationError, Result};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// One key's computation guard and, once computed, its result.
///
/// The value is set only after a successful computation, so it is never
/// observed half-written even if a computation panics. Readers of a filled
/// slot never touch the guard.
#[derive(Debug, Default)]
struct Slot {
    guard: Mutex<()>,
    value: OnceLock<Arc<EvaluationResult>>,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<CacheKey, Arc<Slot>>,
    /// Filled keys, oldest first.
    order: VecDeque<CacheKey>,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached results.
    pub entries: usize,
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that ran the computation.
    pub misses: u64,
    /// Computations that failed and were not cached.
    pub failures: u64,
    /// Entries dropped to honor the capacity.
    pub evictions: u64,
}

/// A result returned by [`ResultCache::get_or_compute`].
#[derive(Debug, Clone)]
pub struct Cached {
    /// The shared result.
    pub result: Arc<EvaluationResult>,
    /// `true` if no computation ran for this request.
    pub hit: bool,
}

/// Result cache shared by all sessions.
///
/// Each key is computed at most once for as long as its entry lives. Failed
/// computations are never stored. When a capacity is set, the oldest entries
/// are evicted first; an evicted key is simply recomputed on next access.
///
/// # Examples
///
/// ```
/// use mathgate::cache::{CacheKey, ResultCache};
/// use mathgate::core::EvaluationResult;
///
/// let cache = ResultCache::unbounded();
/// let key = CacheKey::evaluation("2+2");
///
/// let first = cache.get_or_compute(&key, || Ok(EvaluationResult::new("4"))).unwrap();
/// let second = cache.get_or_compute(&key, || unreachable!()).unwrap();
/// assert!(!first.hit);
/// assert!(second.hit);
/// ```
#[derive(Debug, Default)]
pub struct ResultCache {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` results (`None` for no
    /// limit). A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.map(|c| c.max(1)),
            ..Self::default()
        }
    }

    /// Creates a cache without a capacity limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns the cached result for `key`, computing it if absent.
    ///
    /// Concurrent callers for the same key block until the first caller's
    /// computation finishes. If it fails, the error is returned to that
    /// caller only and the next waiter retries the computation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Computation`] if `compute` fails, or
    /// [`crate::Error::Internal`] if the cache map lock is poisoned.
    pub fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> Result<Cached>
    where
        F: FnOnce() -> std::result::Result<EvaluationResult, ComputationError>,
    {
        let slot = {
            let mut inner = self.inner.lock()?;
            Arc::clone(inner.slots.entry(key.clone()).or_default())
        };

        if let Some(result) = slot.value.get() {
            return Ok(self.hit(key, result));
        }

        let guard = slot.lock();
        if let Some(result) = slot.value.get() {
            return Ok(self.hit(key, result));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%key, "cache miss");

        match compute() {
            Ok(result) => {
                let result = Arc::clone(slot.value.get_or_init(|| Arc::new(result)));
                self.record_filled(key, &slot)?;
                Ok(Cached { result, hit: false })
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.discard_if_idle(key, &slot)?;
                drop(guard);
                Err(err.into())
            }
        }
    }

    fn hit(&self, key: &CacheKey, result: &Arc<EvaluationResult>) -> Cached {
        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%key, "cache hit");
        Cached {
            result: Arc::clone(result),
            hit: true,
        }
    }

    /// Returns the cached result for `key` without computing or waiting.
    ///
    /// A key whose first computation is still in flight reads as absent.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<EvaluationResult>> {
        let slot = self.inner.lock().ok()?.slots.get(key).cloned()?;
        slot.value.get().cloned()
    }

    /// Drops the entry for `key`. Returns `true` if a result was cached.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Internal`] if the cache map lock is poisoned.
    pub fn evict(&self, key: &CacheKey) -> Result<bool> {
        let mut inner = self.inner.lock()?;
        inner.slots.remove(key);
        let before = inner.order.len();
        inner.order.retain(|k| k != key);
        Ok(inner.order.len() != before)
    }

    /// Drops every entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Internal`] if the cache map lock is poisoned.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock()?;
        inner.slots.clear();
        inner.order.clear();
        Ok(())
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.order.len())
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Records a freshly filled slot and evicts the oldest entries over
    /// capacity. A slot detached by `evict` or `clear` mid-computation is not
    /// recorded.
    fn record_filled(&self, key: &CacheKey, slot: &Arc<Slot>) -> Result<()> {
        let mut inner = self.inner.lock()?;
        if !inner.slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            return Ok(());
        }
        inner.order.push_back(key.clone());

        if let Some(capacity) = self.capacity {
            while inner.order.len() > capacity {
                let Some(victim) = inner.order.pop_front() else {
                    break;
                };
                inner.slots.remove(&victim);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %victim, capacity, "evicted cache entry");
            }
        }
        Ok(())
    }

    /// Removes an empty slot after a failed computation unless another
    /// caller is already waiting on it.
    fn discard_if_idle(&self, key: &CacheKey, slot: &Arc<Slot>) -> Result<()> {
        let mut inner = self.inner.lock()?;
        let idle = inner
            .slots
            .get(key)
            .is_some_and(|s| Arc::ptr_eq(s, slot) && Arc::strong_count(s) == 2);
        if idle {
            inner.slots.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    fn ok(text: &str) -> std::result::Result<EvaluationResult, ComputationError> {
        Ok(EvaluationResult::new(text))
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let cache = ResultCache::unbounded();
        let key = CacheKey::evaluation("2+2");

        let first = cache.get_or_compute(&key, || ok("4")).unwrap();
        let second = cache.get_or_compute(&key, || ok("5")).unwrap();

        assert!(Arc::ptr_eq(&first.result, &second.result));
        assert_eq!(second.result.formatted, "4");
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache = ResultCache::unbounded();
        let key = CacheKey::evaluation("1/0");

        let err = cache
            .get_or_compute(&key, || Err(ComputationError::new("boom")))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Computation(_)));
        assert!(cache.get(&key).is_none());
        assert!(cache.inner.lock().unwrap().slots.is_empty());

        let second = cache.get_or_compute(&key, || ok("ComplexInfinity")).unwrap();
        assert!(!second.hit);
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_get_sees_entry_while_guard_is_held() {
        let cache = ResultCache::unbounded();
        let key = CacheKey::evaluation("x^2");
        cache.get_or_compute(&key, || ok("x^2")).unwrap();

        let slot = cache.inner.lock().unwrap().slots.get(&key).cloned().unwrap();
        let _held = slot.lock();

        assert_eq!(cache.get(&key).unwrap().formatted, "x^2");
        assert!(cache.get_or_compute(&key, || ok("other")).unwrap().hit);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ResultCache::new(Some(2));
        let a = CacheKey::evaluation("a");
        let b = CacheKey::evaluation("b");
        let c = CacheKey::evaluation("c");

        cache.get_or_compute(&a, || ok("a")).unwrap();
        cache.get_or_compute(&b, || ok("b")).unwrap();
        cache.get_or_compute(&c, || ok("c")).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a).is_none());
        assert!(cache.get(&b).is_some());
        assert_eq!(cache.stats().evictions, 1);

        let again = cache.get_or_compute(&a, || ok("a")).unwrap();
        assert!(!again.hit);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let cache = ResultCache::new(Some(0));
        assert_eq!(cache.capacity(), Some(1));
        cache.get_or_compute(&CacheKey::evaluation("x"), || ok("x")).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = ResultCache::unbounded();
        let key = CacheKey::evaluation("x");
        cache.get_or_compute(&key, || ok("x")).unwrap();

        assert!(cache.evict(&key).unwrap());
        assert!(!cache.evict(&key).unwrap());
        assert!(cache.is_empty());

        cache.get_or_compute(&key, || ok("x")).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_requests_compute_once() {
        let cache = Arc::new(ResultCache::unbounded());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));
        let key = CacheKey::evaluation("slow");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                let key = key.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_compute(&key, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            ok("done")
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Cached> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.result.formatted == "done"));
        assert_eq!(results.iter().filter(|r| !r.hit).count(), 1);
    }

    #[test]
    fn test_panicking_computation_releases_guard() {
        let cache = Arc::new(ResultCache::unbounded());
        let key = CacheKey::evaluation("panic");

        let worker = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            thread::spawn(move || {
                let _ = cache.get_or_compute(&key, || std::panic::panic_any("engine crashed"));
            })
        };
        assert!(worker.join().is_err());

        let retry = cache.get_or_compute(&key, || ok("recovered")).unwrap();
        assert_eq!(retry.result.formatted, "recovered");
    }
}
