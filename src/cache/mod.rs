//! Bounded memoization cache for rendered output.
//!
//! [`RenderCache`] maps [`CacheKey`]s to previously rendered output and sits in
//! front of component rendering: on a hit the stored output is returned, on a
//! miss the render runs once and its output is stored.
//!
//! # Eviction
//!
//! The cache holds at most `capacity` entries and evicts the least recently
//! used one when a new entry would exceed that bound. A hit refreshes the
//! entry's recency; a freshly stored entry is the most recently used.
//! Shrinking the capacity with [`RenderCache::resize`] evicts LRU-first until
//! the new bound holds.
//!
//! # Concurrency
//!
//! A `RenderCache` is shared between threads behind an `Arc`. Two locks are
//! involved:
//!
//! - the **bookkeeping lock** (a `Mutex` around the LRU map and statistics) is
//!   held only for lookups, stores, evictions, resizes and clears; it is never
//!   held while a render runs.
//! - the **compute gates** serialize misses according to the [`LockPolicy`]:
//!   - [`LockPolicy::PerKey`] (default): concurrent misses for the same key wait
//!     for the first caller and then read its stored result, so each key is
//!     rendered at most once at a time. Different keys render in parallel.
//!   - [`LockPolicy::Global`]: one gate for all keys; every miss renders alone.
//!     Simpler, but a slow render blocks misses on every other key.
//!
//! A `clear` racing with an in-flight render lets that render's output land
//! after the clear. It is a fresh entry for the current inputs, not a stale one.
//!
//! # Failures
//!
//! When the compute closure fails, nothing is stored and the error is returned
//! to the caller unchanged. The next call for the key renders again.
//!
//! # Example
//!
//! ```rust
//! use rendercell::{KeyDeriver, RenderCache, bundle};
//!
//! let cache = RenderCache::new(2).unwrap();
//! let key = KeyDeriver::new().derive_key(&bundle! { "name" => "Macron" }).unwrap();
//!
//! let first = cache.get_or_compute(&key, || Ok::<_, std::convert::Infallible>("<h1>Hi</h1>".to_string()));
//! let second = cache.get_or_compute(&key, || -> Result<String, std::convert::Infallible> {
//!     unreachable!("served from cache")
//! });
//! assert_eq!(first.unwrap(), second.unwrap());
//! assert_eq!(cache.stats().hits, 1);
//! ```

mod gate;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use self::gate::ComputeGates;
use crate::config::CacheConfig;
use crate::core::CellError;
use crate::key::CacheKey;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 256;

/// How cache misses are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockPolicy {
    /// One compute lock per key; at most one render per key at a time.
    #[default]
    PerKey,
    /// One compute lock for the whole cache.
    Global,
}

impl fmt::Display for LockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockPolicy::PerKey => f.write_str("per-key"),
            LockPolicy::Global => f.write_str("global"),
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Calls served from the cache
    pub hits: u64,
    /// Calls that ran the compute closure (including failed ones)
    pub misses: u64,
    /// Entries dropped to honor the capacity bound
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a percentage; `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct CacheState {
    entries: LruCache<CacheKey, Arc<str>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    fn store(&mut self, key: CacheKey, output: Arc<str>) {
        if let Some((evicted, _)) = self.entries.push(key.clone(), output) {
            if evicted != key {
                self.evictions += 1;
                tracing::debug!("Evicted least recently used entry {}", evicted);
            }
        }
    }
}

/// Bounded, thread-safe LRU cache of rendered output.
pub struct RenderCache {
    state: Mutex<CacheState>,
    gates: ComputeGates,
}

impl RenderCache {
    /// Create a cache holding at most `capacity` entries, with per-key locking.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::CapacityViolation`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CellError> {
        Self::with_policy(capacity, LockPolicy::default())
    }

    /// Create a cache with an explicit [`LockPolicy`].
    pub fn with_policy(capacity: usize, policy: LockPolicy) -> Result<Self, CellError> {
        let capacity = non_zero(capacity)?;
        Ok(Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            gates: ComputeGates::new(policy),
        })
    }

    /// Create a cache from the `[cache]` configuration section.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CellError> {
        Self::with_policy(config.capacity, config.lock_policy)
    }

    pub fn policy(&self) -> LockPolicy {
        self.gates.policy()
    }

    /// Return the output stored under `key`, or run `compute` and store its output.
    ///
    /// On a hit the entry becomes the most recently used. On a miss `compute`
    /// runs exactly once (per the [`LockPolicy`], concurrent callers for the
    /// same key wait and reuse its result), its output is stored as most
    /// recently used, and the least recently used entry is evicted if the
    /// cache is full.
    ///
    /// # Errors
    ///
    /// Returns `compute`'s error unchanged; nothing is stored for `key`.
    pub fn get_or_compute<E, F>(&self, key: &CacheKey, compute: F) -> Result<Arc<str>, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        if let Some(hit) = self.get(key) {
            tracing::debug!("Render cache hit for {}", key);
            return Ok(hit);
        }

        let gate = self.gates.acquire(key);
        let _held = gate.lock();

        // Another caller may have stored the key while we waited on the gate.
        if let Some(hit) = self.get(key) {
            tracing::debug!("Render cache hit for {} after waiting on concurrent render", key);
            return Ok(hit);
        }

        self.state().misses += 1;
        tracing::debug!("Render cache miss for {}, rendering", key);

        let output: Arc<str> = match compute() {
            Ok(output) => output.into(),
            Err(err) => {
                tracing::debug!("Render for {} failed; nothing cached", key);
                return Err(err);
            }
        };

        self.state().store(key.clone(), Arc::clone(&output));
        Ok(output)
    }

    /// Stored output for `key`, refreshing its recency. Counts as a hit when found.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        let mut state = self.state();
        let hit = state.entries.get(key).cloned();
        if hit.is_some() {
            state.hits += 1;
        }
        hit
    }

    /// Store `output` under `key` as the most recently used entry, replacing
    /// any previous entry for the key.
    pub fn insert(&self, key: CacheKey, output: impl Into<Arc<str>>) {
        self.state().store(key, output.into());
    }

    /// Whether `key` is stored. Does not affect recency or statistics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state().entries.contains(key)
    }

    /// Remove the entry for `key`. Returns whether an entry was removed.
    pub fn evict(&self, key: &CacheKey) -> bool {
        let removed = self.state().entries.pop(key).is_some();
        if removed {
            tracing::debug!("Evicted {} on request", key);
        }
        removed
    }

    /// Remove every entry and reset statistics.
    pub fn clear(&self) {
        let mut state = self.state();
        let dropped = state.entries.len();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        state.evictions = 0;
        tracing::debug!("Cleared render cache ({} entries)", dropped);
    }

    /// Change the capacity bound, evicting least recently used entries if the
    /// cache holds more than `new_capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::CapacityViolation`] for zero; the cache is unchanged.
    pub fn resize(&self, new_capacity: usize) -> Result<(), CellError> {
        let capacity = non_zero(new_capacity)?;
        let mut state = self.state();
        let overflow = state.entries.len().saturating_sub(new_capacity);
        state.entries.resize(capacity);
        state.evictions += overflow as u64;
        tracing::debug!("Resized render cache to {} ({} evicted)", new_capacity, overflow);
        Ok(())
    }

    /// Current number of entries.
    pub fn size(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state().entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }

    /// Hit rate as a percentage; `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Render cache lock was poisoned; continuing with current state");
            poisoned.into_inner()
        })
    }
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("RenderCache")
            .field("size", &stats.size)
            .field("capacity", &stats.capacity)
            .field("policy", &self.policy())
            .finish()
    }
}

fn non_zero(capacity: usize) -> Result<NonZeroUsize, CellError> {
    NonZeroUsize::new(capacity).ok_or(CellError::CapacityViolation {
        requested: capacity,
    })
}
