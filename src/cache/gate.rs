//! Compute gates serializing cache misses.
//!
//! Under [`LockPolicy::PerKey`] each key being computed gets its own mutex,
//! held in a `DashMap` only while some caller is using it. Under
//! [`LockPolicy::Global`] every key shares one mutex.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use super::LockPolicy;
use crate::key::CacheKey;

#[derive(Debug)]
pub(super) struct ComputeGates {
    policy: LockPolicy,
    global: Arc<Mutex<()>>,
    per_key: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl ComputeGates {
    pub(super) fn new(policy: LockPolicy) -> Self {
        Self {
            policy,
            global: Arc::new(Mutex::new(())),
            per_key: DashMap::new(),
        }
    }

    pub(super) fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Number of keys with a live per-key gate.
    pub(super) fn active(&self) -> usize {
        self.per_key.len()
    }

    /// Get the gate for `key`. The gate is released when dropped.
    pub(super) fn acquire<'a>(&'a self, key: &'a CacheKey) -> Gate<'a> {
        let mutex = match self.policy {
            LockPolicy::Global => Arc::clone(&self.global),
            LockPolicy::PerKey => Arc::clone(self.per_key.entry(key.clone()).or_default().value()),
        };
        Gate {
            gates: self,
            key,
            mutex: Some(mutex),
        }
    }

    fn release(&self, key: &CacheKey) {
        if self.policy == LockPolicy::PerKey {
            // Only the map's own reference left: nobody is waiting on this key.
            self.per_key.remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

/// A handle on one key's compute mutex.
pub(super) struct Gate<'a> {
    gates: &'a ComputeGates,
    key: &'a CacheKey,
    mutex: Option<Arc<Mutex<()>>>,
}

impl Gate<'_> {
    /// Block until this caller may compute the key.
    ///
    /// A poisoned mutex (an earlier compute panicked) is recovered; the
    /// panicking caller never stored an entry.
    pub(super) fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.mutex.as_deref().map(|mutex| {
            mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
                tracing::warn!("Compute lock for {} was poisoned by a panicked render", self.key);
                poisoned.into_inner()
            })
        })
    }
}

impl Drop for Gate<'_> {
    fn drop(&mut self) {
        drop(self.mutex.take());
        self.gates.release(self.key);
    }
}
