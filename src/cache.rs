//! Result cache for repeated solves.
//!
//! Keyed by a content fingerprint of the solve inputs. Each key is computed at
//! most once; concurrent callers asking for the same key wait on that single
//! computation, and completed entries are shared as `Arc`s.
//!
//! The cache holds at most `capacity` entries. Inserting past that evicts the
//! oldest completed entry; entries still being computed are never evicted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::SolveError;
use crate::fingerprint::{Fingerprint, fingerprint_request};
use crate::model::{CandidateSite, DemandPoint, SiteSelection};
use crate::solver::{self, SolveOptions};

type Slot = Arc<OnceLock<Arc<SiteSelection>>>;

/// Entry bound used by [`SolveCache::new`].
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct SolveCache {
    options: SolveOptions,
    capacity: usize,
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Slots plus their insertion order, oldest first.
#[derive(Default)]
struct Entries {
    slots: HashMap<Fingerprint, Slot>,
    order: VecDeque<Fingerprint>,
}

impl Entries {
    /// Slot for `key`, inserting an empty one (and evicting down to
    /// `capacity`) when absent.
    fn slot(&mut self, key: Fingerprint, capacity: usize) -> (Slot, Option<Fingerprint>) {
        if let Some(slot) = self.slots.get(&key) {
            return (Arc::clone(slot), None);
        }

        let evicted = if self.slots.len() >= capacity {
            self.evict_oldest_completed()
        } else {
            None
        };

        let slot = Slot::default();
        self.slots.insert(key, Arc::clone(&slot));
        self.order.push_back(key);
        (slot, evicted)
    }

    fn evict_oldest_completed(&mut self) -> Option<Fingerprint> {
        let position = self
            .order
            .iter()
            .position(|key| self.slots.get(key).is_some_and(|slot| slot.get().is_some()))?;
        let key = self.order.remove(position)?;
        self.slots.remove(&key);
        Some(key)
    }

    fn remove(&mut self, key: &Fingerprint) -> bool {
        if self.slots.remove(key).is_none() {
            return false;
        }
        self.order.retain(|held| held != key);
        true
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }
}

impl Default for SolveCache {
    fn default() -> Self {
        Self::new(SolveOptions::default())
    }
}

impl SolveCache {
    pub fn new(options: SolveOptions) -> Self {
        Self::with_capacity(options, DEFAULT_CAPACITY)
    }

    /// A cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(options: SolveOptions, capacity: usize) -> Self {
        Self {
            options,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached selection for these inputs, solving on first use.
    ///
    /// Invalid input is rejected before touching the cache and is never stored.
    pub fn get_or_solve(
        &self,
        demand: &[DemandPoint],
        sites: &[CandidateSite],
        radius_miles: f64,
        k: usize,
    ) -> Result<Arc<SiteSelection>, SolveError> {
        solver::validate(demand, sites, radius_miles)?;

        let key = fingerprint_request(demand, sites, radius_miles, k);
        let (slot, evicted) = self.entries.lock().slot(key, self.capacity);
        if let Some(evicted) = evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(%evicted, "solve cache eviction");
        }

        let mut computed = false;
        let selection = slot.get_or_init(|| {
            computed = true;
            Arc::new(solver::solve_validated(
                demand,
                sites,
                radius_miles,
                k,
                &self.options,
            ))
        });

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "solve cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "solve cache hit");
        }
        Ok(Arc::clone(selection))
    }

    /// Completed selection for `key`, if any.
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<SiteSelection>> {
        let slot = self.entries.lock().slots.get(key).cloned()?;
        slot.get().cloned()
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &Fingerprint) -> bool {
        self.entries.lock().remove(key)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
