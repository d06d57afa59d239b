//! # Density Lattice Cache
//!
//! Keeps recently built lattices keyed by chunk coordinate so that
//! regenerating a chunk skips the noise passes.
//!
//! A lattice depends on the seed, the configuration and the biomes around
//! the chunk. The cache lives inside one generator (fixed seed and config),
//! so it is only correct when the biome source returns the same biomes for a
//! chunk coordinate every time. Capacity 0 turns it off.
//!
//! Eviction is first-in first-out.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::chunk::ChunkCoord;
use crate::density::DensityLattice;

/// Hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to build a lattice.
    pub misses: u64,
}

#[derive(Default)]
struct Entries {
    lattices: HashMap<ChunkCoord, Arc<DensityLattice>>,
    order: VecDeque<ChunkCoord>,
}

/// Bounded FIFO cache of density lattices.
pub struct DensityCache {
    capacity: usize,
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DensityCache {
    /// Creates a cache holding at most `capacity` lattices.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Maximum number of lattices kept.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the cache stores anything at all.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Cached lattice for `coord`.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<DensityLattice>> {
        let found = self.entries.lock().lattices.get(&coord).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores a lattice, evicting the oldest entry when full.
    ///
    /// If another thread stored the same coordinate first, its lattice is
    /// kept and returned.
    pub fn insert(&self, coord: ChunkCoord, lattice: DensityLattice) -> Arc<DensityLattice> {
        let lattice = Arc::new(lattice);
        if !self.is_enabled() {
            return lattice;
        }

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.lattices.get(&coord) {
            return Arc::clone(existing);
        }
        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.lattices.remove(&oldest);
                }
                None => break,
            }
        }
        entries.order.push_back(coord);
        entries.lattices.insert(coord, Arc::clone(&lattice));
        lattice
    }

    /// Returns the cached lattice or builds, stores and returns a new one.
    ///
    /// `build` runs without the lock held.
    pub fn get_or_insert_with(
        &self,
        coord: ChunkCoord,
        build: impl FnOnce() -> DensityLattice,
    ) -> Arc<DensityLattice> {
        if self.is_enabled() {
            if let Some(lattice) = self.get(coord) {
                return lattice;
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.insert(coord, build())
    }

    /// Number of cached lattices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().lattices.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached lattice.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.lattices.clear();
        entries.order.clear();
    }

    /// Hit/miss counters since construction.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DensityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DensityCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
