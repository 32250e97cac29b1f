/*
 * Copyright (C) Oscar Shrimpton 2020
 *
 * This program is free software: you can redistribute it and/or modify it
 * under the terms of the GNU General Public License as published by the Free
 * Software Foundation, either version 3 of the License, or (at your option)
 * any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
 * FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
 * more details.
 *
 * You should have received a copy of the GNU General Public License along
 * with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Per-object cache of lighting samples

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::LightingSample;

/// Identifies a dynamic object to the cache. Chosen by the caller.
pub type ObjectHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached for this object
    Uninitialized,

    /// The cached sample can be reused
    Valid,

    /// The object changed leaf, world lighting changed, or the sample is too old
    Stale,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    sample: Arc<LightingSample>,
    leaf: u32,
    generation: u64,
    computed_at: Instant,
    last_used: Instant,
}

impl CacheEntry {
    fn is_valid(&self, leaf: u32, generation: u64, now: Instant, max_age: Duration) -> bool {
        self.leaf == leaf
            && self.generation == generation
            && now.saturating_duration_since(self.computed_at) < max_age
    }
}

/// A bounded cache of lighting samples, keyed by object.
/// The least recently used entry is evicted when full, and entries unused for a whole
/// `gc_interval` are dropped once per interval.
#[derive(Debug)]
pub struct LightingCache {
    entries: Mutex<HashMap<ObjectHandle, CacheEntry>>,
    capacity: usize,
    gc_interval: Duration,
    last_gc: Mutex<Instant>,
}

impl LightingCache {
    pub fn new(capacity: usize, gc_interval: Duration) -> LightingCache {
        LightingCache {
            entries: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
            gc_interval,
            last_gc: Mutex::new(Instant::now()),
        }
    }

    pub fn gc_interval(&self) -> Duration {
        self.gc_interval
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn state(&self, handle: ObjectHandle, leaf: u32, generation: u64, now: Instant) -> CacheState {
        match self.entries.lock().get(&handle) {
            None => CacheState::Uninitialized,
            Some(entry) if entry.is_valid(leaf, generation, now, self.gc_interval) => {
                CacheState::Valid
            }
            Some(_) => CacheState::Stale,
        }
    }

    /// The cached sample for `handle` if still valid, otherwise a fresh one from `compute`.
    /// `compute` runs without the cache locked.
    pub fn get_or_compute<F>(
        &self,
        handle: ObjectHandle,
        leaf: u32,
        generation: u64,
        now: Instant,
        compute: F,
    ) -> Arc<LightingSample>
    where
        F: FnOnce() -> LightingSample,
    {
        self.collect_if_due(now);

        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get_mut(&handle) {
                if entry.is_valid(leaf, generation, now, self.gc_interval) {
                    entry.last_used = now;
                    return entry.sample.clone();
                }
            }
        }

        let sample = Arc::new(compute());
        if self.capacity == 0 {
            return sample;
        }

        let mut entries = self.entries.lock();
        if !entries.contains_key(&handle) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(handle, _)| *handle);
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            handle,
            CacheEntry {
                sample: sample.clone(),
                leaf,
                generation,
                computed_at: now,
                last_used: now,
            },
        );

        sample
    }

    /// Drop the entry for an object that no longer exists.
    pub fn forget(&self, handle: ObjectHandle) -> bool {
        self.entries.lock().remove(&handle).is_some()
    }

    /// Collect garbage if a whole interval has passed since it was last done.
    fn collect_if_due(&self, now: Instant) {
        {
            let mut last_gc = self.last_gc.lock();
            if now.saturating_duration_since(*last_gc) < self.gc_interval {
                return;
            }
            *last_gc = now;
        }

        self.collect_garbage(now);
    }

    /// Drop entries that have not been used for a whole interval. Returns how many were dropped.
    pub fn collect_garbage(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.last_used) < self.gc_interval);

        let dropped = before - entries.len();
        if dropped > 0 {
            debug!("Dropped {} unused lighting cache entries", dropped);
        }
        dropped
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
