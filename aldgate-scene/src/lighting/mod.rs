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

//! Ambient lighting for dynamic objects, from baked probes and the level's lights

pub mod cache;
pub mod lights;
pub mod probes;

pub use self::cache::{CacheState, LightingCache, ObjectHandle};
pub use self::lights::{Light, LightContribution, LightKind};
pub use self::probes::{AmbientProbe, ProbeIndex};

use aldgate_levels::coords::CoordSystem;
use aldgate_levels::prelude::*;
use aldgate_levels::traits::ambient::AmbientCube;
use aldgate_levels::traits::tree::LeafFlags;
use aldgate_levels::BspFile;
use aldgate_types::Vector3;
use arrayvec::ArrayVec;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::LevelConfig;

/// Most lights a sample can carry.
pub const MAX_LIGHTS: usize = 4;

/// The lighting at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingSample {
    pub ambient: AmbientCube,

    /// The probe `ambient` came from, if any
    pub probe: Option<u32>,
    pub leaf: u32,

    /// Strongest first
    pub lights: ArrayVec<LightContribution, MAX_LIGHTS>,

    /// Increases every time a sample is computed
    pub sequence: u64,
}

impl LightingSample {
    /// A sample with only the given ambient cube.
    pub fn neutral(ambient: AmbientCube, leaf: u32, sequence: u64) -> LightingSample {
        LightingSample {
            ambient,
            probe: None,
            leaf,
            lights: ArrayVec::new(),
            sequence,
        }
    }
}

/// Probes and lights of a level, and a cache of samples for dynamic objects.
#[derive(Debug)]
pub struct AmbientLightIndex {
    probes: ProbeIndex,
    lights: Box<[Light]>,
    enabled: Box<[AtomicBool]>,
    generation: AtomicU64,
    sequence: AtomicU64,
    cache: LightingCache,
    max_lights: usize,
    min_contribution: f32,
    default_ambient: AmbientCube,
}

impl AmbientLightIndex {
    /// An index with no probes or lights.
    pub fn empty(config: &LevelConfig) -> AmbientLightIndex {
        AmbientLightIndex::new(ProbeIndex::default(), vec![], config)
    }

    pub fn new(probes: ProbeIndex, lights: Vec<Light>, config: &LevelConfig) -> AmbientLightIndex {
        let enabled = lights
            .iter()
            .map(|l| AtomicBool::new(l.initially_enabled))
            .collect();

        AmbientLightIndex {
            probes,
            lights: lights.into_boxed_slice(),
            enabled,
            generation: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
            cache: LightingCache::new(config.cache_capacity, config.cache_gc_interval),
            max_lights: config.light_limit(),
            min_contribution: config.min_light_contribution,
            default_ambient: AmbientCube::uniform(config.default_ambient),
        }
    }

    /// Scan a level for probes and lights. Each light is placed in the leaf containing it.
    pub fn build<S: CoordSystem, T: HasBspTree>(
        file: &BspFile<S>,
        tree: &T,
        config: &LevelConfig,
    ) -> AmbientLightIndex {
        let probes = ProbeIndex::from_file(file, config.prefer_hdr_lighting);

        let lights: Vec<Light> = file
            .entities_iter()
            .filter_map(Light::from_entity)
            .map(|mut light| {
                if light.kind != LightKind::Sun {
                    light.leaf = tree.find_leaf(&light.position, 0);
                    light.cluster = tree.get_leaf(light.leaf).map_or(0, |l| l.vis_cluster());
                }
                light
            })
            .collect();

        debug!(
            "Lighting index has {} probes and {} lights",
            probes.len(),
            lights.len()
        );

        AmbientLightIndex::new(probes, lights, config)
    }

    pub fn probes(&self) -> &ProbeIndex {
        &self.probes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn is_light_enabled(&self, idx: usize) -> bool {
        self.enabled
            .get(idx)
            .map_or(false, |e| e.load(Ordering::Acquire))
    }

    /// Switch a light on or off. Returns false if there is no such light.
    pub fn set_light_enabled(&self, idx: usize, enabled: bool) -> bool {
        match self.enabled.get(idx) {
            Some(flag) => {
                if flag.swap(enabled, Ordering::AcqRel) != enabled {
                    self.notify_lighting_changed();
                }
                true
            }
            None => false,
        }
    }

    /// Invalidate every cached sample.
    pub fn notify_lighting_changed(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The default cube, for when there is no level or no probes.
    pub fn default_sample(&self, leaf: u32) -> LightingSample {
        LightingSample::neutral(self.default_ambient, leaf, self.next_sequence())
    }

    /// Compute the lighting at `position`, which lies in `leaf`.
    pub fn sample<M: MinVisFeatures>(&self, map: &M, position: &Vector3, leaf: u32) -> LightingSample {
        let probe = self
            .probes
            .nearest_in_leaf(leaf, position)
            .or_else(|| self.probes.nearest(position));
        let ambient = probe
            .and_then(|idx| self.probes.get(idx))
            .map_or(self.default_ambient, |p| p.cube);

        let (cluster, flags) = map
            .get_leaf(leaf)
            .map_or((0, LeafFlags::empty()), |l| (l.vis_cluster(), l.flags));
        let sees_sky = flags.intersects(LeafFlags::SKY | LeafFlags::SKY2D);

        let mut candidates: Vec<LightContribution> = self
            .lights
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_light_enabled(*idx))
            .filter(|(_, light)| match light.kind {
                LightKind::Sun => sees_sky,
                _ => map.cluster_visible_from(cluster, light.cluster),
            })
            .map(|(idx, light)| light.contribution(idx, position))
            .filter(|c| c.weight >= self.min_contribution && c.weight > 0.0)
            .collect();
        candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        LightingSample {
            ambient,
            probe,
            leaf,
            lights: candidates.into_iter().take(self.max_lights).collect(),
            sequence: self.next_sequence(),
        }
    }

    /// Like [`sample`](Self::sample), but reuses the object's previous sample while it stays in
    /// the same leaf and nothing has changed.
    pub fn sample_cached<M: MinVisFeatures>(
        &self,
        map: &M,
        handle: ObjectHandle,
        position: &Vector3,
        leaf: u32,
        now: Instant,
    ) -> Arc<LightingSample> {
        self.cache
            .get_or_compute(handle, leaf, self.generation(), now, || {
                self.sample(map, position, leaf)
            })
    }

    pub fn cache_state(&self, handle: ObjectHandle, leaf: u32, now: Instant) -> CacheState {
        self.cache.state(handle, leaf, self.generation(), now)
    }

    pub fn forget(&self, handle: ObjectHandle) -> bool {
        self.cache.forget(handle)
    }

    pub fn collect_garbage(&self, now: Instant) -> usize {
        self.cache.collect_garbage(now)
    }

    pub fn cache(&self) -> &LightingCache {
        &self.cache
    }
}
