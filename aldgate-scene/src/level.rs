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

//! A loaded level, and the context object that the rest of the engine queries

use aldgate_levels::prelude::*;
use aldgate_levels::traits::entities::Entity;
use aldgate_levels::traits::tree::LeafFlags;
use aldgate_levels::traits::visdata::ClusterId;
use aldgate_levels::{BspFile, BspTree, SpatialIndex, VisibilityTable};
use aldgate_types::{BoundingVolume, Vector3};
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::LevelConfig;
use crate::culling::{LeafVisibilityTracker, VisibleLeafSet};
use crate::error::{full_error_display, LevelError};
use crate::lighting::{AmbientLightIndex, LightingSample, ObjectHandle};

/// Everything built from one level file. Read only once built, apart from the
/// visible set and the lighting cache.
#[derive(Debug)]
pub struct Level {
    version: i32,
    map_revision: i32,
    map: SpatialIndex,
    entities: Box<[Entity]>,
    tracker: LeafVisibilityTracker,
    lighting: AmbientLightIndex,
}

impl Level {
    /// Parse a level and build its tree, PVS and lighting.
    pub fn load(data: &[u8], config: &LevelConfig) -> Result<Level> {
        let file = BspFile::parse_file(data)
            .map_err(LevelError::from)
            .context("Error loading level")?
            .rescale_to::<WorldUnits>();

        if file.get_model(0).is_none() {
            return Err(LevelError::NoWorldModel).context("Error loading level");
        }

        let map = SpatialIndex::from_file(&file);
        if !map.vis.has_pvs_data() {
            warn!(
                "Level has incomplete visibility data ({} clusters), treating everything as visible",
                map.vis.num_clusters()
            );
        }

        let lighting = AmbientLightIndex::build(&file, &map.tree, config);
        if lighting.probes().is_empty() {
            warn!("Level has no ambient probes, using default ambient lighting");
        }

        info!(
            "Loaded level (VBSP v{}, revision {}): {} leaves, {} clusters, {} probes, {} lights",
            file.version(),
            file.map_revision(),
            map.tree.world_leaves().len(),
            map.tree.num_clusters(),
            lighting.probes().len(),
            lighting.lights().len()
        );

        Ok(Level {
            version: file.version(),
            map_revision: file.map_revision(),
            entities: file.entities_iter().cloned().collect(),
            map,
            tracker: LeafVisibilityTracker::new(),
            lighting,
        })
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn map_revision(&self) -> i32 {
        self.map_revision
    }

    pub fn map(&self) -> &SpatialIndex {
        &self.map
    }

    pub fn tree(&self) -> &BspTree {
        &self.map.tree
    }

    pub fn vis(&self) -> &VisibilityTable {
        &self.map.vis
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn tracker(&self) -> &LeafVisibilityTracker {
        &self.tracker
    }

    pub fn lighting(&self) -> &AmbientLightIndex {
        &self.lighting
    }

    /// `hint` if it names a leaf, otherwise the leaf containing `point`.
    fn resolve_leaf(&self, point: &Vector3, hint: Option<u32>) -> u32 {
        match hint {
            Some(leaf) if self.map.tree.leaf(leaf).is_some() => leaf,
            _ => self.map.tree.find_leaf(point, 0),
        }
    }
}

/// Holds the active level, if any, and answers queries against it.
/// With no level loaded every query gives a permissive default.
#[derive(Debug)]
pub struct LevelContext {
    config: LevelConfig,
    level: Option<Level>,

    /// Used for lighting queries with no level
    fallback_lighting: AmbientLightIndex,
}

impl Default for LevelContext {
    fn default() -> Self {
        LevelContext::new(LevelConfig::default())
    }
}

impl LevelContext {
    pub fn new(config: LevelConfig) -> LevelContext {
        LevelContext {
            fallback_lighting: AmbientLightIndex::empty(&config),
            config,
            level: None,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Replace the active level with the one in `data`.
    /// If it can't be loaded, the previous level stays active.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        match Level::load(data, &self.config) {
            Ok(level) => {
                self.level = Some(level);
                Ok(())
            }
            Err(e) => {
                error!("{}", full_error_display(&e));
                Err(e)
            }
        }
    }

    /// Read and load a level file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Error reading level file {}", path.display()))?;

        self.load(&data)
    }

    pub fn unload(&mut self) {
        if self.level.take().is_some() {
            info!("Unloaded level");
        }
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn has_active_level(&self) -> bool {
        self.level.is_some()
    }

    /// True if a level is loaded and it has complete PVS data.
    pub fn has_visibility(&self) -> bool {
        self.level
            .as_ref()
            .map_or(false, |l| l.map.vis.has_pvs_data())
    }

    pub fn find_leaf(&self, point: &Vector3) -> u32 {
        self.level
            .as_ref()
            .map_or(0, |l| l.map.tree.find_leaf(point, 0))
    }

    pub fn find_node(&self, point: &Vector3) -> u32 {
        self.level
            .as_ref()
            .map_or(0, |l| l.map.tree.find_node(point, 0))
    }

    /// The vis cluster of a leaf, 0 if it's in the void or doesn't exist.
    pub fn leaf_cluster(&self, leaf: u32) -> ClusterId {
        self.level
            .as_ref()
            .and_then(|l| l.map.tree.leaf(leaf))
            .map_or(0, |leaf| leaf.vis_cluster())
    }

    pub fn is_cluster_visible(&self, from: ClusterId, to: ClusterId) -> bool {
        self.level
            .as_ref()
            .map_or(true, |l| l.map.vis.is_visible(from, to))
    }

    /// Could `volume` be seen from the viewer's current leaf?
    pub fn pvs_bounds_test(&self, volume: &BoundingVolume, required_flags: LeafFlags) -> bool {
        self.level
            .as_ref()
            .map_or(true, |l| l.tracker.bounds_test(volume, required_flags))
    }

    /// Locate the viewer, rebuilding the visible set if they changed leaf.
    pub fn update_visibility(&self, viewer: &Vector3) -> bool {
        self.level
            .as_ref()
            .map_or(false, |l| l.tracker.update(&l.map, viewer))
    }

    /// The current visible set. Empty if there isn't one.
    pub fn visible_leaves(&self) -> Arc<VisibleLeafSet> {
        self.level
            .as_ref()
            .and_then(|l| l.tracker.snapshot())
            .unwrap_or_default()
    }

    /// Lighting at a point. `leaf_hint` saves a tree walk when the caller already knows the leaf.
    pub fn get_lighting(&self, point: &Vector3, leaf_hint: Option<u32>) -> LightingSample {
        match &self.level {
            Some(l) => {
                let leaf = l.resolve_leaf(point, leaf_hint);
                l.lighting.sample(&l.map, point, leaf)
            }
            None => self.fallback_lighting.default_sample(0),
        }
    }

    /// Lighting for a dynamic object, cached between calls.
    pub fn get_object_lighting(
        &self,
        handle: ObjectHandle,
        point: &Vector3,
        leaf_hint: Option<u32>,
    ) -> Arc<LightingSample> {
        match &self.level {
            Some(l) => {
                let leaf = l.resolve_leaf(point, leaf_hint);
                l.lighting
                    .sample_cached(&l.map, handle, point, leaf, Instant::now())
            }
            None => Arc::new(self.fallback_lighting.default_sample(0)),
        }
    }

    /// Drop cached lighting for an object that is being destroyed.
    pub fn forget_object(&self, handle: ObjectHandle) {
        if let Some(l) = &self.level {
            l.lighting.forget(handle);
        }
    }

    /// Drop lighting cache entries unused for a whole interval.
    pub fn collect_garbage(&self) -> usize {
        self.level
            .as_ref()
            .map_or(0, |l| l.lighting.collect_garbage(Instant::now()))
    }

    /// Invalidate all cached lighting, eg after a lightstyle change.
    pub fn notify_lighting_changed(&self) {
        if let Some(l) = &self.level {
            l.lighting.notify_lighting_changed();
        }
    }

    pub fn set_light_enabled(&self, light: usize, enabled: bool) -> Result<(), LevelError> {
        let level = self.level.as_ref().ok_or(LevelError::NoActiveLevel)?;
        if level.lighting.set_light_enabled(light, enabled) {
            Ok(())
        } else {
            Err(LevelError::NoSuchLight(light))
        }
    }
}
