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

//! Tunables for loading and querying a level

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::lighting::MAX_LIGHTS;

const DEFAULT_MIN_LIGHT_CONTRIBUTION: f32 = 1.0 / 255.0;
const DEFAULT_CACHE_CAPACITY: usize = 256;
const DEFAULT_CACHE_GC_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_AMBIENT: f32 = 0.5;

#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(public, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct LevelConfig {
    /// Most lights returned with a lighting sample. At most [`MAX_LIGHTS`].
    #[builder(default = "MAX_LIGHTS")]
    pub max_lights: usize,

    /// Lights contributing less luminance than this at a sample are dropped.
    #[builder(default = "DEFAULT_MIN_LIGHT_CONTRIBUTION")]
    pub min_light_contribution: f32,

    /// Use the HDR leaf ambient lumps when the level has them.
    #[builder(default = "false")]
    pub prefer_hdr_lighting: bool,

    /// Most objects with cached lighting.
    #[builder(default = "DEFAULT_CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// Cached lighting older than this is recomputed, and entries unused for this long are dropped.
    #[builder(default = "DEFAULT_CACHE_GC_INTERVAL")]
    pub cache_gc_interval: Duration,

    /// Grey level of the ambient cube used where there are no probes.
    #[builder(default = "DEFAULT_AMBIENT")]
    pub default_ambient: f32,
}

impl LevelConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(max_lights) = self.max_lights {
            if max_lights > MAX_LIGHTS {
                return Err(format!(
                    "max_lights is {}, but at most {} are supported",
                    max_lights, MAX_LIGHTS
                ));
            }
        }

        if let Some(min) = self.min_light_contribution {
            if !(min >= 0.0) {
                return Err("min_light_contribution must be non-negative".to_string());
            }
        }

        Ok(())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            max_lights: MAX_LIGHTS,
            min_light_contribution: DEFAULT_MIN_LIGHT_CONTRIBUTION,
            prefer_hdr_lighting: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_gc_interval: DEFAULT_CACHE_GC_INTERVAL,
            default_ambient: DEFAULT_AMBIENT,
        }
    }
}

impl LevelConfig {
    /// Light count actually used, for configs that were deserialised rather than built.
    pub fn light_limit(&self) -> usize {
        self.max_lights.min(MAX_LIGHTS)
    }
}
