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

mod helpers;

use aldgate_levels::testing::{two_room_map, uniform_cube, LeafSpec};
use aldgate_levels::traits::tree::LeafFlags;
use aldgate_scene::lighting::{CacheState, LightKind};
use aldgate_scene::{LevelConfig, LevelConfigBuilder};
use aldgate_types::Vector3;
use std::sync::Arc;
use std::time::{Duration, Instant};

use helpers::*;

fn entities(lights: &[&str]) -> String {
    let mut text = WORLDSPAWN.to_string();
    for light in lights {
        text.push_str(light);
    }
    text
}

const LIGHT_IN_A: &str = "{\n\"classname\" \"light\"\n\"origin\" \"-256 0 0\"\n\"_light\" \"255 255 255 200\"\n}\n";
const LIGHT_IN_B: &str = "{\n\"classname\" \"light\"\n\"origin\" \"256 0 0\"\n\"_light\" \"255 255 255 200\"\n}\n";
const DARK_LIGHT_IN_A: &str = "{\n\"classname\" \"light\"\n\"origin\" \"-256 0 0\"\n\"spawnflags\" \"1\"\n\"_light\" \"255 255 255 200\"\n}\n";
const SUN: &str = "{\n\"classname\" \"light_environment\"\n\"angles\" \"90 0 0\"\n\"pitch\" \"90\"\n\"_light\" \"255 255 255 200\"\n}\n";

fn red() -> Vector3 {
    Vector3::new(1.0, 0.0, 0.0)
}

fn green() -> Vector3 {
    Vector3::new(0.0, 1.0, 0.0)
}

#[test]
fn no_probes_gives_neutral_sample() {
    let ctx = load(&two_room_map(), LevelConfig::default());
    let sample = ctx.get_lighting(&in_room_a(), None);

    assert_eq!(sample.probe, None);
    assert_eq!(sample.leaf, 1);
    assert!(sample.lights.is_empty());
    for face in sample.ambient.faces.iter() {
        assert_eq!(*face, Vector3::repeat(0.5));
    }
}

#[test]
fn default_ambient_is_configurable() {
    let config = LevelConfigBuilder::default()
        .default_ambient(0.25)
        .build()
        .unwrap();
    let ctx = load(&two_room_map(), config);

    assert_eq!(
        ctx.get_lighting(&in_room_a(), None).ambient.faces[0],
        Vector3::repeat(0.25)
    );
}

#[test]
fn probes_from_ambient_lumps() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.ambient(
        false,
        vec![(0, 0), (1, 0), (1, 1)],
        vec![
            (uniform_cube(255, 0, 0, 0), [0, 128, 128]),
            (uniform_cube(0, 255, 0, 0), [255, 0, 0]),
        ],
    );
    let ctx = load(&builder, LevelConfig::default());

    let probes = ctx.level().unwrap().lighting().probes();
    assert_eq!(probes.len(), 2);
    assert_eq!(probes.in_leaf(1), &[0]);
    assert_eq!(probes.in_leaf(2), &[1]);

    // Positions are fractions of the leaf's bounds
    let a = probes.get(0).unwrap();
    assert_eq!(a.position.x, -32.0);
    assert!((a.position.y - 32.0 * 128.0 / 255.0 + 16.0).abs() < 1e-4);
    let b = probes.get(1).unwrap();
    assert_eq!(b.position, Vector3::new(32.0, -16.0, -16.0));

    let sample = ctx.get_lighting(&in_room_a(), None);
    assert_eq!(sample.probe, Some(0));
    assert_eq!(sample.ambient.faces[0], red());

    let sample = ctx.get_lighting(&in_room_b(), None);
    assert_eq!(sample.probe, Some(1));
    assert_eq!(sample.ambient.faces[5], green());
}

#[test]
fn leaf_without_probes_uses_nearest() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.ambient(
        false,
        vec![(0, 0), (1, 0), (0, 1)],
        vec![(uniform_cube(255, 0, 0, 0), [128, 128, 128])],
    );
    let ctx = load(&builder, LevelConfig::default());

    let sample = ctx.get_lighting(&in_room_b(), None);
    assert_eq!(sample.leaf, 2);
    assert_eq!(sample.probe, Some(0));
    assert_eq!(sample.ambient.faces[0], red());
}

#[test]
fn hdr_lighting_is_preferred_when_asked() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder
        .ambient(
            false,
            vec![(0, 0), (1, 0), (0, 1)],
            vec![(uniform_cube(255, 0, 0, 0), [128, 128, 128])],
        )
        .ambient(
            true,
            vec![(0, 0), (1, 0), (0, 1)],
            vec![(uniform_cube(0, 255, 0, 0), [128, 128, 128])],
        );

    let ldr = load(&builder, LevelConfig::default());
    assert_eq!(ldr.get_lighting(&in_room_a(), None).ambient.faces[0], red());

    let config = LevelConfigBuilder::default()
        .prefer_hdr_lighting(true)
        .build()
        .unwrap();
    let hdr = load(&builder, config);
    assert_eq!(hdr.get_lighting(&in_room_a(), None).ambient.faces[0], green());
}

#[test]
fn version_0_leaves_provide_probes() {
    let mut builder = rooms_from(
        LeafSpec {
            ambient: Some(uniform_cube(255, 0, 0, 0)),
            ..room_a()
        },
        LeafSpec {
            ambient: Some(uniform_cube(0, 255, 0, 0)),
            ..room_b()
        },
        true,
    );
    builder.leaf_version(0);
    let ctx = load(&builder, LevelConfig::default());

    let probes = ctx.level().unwrap().lighting().probes();
    // The solid leaf doesn't get one
    assert_eq!(probes.len(), 2);
    assert_eq!(probes.get(0).unwrap().position, Vector3::new(-16.0, 0.0, 0.0));

    let sample = ctx.get_lighting(&in_room_b(), None);
    assert_eq!(sample.ambient.faces[2], green());
}

#[test]
fn hidden_lights_are_skipped() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), false);
    builder.entities(&entities(&[LIGHT_IN_A, LIGHT_IN_B]));
    let ctx = load(&builder, LevelConfig::default());

    let lights = ctx.level().unwrap().lighting().lights();
    assert_eq!(lights.len(), 2);
    assert_eq!((lights[0].leaf, lights[0].cluster), (1, 1));
    assert_eq!((lights[1].leaf, lights[1].cluster), (2, 2));

    let sample = ctx.get_lighting(&Vector3::new(-8.0, 0.0, 0.0), None);
    assert_eq!(sample.lights.len(), 1);
    assert_eq!(sample.lights[0].light, 0);
    assert!(sample.lights[0].direction.x < 0.0);
}

#[test]
fn lights_are_ranked_and_capped() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.entities(&entities(&[LIGHT_IN_B, LIGHT_IN_A]));

    let ctx = load(&builder, LevelConfig::default());
    let sample = ctx.get_lighting(&Vector3::new(-8.0, 0.0, 0.0), None);
    assert_eq!(
        sample.lights.iter().map(|l| l.light).collect::<Vec<_>>(),
        vec![1, 0]
    );
    assert!(sample.lights[0].weight > sample.lights[1].weight);

    let config = LevelConfigBuilder::default().max_lights(1).build().unwrap();
    let ctx = load(&builder, config);
    let sample = ctx.get_lighting(&Vector3::new(-8.0, 0.0, 0.0), None);
    assert_eq!(sample.lights.len(), 1);
    assert_eq!(sample.lights[0].light, 1);
}

#[test]
fn weak_lights_are_dropped() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.entities(&entities(&[LIGHT_IN_A]));
    let config = LevelConfigBuilder::default()
        .min_light_contribution(1000.0)
        .build()
        .unwrap();
    let ctx = load(&builder, config);

    assert!(ctx.get_lighting(&in_room_b(), None).lights.is_empty());
}

#[test]
fn sun_needs_sky() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::SKY, true);
    builder.entities(&entities(&[SUN]));
    let ctx = load(&builder, LevelConfig::default());

    let light = &ctx.level().unwrap().lighting().lights()[0];
    assert_eq!(light.kind, LightKind::Sun);

    assert!(ctx.get_lighting(&in_room_a(), None).lights.is_empty());

    let sample = ctx.get_lighting(&in_room_b(), None);
    assert_eq!(sample.lights.len(), 1);
    // Pointing down, so light arrives from above
    assert!(sample.lights[0].direction.z > 0.99);
}

#[test]
fn dark_lights_can_be_switched_on() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.entities(&entities(&[DARK_LIGHT_IN_A]));
    let ctx = load(&builder, LevelConfig::default());

    assert!(ctx.get_lighting(&in_room_a(), None).lights.is_empty());
    ctx.set_light_enabled(0, true).unwrap();
    assert_eq!(ctx.get_lighting(&in_room_a(), None).lights.len(), 1);
    ctx.set_light_enabled(0, false).unwrap();
    assert!(ctx.get_lighting(&in_room_a(), None).lights.is_empty());
}

#[test]
fn leaf_hint_is_used_when_valid() {
    let ctx = load(&two_room_map(), LevelConfig::default());

    assert_eq!(ctx.get_lighting(&in_room_a(), Some(2)).leaf, 2);
    assert_eq!(ctx.get_lighting(&in_room_a(), Some(99)).leaf, 1);
}

#[test]
fn sequence_increases() {
    let ctx = load(&two_room_map(), LevelConfig::default());

    let first = ctx.get_lighting(&in_room_a(), None).sequence;
    let second = ctx.get_lighting(&in_room_a(), None).sequence;
    let third = ctx.get_lighting(&in_room_b(), None).sequence;
    assert!(first < second && second < third);
}

#[test]
fn object_lighting_is_cached_until_something_changes() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), true);
    builder.entities(&entities(&[LIGHT_IN_A]));
    let ctx = load(&builder, LevelConfig::default());

    let first = ctx.get_object_lighting(7, &in_room_a(), None);
    let again = ctx.get_object_lighting(7, &(in_room_a() + Vector3::new(1.0, 0.0, 0.0)), None);
    assert!(Arc::ptr_eq(&first, &again));

    // Changing leaf
    let moved = ctx.get_object_lighting(7, &in_room_b(), None);
    assert!(!Arc::ptr_eq(&first, &moved));
    assert_eq!(moved.leaf, 2);

    // World lighting changing
    ctx.notify_lighting_changed();
    let refreshed = ctx.get_object_lighting(7, &in_room_b(), None);
    assert!(refreshed.sequence > moved.sequence);

    // A light switching
    ctx.set_light_enabled(0, false).unwrap();
    let dark = ctx.get_object_lighting(7, &in_room_b(), None);
    assert!(dark.sequence > refreshed.sequence);
    assert!(dark.lights.is_empty());

    // Setting a light to what it already is changes nothing
    ctx.set_light_enabled(0, false).unwrap();
    assert!(Arc::ptr_eq(&dark, &ctx.get_object_lighting(7, &in_room_b(), None)));
}

#[test]
fn cache_entries_age_out() {
    let ctx = load(&two_room_map(), LevelConfig::default());
    let lighting = ctx.level().unwrap().lighting();
    let now = Instant::now();

    assert_eq!(lighting.cache_state(1, 1, now), CacheState::Uninitialized);
    ctx.get_object_lighting(1, &in_room_a(), None);
    ctx.get_object_lighting(2, &in_room_b(), None);

    let now = Instant::now();
    assert_eq!(lighting.cache_state(1, 1, now), CacheState::Valid);
    assert_eq!(lighting.cache_state(1, 2, now), CacheState::Stale);
    assert_eq!(
        lighting.cache_state(1, 1, now + Duration::from_secs(60)),
        CacheState::Stale
    );

    ctx.forget_object(1);
    assert_eq!(lighting.cache_state(1, 1, now), CacheState::Uninitialized);

    assert_eq!(lighting.collect_garbage(now + Duration::from_secs(60)), 1);
    assert!(lighting.cache().is_empty());
}

#[test]
fn cache_evicts_least_recently_used() {
    let config = LevelConfigBuilder::default()
        .cache_capacity(2)
        .build()
        .unwrap();
    let ctx = load(&two_room_map(), config);
    let level = ctx.level().unwrap();
    let lighting = level.lighting();

    let start = Instant::now();
    let at = |ms| start + Duration::from_millis(ms);
    for (handle, ms) in [(1, 0), (2, 10), (1, 20), (3, 30)] {
        lighting.sample_cached(level.map(), handle, &in_room_a(), 1, at(ms));
    }

    assert_eq!(lighting.cache().len(), 2);
    assert_eq!(lighting.cache_state(1, 1, at(40)), CacheState::Valid);
    assert_eq!(lighting.cache_state(2, 1, at(40)), CacheState::Uninitialized);
    assert_eq!(lighting.cache_state(3, 1, at(40)), CacheState::Valid);
}
