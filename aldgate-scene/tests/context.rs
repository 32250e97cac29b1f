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

use aldgate_levels::source::Lump;
use aldgate_levels::testing::two_room_map;
use aldgate_levels::traits::tree::LeafFlags;
use aldgate_levels::types::ParseError;
use aldgate_scene::error::{full_error_display, LevelError};
use aldgate_scene::{LevelConfig, LevelContext};
use aldgate_types::{Aabb, Vector3};

use helpers::*;

fn level_error(err: &anyhow::Error) -> &LevelError {
    err.downcast_ref::<LevelError>().expect("not a level error")
}

#[test]
fn no_level_gives_defaults() {
    let ctx = LevelContext::default();

    assert!(ctx.level().is_none());
    assert_eq!(ctx.leaf_cluster(1), 0);
    assert_eq!(ctx.collect_garbage(), 0);

    let sample = ctx.get_lighting(&in_room_a(), None);
    assert_eq!(sample.probe, None);
    assert!(sample.lights.is_empty());
    assert_eq!(sample.ambient.faces[0], Vector3::repeat(0.5));

    let object = ctx.get_object_lighting(3, &in_room_a(), None);
    assert!(object.sequence > sample.sequence);
    ctx.forget_object(3);
    ctx.notify_lighting_changed();

    assert!(matches!(
        ctx.set_light_enabled(0, true),
        Err(LevelError::NoActiveLevel)
    ));
}

#[test]
fn loads_and_unloads() {
    let mut ctx = LevelContext::default();
    ctx.load(&two_room_map().build()).unwrap();

    let level = ctx.level().unwrap();
    assert_eq!(level.version(), 20);
    assert_eq!(level.map_revision(), 1);
    assert_eq!(level.entities().len(), 1);
    assert_eq!(level.tree().world_leaves(), &[1, 2]);
    assert_eq!(level.vis().num_clusters(), 2);
    assert_eq!(ctx.leaf_cluster(1), 1);
    assert_eq!(ctx.leaf_cluster(0), 0);

    ctx.update_visibility(&in_room_a());
    assert_eq!(ctx.visible_leaves().len(), 2);

    ctx.unload();
    assert!(!ctx.has_active_level());
    assert!(ctx.visible_leaves().is_empty());
    assert_eq!(ctx.find_leaf(&in_room_b()), 0);
}

#[test]
fn failed_load_keeps_previous_level() {
    let mut ctx = LevelContext::default();
    ctx.load(&two_room_map().build()).unwrap();
    ctx.update_visibility(&in_room_b());

    let err = ctx.load(b"IBSP this is not a level").unwrap_err();
    assert!(matches!(level_error(&err), LevelError::Parse(_)));
    assert!(full_error_display(&err).contains("caused by"));

    assert!(ctx.has_active_level());
    assert_eq!(ctx.find_leaf(&in_room_b()), 2);
    assert_eq!(ctx.visible_leaves().viewer_leaf(), Some(2));
}

#[test]
fn unsupported_version_is_rejected() {
    let mut builder = two_room_map();
    builder.version(18);

    let err = LevelContext::default().load(&builder.build()).unwrap_err();
    assert!(matches!(
        level_error(&err),
        LevelError::Parse(ParseError::UnsupportedVersion { found: 18, .. })
    ));
}

#[test]
fn level_without_world_model_is_rejected() {
    let mut builder = two_room_map();
    builder.raw_lump(Lump::Models, 0, vec![]);

    let err = LevelContext::default().load(&builder.build()).unwrap_err();
    assert!(matches!(level_error(&err), LevelError::NoWorldModel));
}

#[test]
fn load_file_reports_missing_files() {
    let mut ctx = LevelContext::default();
    let err = ctx
        .load_file("/this/level/does/not/exist.bsp")
        .unwrap_err();

    assert!(err.to_string().contains("exist.bsp"));
    assert!(!ctx.has_active_level());
}

#[test]
fn load_file_reads_levels() {
    let path = std::env::temp_dir().join(format!("aldgate-context-{}.bsp", std::process::id()));
    std::fs::write(&path, two_room_map().build()).unwrap();

    let mut ctx = LevelContext::default();
    let result = ctx.load_file(&path);
    std::fs::remove_file(&path).unwrap();

    result.unwrap();
    assert_eq!(ctx.find_leaf(&in_room_a()), 1);
}

#[test]
fn unknown_lights_are_errors() {
    let ctx = load(&two_room_map(), LevelConfig::default());

    assert!(matches!(
        ctx.set_light_enabled(0, true),
        Err(LevelError::NoSuchLight(0))
    ));
}

#[test]
fn map_without_pvs_sees_everything() {
    let mut builder = rooms(LeafFlags::empty(), LeafFlags::empty(), false);
    builder.raw_lump(Lump::Visibility, 0, vec![]);
    let ctx = load(&builder, LevelConfig::default());

    assert!(!ctx.has_visibility());
    assert!(ctx.is_cluster_visible(1, 2));

    ctx.update_visibility(&in_room_a());
    assert!(ctx.visible_leaves().contains_leaf(2));
    assert!(ctx.pvs_bounds_test(
        &Aabb::from_center(in_room_b(), Vector3::repeat(1.0)).into(),
        LeafFlags::empty()
    ));
}
