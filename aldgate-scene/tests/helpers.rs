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

#![allow(dead_code)]

use aldgate_levels::testing::{LeafSpec, MapBuilder};
use aldgate_levels::traits::tree::{LeafFlags, NodeRef};
use aldgate_scene::{LevelConfig, LevelContext};
use aldgate_types::Vector3;

/// Somewhere in room A (leaf 1, cluster 1), in world units.
pub fn in_room_a() -> Vector3 {
    Vector3::new(-16.0, 0.0, 0.0)
}

/// Somewhere in room B (leaf 2, cluster 2), in world units.
pub fn in_room_b() -> Vector3 {
    Vector3::new(16.0, 0.0, 0.0)
}

/// Room A, x < 0, as written to disk.
pub fn room_a() -> LeafSpec {
    LeafSpec {
        cluster: 0,
        mins: [-512, -256, -256],
        maxs: [0, 256, 256],
        faces: vec![0],
        ..LeafSpec::default()
    }
}

/// Room B, x > 0, as written to disk.
pub fn room_b() -> LeafSpec {
    LeafSpec {
        cluster: 1,
        mins: [0, -256, -256],
        maxs: [512, 256, 256],
        faces: vec![1],
        ..LeafSpec::default()
    }
}

/// Two rooms either side of x = 0, like `two_room_map`, but with leaf flags and
/// visibility between them chosen by the test.
pub fn rooms(flags_a: LeafFlags, flags_b: LeafFlags, see_each_other: bool) -> MapBuilder {
    rooms_from(
        LeafSpec {
            flags: flags_a.bits(),
            ..room_a()
        },
        LeafSpec {
            flags: flags_b.bits(),
            ..room_b()
        },
        see_each_other,
    )
}

/// Two rooms split by the plane x = 0, leaf 0 being solid.
pub fn rooms_from(a: LeafSpec, b: LeafSpec, see_each_other: bool) -> MapBuilder {
    let mut builder = MapBuilder::new();
    builder
        .entities(WORLDSPAWN)
        .plane([1.0, 0.0, 0.0], 0.0)
        .face(0, 1.0)
        .face(0, 1.0)
        .leaf(LeafSpec {
            contents: 1,
            ..LeafSpec::default()
        })
        .leaf(a)
        .leaf(b)
        .node(
            0,
            NodeRef::Leaf(2),
            NodeRef::Leaf(1),
            [-512, -256, -256],
            [512, 256, 256],
        )
        .model([-512.0, -256.0, -256.0], [512.0, 256.0, 256.0], 0)
        .vis(vec![
            Some(vec![true, see_each_other]),
            Some(vec![see_each_other, true]),
        ]);

    builder
}

pub const WORLDSPAWN: &str = "{\n\"classname\" \"worldspawn\"\n}\n";

pub fn load(builder: &MapBuilder, config: LevelConfig) -> LevelContext {
    let mut ctx = LevelContext::new(config);
    ctx.load(&builder.build()).unwrap();
    ctx
}
