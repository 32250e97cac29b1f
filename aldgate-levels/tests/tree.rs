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

use aldgate_levels::prelude::*;
use aldgate_levels::testing::{two_room_map, LeafSpec, MapBuilder};
use aldgate_levels::traits::tree::NodeRef;
use aldgate_levels::{BspFile, BspTree};
use aldgate_types::Vector3;

fn load(builder: &MapBuilder) -> BspTree {
    let file = BspFile::parse_file(&builder.build())
        .unwrap()
        .rescale_to::<WorldUnits>();
    BspTree::from_file(&file)
}

/// Four quadrants split on x = 0 then y = 0.
/// Leaf 1 is +x+y, 2 is +x-y, 3 is -x+y, 4 is -x-y.
fn quadrant_map() -> MapBuilder {
    let mut builder = MapBuilder::new();
    builder
        .plane([1.0, 0.0, 0.0], 0.0)
        .plane([0.0, 1.0, 0.0], 0.0)
        .leaf(LeafSpec {
            contents: 1,
            ..LeafSpec::default()
        });
    for cluster in 0..4 {
        builder.leaf(LeafSpec {
            cluster,
            ..LeafSpec::default()
        });
    }
    builder
        .node(0, NodeRef::Node(1), NodeRef::Node(2), [0; 3], [0; 3])
        .node(1, NodeRef::Leaf(1), NodeRef::Leaf(2), [0; 3], [0; 3])
        .node(1, NodeRef::Leaf(3), NodeRef::Leaf(4), [0; 3], [0; 3])
        .model([0.0; 3], [0.0; 3], 0);
    builder
}

#[test]
fn two_leaf_scenario() {
    let tree = load(&two_room_map());

    assert!(tree.is_active());
    assert_eq!(tree.find_leaf(&Vector3::new(-4.0, 0.0, 0.0), 0), 1);
    assert_eq!(tree.find_leaf(&Vector3::new(4.0, 3.0, -2.0), 0), 2);
    assert_eq!(tree.find_node(&Vector3::new(4.0, 3.0, -2.0), 0), 0);

    assert_eq!(tree.world_leaves(), &[1, 2]);
    assert_eq!(tree.leaves_in_cluster(1), &[1]);
    assert_eq!(tree.leaves_in_cluster(2), &[2]);
    assert!(tree.leaves_in_cluster(3).is_empty());
    assert_eq!(tree.num_clusters(), 2);
}

#[test]
fn on_plane_points_go_to_front_child() {
    let tree = load(&two_room_map());

    for _ in 0..10 {
        assert_eq!(tree.find_leaf(&Vector3::new(0.0, 1.0, 1.0), 0), 2);
    }
}

#[test]
fn non_axial_ties_go_to_front_child() {
    let mut builder = MapBuilder::new();
    builder
        .plane([0.6, 0.8, 0.0], 0.0)
        .leaf(LeafSpec {
            cluster: 0,
            ..LeafSpec::default()
        })
        .leaf(LeafSpec {
            cluster: 1,
            ..LeafSpec::default()
        })
        .node(0, NodeRef::Leaf(0), NodeRef::Leaf(1), [0; 3], [0; 3])
        .model([0.0; 3], [0.0; 3], 0);
    let tree = load(&builder);

    assert_eq!(tree.find_leaf(&Vector3::new(0.8, -0.6, 0.0), 0), 0);
    assert_eq!(tree.find_leaf(&Vector3::new(-0.8, -0.6, 0.0), 0), 1);
}

#[test]
fn points_resolve_to_their_quadrant() {
    let tree = load(&quadrant_map());

    for x in -5..=5 {
        for y in -5..=5 {
            if x == 0 || y == 0 {
                continue;
            }
            let point = Vector3::new(x as f32 * 0.75, y as f32 * 1.5, 3.0);
            let expected = match (x > 0, y > 0) {
                (true, true) => 1,
                (true, false) => 2,
                (false, true) => 3,
                (false, false) => 4,
            };

            assert_eq!(tree.find_leaf(&point, 0), expected, "{:?}", point);
        }
    }

    assert_eq!(tree.find_node(&Vector3::new(1.0, 1.0, 0.0), 0), 1);
    assert_eq!(tree.find_node(&Vector3::new(-1.0, -1.0, 0.0), 0), 2);
    assert_eq!(tree.world_leaves(), &[1, 2, 3, 4]);
    assert_eq!(tree.num_clusters(), 4);
}

#[test]
fn subtrees_can_be_walked_directly() {
    let tree = load(&quadrant_map());

    // Starting below the root ignores the x split
    assert_eq!(tree.find_leaf(&Vector3::new(5.0, -1.0, 0.0), 2), 4);
    assert_eq!(tree.find_leaf_in_model(&Vector3::new(5.0, -1.0, 0.0), 0), Some(2));
    assert_eq!(tree.find_leaf_in_model(&Vector3::new(5.0, -1.0, 0.0), 3), None);
}

#[test]
fn empty_tree_is_inactive() {
    let tree = BspTree::empty();

    assert!(!tree.is_active());
    assert_eq!(tree.find_leaf(&Vector3::new(1.0, 2.0, 3.0), 0), 0);
    assert_eq!(tree.find_node(&Vector3::new(1.0, 2.0, 3.0), 0), 0);
    assert_eq!(tree.num_clusters(), 0);
    assert!(tree.world_leaves().is_empty());
}

#[test]
fn cyclic_tree_terminates() {
    let mut builder = MapBuilder::new();
    builder
        .plane([1.0, 0.0, 0.0], 0.0)
        .leaf(LeafSpec::default())
        .node(0, NodeRef::Node(0), NodeRef::Node(0), [0; 3], [0; 3])
        .model([0.0; 3], [0.0; 3], 0);
    let tree = load(&builder);

    assert_eq!(tree.find_leaf(&Vector3::new(1.0, 0.0, 0.0), 0), 0);
    assert!(tree.world_leaves().is_empty());
}
