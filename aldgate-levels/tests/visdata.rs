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
use aldgate_levels::pvs::{VisKind, VisibilityTable};
use aldgate_levels::testing::two_room_map;
use aldgate_levels::traits::visdata::ClusterId;
use aldgate_levels::{BspFile, SpatialIndex};
use aldgate_types::Vector3;

fn index_for(data: &[u8]) -> SpatialIndex {
    let file = BspFile::parse_file(data).unwrap().rescale_to::<WorldUnits>();
    SpatialIndex::from_file(&file)
}

/// Leaves visible from `point`, the way a consumer generic over the features would find them.
fn visible_leaves<M: MinVisFeatures>(map: &M, point: Vector3) -> Vec<u32> {
    let leaf = map.find_leaf(&point, 0);
    let cluster = map.get_leaf(leaf).unwrap().vis_cluster();

    map.all_visible_from(cluster)
        .flat_map(|c| map.leaves_in_cluster(c).iter().copied())
        .collect()
}

#[test]
fn two_rooms_see_each_other() {
    let index = index_for(&two_room_map().build());

    assert!(index.has_pvs_data());
    assert!(index.cluster_visible_from(1, 2));
    assert!(index.cluster_visible_from(2, 1));
    assert_eq!(visible_leaves(&index, Vector3::new(-3.0, 0.0, 0.0)), vec![1, 2]);
}

#[test]
fn hidden_rooms_are_not_visible() {
    let data = two_room_map()
        .vis(vec![Some(vec![true, false]), Some(vec![false, true])])
        .build();
    let index = index_for(&data);

    assert!(index.has_pvs_data());
    assert!(!index.cluster_visible_from(1, 2));
    assert!(!index.cluster_visible_from(2, 1));
    assert!(index.cluster_visible_from(0, 2));
    assert!(index.cluster_visible_from(2, 0));
    assert_eq!(visible_leaves(&index, Vector3::new(-3.0, 0.0, 0.0)), vec![1]);
    assert_eq!(visible_leaves(&index, Vector3::new(3.0, 0.0, 0.0)), vec![2]);
}

#[test]
fn missing_row_marks_data_incomplete() {
    let data = two_room_map()
        .vis(vec![Some(vec![true, false]), None])
        .build();
    let index = index_for(&data);

    assert!(!index.has_pvs_data());
    assert!(!index.cluster_visible_from(1, 2));
    assert!(index.cluster_visible_from(2, 1));
}

#[test]
fn no_vis_lump_sees_everything() {
    let mut builder = two_room_map();
    builder.raw_lump(aldgate_levels::source::Lump::Visibility, 0, vec![]);
    let index = index_for(&builder.build());

    assert!(!index.has_pvs_data());
    assert!(index.cluster_visible_from(1, 2));
    assert_eq!(visible_leaves(&index, Vector3::new(-3.0, 0.0, 0.0)), vec![1, 2]);
}

#[test]
fn hearable_set_reads_second_column() {
    let data = two_room_map()
        .vis(vec![Some(vec![true, false]), Some(vec![false, true])])
        .build();
    let file = BspFile::parse_file(&data).unwrap();
    let phs = VisibilityTable::from_lump(file.vis_lump(), VisKind::Phs);

    assert_eq!(phs, VisibilityTable::from_lump(file.vis_lump(), VisKind::Pvs));
    assert!(!phs.is_visible(1, 2));
}

#[test]
fn many_clusters_survive_the_file() {
    const CLUSTERS: usize = 300;
    let sees = |from: usize, to: usize| to % (from + 1) == 0 || to == from;

    let rows: Vec<Option<Vec<bool>>> = (0..CLUSTERS)
        .map(|from| Some((0..CLUSTERS).map(|to| sees(from, to)).collect()))
        .collect();
    let data = two_room_map().vis(rows).build();
    let file = BspFile::parse_file(&data).unwrap();
    let table = VisibilityTable::from_lump(file.vis_lump(), VisKind::Pvs);

    assert_eq!(table.num_clusters(), CLUSTERS as u32);
    assert!(table.has_pvs_data());
    for from in 0..CLUSTERS {
        for to in 0..CLUSTERS {
            assert_eq!(
                table.is_visible(from as ClusterId + 1, to as ClusterId + 1),
                sees(from, to),
                "{} -> {}",
                from,
                to
            );
        }
    }
}
