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

//! Ambient probes, and lookups of the nearest one to a point

use aldgate_levels::coords::CoordSystem;
use aldgate_levels::prelude::*;
use aldgate_levels::traits::ambient::AmbientCube;
use aldgate_levels::BspFile;
use aldgate_types::Vector3;

/// A point where incoming ambient light was baked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientProbe {
    pub position: Vector3,
    pub cube: AmbientCube,
    pub leaf: u32,
}

/// A static k-d tree over probe positions, stored as a permutation of probe indices.
/// The median of each slice is its root; the halves either side are its subtrees.
#[derive(Debug, Clone, Default)]
struct KdTree {
    order: Box<[u32]>,
}

impl KdTree {
    fn build(probes: &[AmbientProbe]) -> KdTree {
        let mut order: Vec<u32> = (0..probes.len() as u32).collect();
        KdTree::build_slice(probes, &mut order, 0);

        KdTree {
            order: order.into_boxed_slice(),
        }
    }

    fn build_slice(probes: &[AmbientProbe], slice: &mut [u32], depth: usize) {
        if slice.len() <= 1 {
            return;
        }

        let axis = depth % 3;
        let mid = slice.len() / 2;
        slice.select_nth_unstable_by(mid, |&a, &b| {
            probes[a as usize].position[axis].total_cmp(&probes[b as usize].position[axis])
        });

        let (left, right) = slice.split_at_mut(mid);
        KdTree::build_slice(probes, left, depth + 1);
        KdTree::build_slice(probes, &mut right[1..], depth + 1);
    }

    fn nearest(&self, probes: &[AmbientProbe], point: &Vector3) -> Option<u32> {
        let mut best = None;
        KdTree::search(probes, &self.order, 0, point, &mut best);
        best.map(|(idx, _)| idx)
    }

    fn search(
        probes: &[AmbientProbe],
        slice: &[u32],
        depth: usize,
        point: &Vector3,
        best: &mut Option<(u32, f32)>,
    ) {
        if slice.is_empty() {
            return;
        }

        let axis = depth % 3;
        let mid = slice.len() / 2;
        let idx = slice[mid];
        let position = &probes[idx as usize].position;

        let dist = (position - point).norm_squared();
        if best.map_or(true, |(_, d)| dist < d) {
            *best = Some((idx, dist));
        }

        let diff = point[axis] - position[axis];
        let (near, far) = if diff < 0.0 {
            (&slice[..mid], &slice[mid + 1..])
        } else {
            (&slice[mid + 1..], &slice[..mid])
        };

        KdTree::search(probes, near, depth + 1, point, best);
        if best.map_or(true, |(_, d)| diff * diff < d) {
            KdTree::search(probes, far, depth + 1, point, best);
        }
    }
}

/// All probes in a level, bucketed by leaf and indexed spatially.
#[derive(Debug, Clone, Default)]
pub struct ProbeIndex {
    probes: Box<[AmbientProbe]>,
    by_leaf: Box<[Box<[u32]>]>,
    tree: KdTree,
}

impl ProbeIndex {
    pub fn new(probes: Vec<AmbientProbe>, num_leaves: usize) -> ProbeIndex {
        let mut by_leaf = vec![Vec::new(); num_leaves];
        for (idx, probe) in probes.iter().enumerate() {
            if let Some(bucket) = by_leaf.get_mut(probe.leaf as usize) {
                bucket.push(idx as u32);
            }
        }

        let tree = KdTree::build(&probes);

        ProbeIndex {
            probes: probes.into_boxed_slice(),
            by_leaf: by_leaf.into_iter().map(Vec::into_boxed_slice).collect(),
            tree,
        }
    }

    /// Gather probes from a level.
    /// Uses the leaf ambient lumps if present, otherwise the light cubes of version 0 leaves.
    pub fn from_file<S: CoordSystem>(file: &BspFile<S>, prefer_hdr: bool) -> ProbeIndex {
        let leaves = file.leaves();
        let ambient = file.leaf_ambient(prefer_hdr);
        let mut probes = vec![];

        if !ambient.is_empty() {
            for (idx, leaf) in leaves.iter().enumerate() {
                let extent = leaf.maxs - leaf.mins;
                for sample in ambient.samples_for_leaf(idx as u32) {
                    let fraction = Vector3::new(
                        sample.position[0] as f32,
                        sample.position[1] as f32,
                        sample.position[2] as f32,
                    ) / 255.0;

                    probes.push(AmbientProbe {
                        position: leaf.mins + extent.component_mul(&fraction),
                        cube: sample.cube,
                        leaf: idx as u32,
                    });
                }
            }
        } else {
            for (idx, leaf) in leaves.iter().enumerate() {
                if let (Some(cube), false) = (leaf.ambient, leaf.is_solid()) {
                    probes.push(AmbientProbe {
                        position: leaf.bounds().center(),
                        cube,
                        leaf: idx as u32,
                    });
                }
            }
        }

        ProbeIndex::new(probes, leaves.len())
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn get(&self, idx: u32) -> Option<&AmbientProbe> {
        self.probes.get(idx as usize)
    }

    pub fn probes(&self) -> &[AmbientProbe] {
        &self.probes
    }

    /// Indices of the probes in `leaf`.
    pub fn in_leaf(&self, leaf: u32) -> &[u32] {
        self.by_leaf.get(leaf as usize).map_or(&[][..], |b| &b[..])
    }

    /// The closest probe in `leaf` to `point`.
    pub fn nearest_in_leaf(&self, leaf: u32, point: &Vector3) -> Option<u32> {
        self.in_leaf(leaf).iter().copied().min_by(|&a, &b| {
            let da = (self.probes[a as usize].position - point).norm_squared();
            let db = (self.probes[b as usize].position - point).norm_squared();
            da.total_cmp(&db)
        })
    }

    /// The closest probe anywhere to `point`.
    pub fn nearest(&self, point: &Vector3) -> Option<u32> {
        self.tree.nearest(&self.probes, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_at(x: f32, y: f32, z: f32, leaf: u32) -> AmbientProbe {
        AmbientProbe {
            position: Vector3::new(x, y, z),
            cube: AmbientCube::uniform(x),
            leaf,
        }
    }

    fn brute_force(probes: &[AmbientProbe], point: &Vector3) -> f32 {
        probes
            .iter()
            .map(|p| (p.position - point).norm_squared())
            .fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn kd_tree_matches_brute_force() {
        let mut probes = vec![];
        for i in 0..200u32 {
            // Scattered, deterministic positions
            let x = ((i * 37) % 101) as f32 - 50.0;
            let y = ((i * 53) % 89) as f32 - 44.0;
            let z = ((i * 11) % 23) as f32;
            probes.push(probe_at(x, y, z, i % 7));
        }
        let index = ProbeIndex::new(probes.clone(), 7);

        for i in 0..100 {
            let point = Vector3::new(
                (i * 7 % 120) as f32 - 60.0,
                (i * 13 % 100) as f32 - 50.0,
                (i % 30) as f32 - 3.0,
            );
            let found = index.nearest(&point).unwrap();
            let found_dist = (probes[found as usize].position - point).norm_squared();

            assert_eq!(found_dist, brute_force(&probes, &point));
        }
    }

    #[test]
    fn nearest_in_leaf_only_looks_in_leaf() {
        let index = ProbeIndex::new(
            vec![
                probe_at(0.0, 0.0, 0.0, 0),
                probe_at(10.0, 0.0, 0.0, 1),
                probe_at(20.0, 0.0, 0.0, 1),
            ],
            3,
        );

        assert_eq!(index.nearest_in_leaf(1, &Vector3::new(1.0, 0.0, 0.0)), Some(1));
        assert_eq!(index.nearest(&Vector3::new(1.0, 0.0, 0.0)), Some(0));
        assert_eq!(index.nearest_in_leaf(2, &Vector3::zeros()), None);
        assert_eq!(index.in_leaf(9), &[] as &[u32]);
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = ProbeIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.nearest(&Vector3::zeros()), None);
    }
}
