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

//! Decompression of and queries against the potentially visible set.

use bitvec::prelude::*;
use log::debug;

use crate::source::VisLump;
use crate::traits::visdata::*;

/// One decompressed row. Bit `c - 1` is set when cluster `c` is visible.
pub type Bitset = BitBox<u8, Lsb0>;

/// Which of the two row tables in the vis lump to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisKind {
    /// Potentially visible set
    Pvs,

    /// Potentially hearable set
    Phs,
}

/// Bytes in one uncompressed row.
pub fn row_len(cluster_count: usize) -> usize {
    (cluster_count + 7) / 8
}

fn row_is_present(raw: &[u8], offset: i32) -> bool {
    offset >= 0 && (offset as usize) < raw.len()
}

/// Decode a single row starting at `raw[0]`.
/// A zero byte is followed by a count of zero bytes; anything else is a literal.
/// Rows that end early are padded with zeroes.
pub fn decompress_row(cluster_count: usize, raw: &[u8]) -> Bitset {
    let len = row_len(cluster_count);
    let mut bytes = Vec::with_capacity(len);

    let mut i = 0;
    while bytes.len() < len && i < raw.len() {
        let byte = raw[i];
        i += 1;

        if byte == 0 {
            let run = raw.get(i).copied().unwrap_or(0) as usize;
            i += 1;
            let run = run.min(len - bytes.len());
            bytes.resize(bytes.len() + run, 0);
        } else {
            bytes.push(byte);
        }
    }
    bytes.resize(len, 0);

    let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
    bits.truncate(cluster_count);
    bits.into_boxed_bitslice()
}

/// Encode a row the way the map compiler does. Zero runs longer than 255 bytes are split.
pub fn compress_row(row: &BitSlice<u8, Lsb0>) -> Vec<u8> {
    let mut bytes = vec![0u8; row_len(row.len())];
    for idx in row.iter_ones() {
        bytes[idx >> 3] |= 1 << (idx & 7);
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != 0 {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let mut run = 0u8;
        while i < bytes.len() && bytes[i] == 0 && run < u8::MAX {
            run += 1;
            i += 1;
        }
        out.push(0);
        out.push(run);
    }

    out
}

/// Decompress one row per cluster. `offsets` are relative to the start of `raw`.
/// Clusters with a negative or out of range offset get a row with every bit set.
pub fn decompress(cluster_count: usize, raw: &[u8], offsets: &[i32]) -> Vec<Bitset> {
    (0..cluster_count)
        .map(|cluster| {
            let offset = offsets.get(cluster).copied().unwrap_or(-1);
            if row_is_present(raw, offset) {
                decompress_row(cluster_count, &raw[offset as usize..])
            } else {
                BitVec::<u8, Lsb0>::repeat(true, cluster_count).into_boxed_bitslice()
            }
        })
        .collect()
}

/// Cluster to cluster visibility, decompressed once at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityTable {
    rows: Box<[Bitset]>,
    num_clusters: u32,
    has_pvs_data: bool,
}

impl VisibilityTable {
    /// A table with no clusters. Everything is visible from everywhere.
    pub fn empty() -> VisibilityTable {
        VisibilityTable {
            rows: Box::new([]),
            num_clusters: 0,
            has_pvs_data: false,
        }
    }

    /// Build a table from raw rows. See [`decompress`].
    pub fn decompress(cluster_count: u32, raw: &[u8], offsets: &[i32]) -> VisibilityTable {
        let count = cluster_count as usize;
        let missing = (0..count)
            .filter(|&c| !row_is_present(raw, offsets.get(c).copied().unwrap_or(-1)))
            .count();

        if missing > 0 {
            debug!(
                "{} of {} clusters have no visibility row, treating them as seeing everything",
                missing, count
            );
        }

        VisibilityTable {
            rows: decompress(count, raw, offsets).into_boxed_slice(),
            num_clusters: cluster_count,
            has_pvs_data: count > 0 && missing == 0,
        }
    }

    /// Build a table from either row set of a vis lump.
    /// An empty lump gives an empty table with no PVS data.
    pub fn from_lump(lump: &VisLump, kind: VisKind) -> VisibilityTable {
        if lump.is_empty() {
            return VisibilityTable::empty();
        }

        VisibilityTable::decompress(lump.num_clusters, &lump.data, &lump.offsets(kind))
    }

    pub fn num_clusters(&self) -> u32 {
        self.num_clusters
    }

    /// False if any row had to be synthesised, or there was no data at all.
    pub fn has_pvs_data(&self) -> bool {
        self.has_pvs_data
    }

    /// The decompressed row for `cluster`, if it is in range.
    pub fn row(&self, cluster: ClusterId) -> Option<&BitSlice<u8, Lsb0>> {
        let idx = cluster.checked_sub(1)?;
        self.rows.get(idx as usize).map(|row| row.as_bitslice())
    }

    /// Whether `to` is potentially visible from `from`.
    /// The void, a cluster seen from itself, and anything out of range are always visible.
    #[inline]
    pub fn is_visible(&self, from: ClusterId, to: ClusterId) -> bool {
        if from == to || from == 0 || to == 0 {
            return true;
        }

        match self.row(from) {
            Some(row) => row.get(to as usize - 1).map_or(true, |bit| *bit),
            None => true,
        }
    }

    /// Every cluster in the table visible from `from`, in ascending order.
    pub fn visible_from(&self, from: ClusterId) -> VisibleClusters<'_> {
        self.visible_among(from, self.num_clusters)
    }

    /// Clusters `1..=last` visible from `from`. Useful when the tree uses clusters
    /// the table has no rows for, which are then always visible.
    pub fn visible_among(&self, from: ClusterId, last: ClusterId) -> VisibleClusters<'_> {
        VisibleClusters {
            table: self,
            from,
            next: 1,
            last,
        }
    }
}

impl Default for VisibilityTable {
    fn default() -> Self {
        VisibilityTable::empty()
    }
}

/// Iterator returned by [`VisibilityTable::visible_from`].
pub struct VisibleClusters<'a> {
    table: &'a VisibilityTable,
    from: ClusterId,
    next: ClusterId,
    last: ClusterId,
}

impl<'a> Iterator for VisibleClusters<'a> {
    type Item = ClusterId;

    fn next(&mut self) -> Option<ClusterId> {
        while self.next <= self.last {
            let cluster = self.next;
            self.next += 1;
            if self.table.is_visible(self.from, cluster) {
                return Some(cluster);
            }
        }

        None
    }
}

impl HasVisData for VisibilityTable {
    type VisibleIterator<'a> = VisibleClusters<'a> where Self: 'a;

    fn has_pvs_data(&self) -> bool {
        self.has_pvs_data
    }

    fn all_visible_from(&self, from: ClusterId) -> Self::VisibleIterator<'_> {
        self.visible_from(from)
    }

    fn cluster_visible_from(&self, from: ClusterId, dest: ClusterId) -> bool {
        self.is_visible(from, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A deterministic, fairly sparse pattern so that both literals and zero runs show up.
    fn pattern(len: usize, seed: usize) -> Bitset {
        let mut bits = BitVec::<u8, Lsb0>::repeat(false, len);
        for i in 0..len {
            if (i * 7 + seed) % 23 == 0 || (len > 300 && i > 280 && i % 3 == 0) {
                bits.set(i, true);
            }
        }
        bits.into_boxed_bitslice()
    }

    #[test]
    fn rle_round_trip() {
        for len in 1..=512 {
            for seed in 0..3 {
                let row = pattern(len, seed);
                let compressed = compress_row(&row);
                assert_eq!(decompress_row(len, &compressed), row, "length {}", len);
            }

            let empty = BitVec::<u8, Lsb0>::repeat(false, len).into_boxed_bitslice();
            assert_eq!(decompress_row(len, &compress_row(&empty)), empty);

            let full = BitVec::<u8, Lsb0>::repeat(true, len).into_boxed_bitslice();
            assert_eq!(decompress_row(len, &compress_row(&full)), full);
        }
    }

    #[test]
    fn long_zero_runs_are_split() {
        let row = BitVec::<u8, Lsb0>::repeat(false, 8 * 300).into_boxed_bitslice();
        assert_eq!(compress_row(&row), vec![0, 255, 0, 45]);
    }

    #[test]
    fn truncated_row_is_padded() {
        // One literal byte of a three byte row
        let row = decompress_row(20, &[0b0000_0101]);
        assert_eq!(row.len(), 20);
        assert_eq!(row.iter_ones().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn self_and_void_are_visible() {
        // Cluster 1 sees nothing, cluster 2 sees nothing
        let raw = [0u8, 1, 0, 1];
        let table = VisibilityTable::decompress(2, &raw, &[0, 2]);

        assert!(table.has_pvs_data());
        assert!(table.is_visible(1, 1));
        assert!(table.is_visible(2, 2));
        assert!(!table.is_visible(1, 2));
        assert!(!table.is_visible(2, 1));
        assert!(table.is_visible(0, 2));
        assert!(table.is_visible(1, 0));
        assert!(table.is_visible(1, 99));
        assert!(table.is_visible(99, 1));
        assert_eq!(table.visible_from(1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(table.visible_from(0).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn missing_rows_see_everything() {
        let raw = [0u8, 1];
        let table = VisibilityTable::decompress(2, &raw, &[0, -1]);

        assert!(!table.has_pvs_data());
        assert!(!table.is_visible(1, 2));
        assert!(table.is_visible(2, 1));
    }

    #[test]
    fn empty_table_has_no_data() {
        let table = VisibilityTable::from_lump(&VisLump::default(), VisKind::Pvs);
        assert!(!table.has_pvs_data());
        assert!(table.is_visible(3, 4));
    }
}
