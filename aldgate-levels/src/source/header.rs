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

//! The header found at the start of a VBSP file, and the lump directory in it.

use crate::helpers::slice_to_i32;
use crate::types::{ParseError, Result};

const MAGIC_HEADER: &[u8] = b"VBSP";
pub const HEADER_LUMPS: usize = 64;
const DIR_ENTRY_LEN: usize = 4 * 4;
pub const HEADER_LEN: usize = 4 + 4 + (HEADER_LUMPS * DIR_ENTRY_LEN) + 4;

/// File versions this reader understands.
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<i32> = 19..=21;

/// The lumps this crate decodes, by directory index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lump {
    Entities = 0,
    Planes = 1,
    Visibility = 4,
    Nodes = 5,
    Faces = 7,
    Leafs = 10,
    Models = 14,
    LeafFaces = 16,
    LeafBrushes = 17,
    Brushes = 18,
    LeafAmbientIndexHdr = 51,
    LeafAmbientIndex = 52,
    LeafAmbientLightingHdr = 55,
    LeafAmbientLighting = 56,
}

impl Lump {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The header found at the start of a bsp file
#[derive(Clone, Copy, Debug)]
pub struct Header {
    pub version: i32,
    pub dir_entries: [DirEntry; HEADER_LUMPS],
    pub map_revision: i32,
}

/// A directory entry, pointing to a lump in the file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirEntry {
    /// Offset from beginning of file to start of lump
    pub offset: i32,

    /// Length of lump in bytes
    pub length: i32,

    /// Format version of the lump's records
    pub version: i32,

    /// Lump identifier, usually zeroes
    pub four_cc: [u8; 4],
}

impl Header {
    /// Deserialise from buffer.
    /// # Format
    /// string[4] magic             Magic number. Always "VBSP".
    /// int version                 Version number, 19-21 for supported files.
    /// direntry[64] direntries     Lump directory, sixty-four entries.
    /// int map_revision            Incremented each time the map is compiled.
    pub fn from(v: &[u8]) -> Result<Header> {
        if v.len() < HEADER_LEN || &v[0..4] != MAGIC_HEADER {
            return Err(ParseError::MalformedFile);
        }

        let version = slice_to_i32(&v[4..8]);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ParseError::UnsupportedVersion {
                what: "file",
                found: version,
            });
        }

        let entries = &v[8..8 + HEADER_LUMPS * DIR_ENTRY_LEN];
        let mut dir_entries = [DirEntry::default(); HEADER_LUMPS];
        for (n, entry) in dir_entries.iter_mut().enumerate() {
            let base = &entries[n * DIR_ENTRY_LEN..(n + 1) * DIR_ENTRY_LEN];
            *entry = DirEntry {
                offset: slice_to_i32(&base[0..4]),
                length: slice_to_i32(&base[4..8]),
                version: slice_to_i32(&base[8..12]),
                four_cc: [base[12], base[13], base[14], base[15]],
            };
        }

        let map_revision = slice_to_i32(&v[HEADER_LEN - 4..HEADER_LEN]);

        Ok(Header {
            version,
            dir_entries,
            map_revision,
        })
    }

    /// Get the given lump from the buffer, with offset & length based on this directory.
    pub fn get_lump<'l>(&self, buf: &'l [u8], lump: Lump) -> Result<&'l [u8]> {
        let entry = self.dir_entries[lump.index()];
        if entry.length == 0 {
            return Ok(&[]);
        }

        let start = entry.offset as i64;
        let length = entry.length as i64;
        if start < 0 || length < 0 || start + length > buf.len() as i64 {
            return Err(ParseError::TruncatedLump {
                lump,
                start,
                length,
                file_len: buf.len(),
            });
        }

        Ok(&buf[start as usize..(start + length) as usize])
    }

    pub fn lump_version(&self, lump: Lump) -> i32 {
        self.dir_entries[lump.index()].version
    }

    /// Fail unless the lump's records are in one of the given versions.
    /// Empty lumps are always accepted.
    pub fn expect_version(&self, lump: Lump, supported: &[i32]) -> Result<i32> {
        let entry = self.dir_entries[lump.index()];
        if entry.length == 0 || supported.contains(&entry.version) {
            Ok(entry.version)
        } else {
            Err(ParseError::UnsupportedVersion {
                what: lump_name(lump),
                found: entry.version,
            })
        }
    }
}

fn lump_name(lump: Lump) -> &'static str {
    match lump {
        Lump::Entities => "entities lump",
        Lump::Planes => "planes lump",
        Lump::Visibility => "visibility lump",
        Lump::Nodes => "nodes lump",
        Lump::Faces => "faces lump",
        Lump::Leafs => "leafs lump",
        Lump::Models => "models lump",
        Lump::LeafFaces => "leaf faces lump",
        Lump::LeafBrushes => "leaf brushes lump",
        Lump::Brushes => "brushes lump",
        Lump::LeafAmbientIndexHdr | Lump::LeafAmbientIndex => "leaf ambient index lump",
        Lump::LeafAmbientLightingHdr | Lump::LeafAmbientLighting => "leaf ambient lighting lump",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_header(version: i32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[0..4].copy_from_slice(MAGIC_HEADER);
        data[4..8].copy_from_slice(&version.to_le_bytes());
        data
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = blank_header(20);
        data[0..4].copy_from_slice(b"IBSP");
        assert_eq!(Header::from(&data).unwrap_err(), ParseError::MalformedFile);
    }

    #[test]
    fn rejects_short_buffer() {
        let data = blank_header(20);
        assert_eq!(
            Header::from(&data[..HEADER_LEN - 1]).unwrap_err(),
            ParseError::MalformedFile
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let data = blank_header(29);
        assert_eq!(
            Header::from(&data).unwrap_err(),
            ParseError::UnsupportedVersion {
                what: "file",
                found: 29
            }
        );
    }

    #[test]
    fn reads_directory() {
        let mut data = blank_header(20);
        let base = 8 + Lump::Planes.index() * DIR_ENTRY_LEN;
        data[base..base + 4].copy_from_slice(&(HEADER_LEN as i32).to_le_bytes());
        data[base + 4..base + 8].copy_from_slice(&8i32.to_le_bytes());
        data[HEADER_LEN - 4..].copy_from_slice(&7i32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let header = Header::from(&data).unwrap();
        assert_eq!(header.map_revision, 7);
        assert_eq!(
            header.get_lump(&data, Lump::Planes).unwrap(),
            &[1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert!(header.get_lump(&data, Lump::Nodes).unwrap().is_empty());

        data.truncate(HEADER_LEN + 4);
        assert!(matches!(
            header.get_lump(&data, Lump::Planes),
            Err(ParseError::TruncatedLump {
                lump: Lump::Planes,
                ..
            })
        ));
    }
}
