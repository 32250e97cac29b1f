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

//! Various types used in parsed BSP files.

use aldgate_types::Vector3;
use thiserror::Error;

use crate::source::Lump;

/// An RGB colour with a shared power-of-two exponent, as stored in light cubes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRgbExp32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub exponent: i8,
}

impl ColorRgbExp32 {
    /// Interpret the given bytes as a colour.
    pub fn from_bytes(bytes: [u8; 4]) -> ColorRgbExp32 {
        ColorRgbExp32 {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            exponent: bytes[3] as i8,
        }
    }

    /// Convert a slice to a colour
    /// # Panics
    /// If slice is shorter than 4 bytes.
    pub fn from_slice(slice: &[u8]) -> ColorRgbExp32 {
        ColorRgbExp32::from_bytes([slice[0], slice[1], slice[2], slice[3]])
    }

    /// Linear colour, where 1.0 is full intensity.
    pub fn to_linear(self) -> Vector3 {
        Vector3::new(self.r as f32, self.g as f32, self.b as f32) * 2f32.powi(self.exponent as i32)
            / 255.0
    }
}

/// An error encountered while parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Not a VBSP file")]
    MalformedFile,

    #[error("Lump {lump:?} ({start} + {length} bytes) runs past the end of the file ({file_len} bytes)")]
    TruncatedLump {
        lump: Lump,
        start: i64,
        length: i64,
        file_len: usize,
    },

    #[error("Unsupported {what} version {found}")]
    UnsupportedVersion { what: &'static str, found: i32 },

    #[error("Invalid {0}")]
    Invalid(&'static str),
}

/// Standard result type.
pub type Result<T> = std::result::Result<T, ParseError>;
