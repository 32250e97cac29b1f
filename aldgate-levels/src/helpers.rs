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


//! Helper functions for parsing

use aldgate_types::Vector3;

/// Turn a slice into a le i32, the int datatype in a bsp file.
/// # Panics
/// If slice is shorter than 4 bytes
pub fn slice_to_i32(slice: &[u8]) -> i32 {
    i32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]])
}

/// Turn a slice into a le u32, used for some bitflags.
/// # Panics
/// If slice is shorter than 4 bytes.
pub fn slice_to_u32(slice: &[u8]) -> u32 {
    u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]])
}

/// Turn a slice into a le i16, used for packed bounds.
/// # Panics
/// If slice is shorter than 2 bytes.
pub fn slice_to_i16(slice: &[u8]) -> i16 {
    i16::from_le_bytes([slice[0], slice[1]])
}

/// Turn a slice into a le u16, used for counts and indices.
/// # Panics
/// If slice is shorter than 2 bytes.
pub fn slice_to_u16(slice: &[u8]) -> u16 {
    u16::from_le_bytes([slice[0], slice[1]])
}

/// Turn a slice into a le f32, the float datatype in a bsp file.
/// # Panics
/// If slice is shorter than 4 bytes
pub fn slice_to_f32(slice: &[u8]) -> f32 {
    f32::from_bits(slice_to_u32(slice))
}

/// Turn a slice of floats into a 3D vector
/// # Panics
/// If slice is shorter than 12 bytes.
pub fn slice_to_vec3(slice: &[u8]) -> Vector3 {
    Vector3::new(
        slice_to_f32(&slice[0..4]),
        slice_to_f32(&slice[4..8]),
        slice_to_f32(&slice[8..12]),
    )
}

/// Turn a slice of i16s into a 3D vector
/// # Panics
/// If slice is shorter than 6 bytes.
pub fn slice_to_vec3s(slice: &[u8]) -> Vector3 {
    Vector3::new(
        slice_to_i16(&slice[0..2]) as f32,
        slice_to_i16(&slice[2..4]) as f32,
        slice_to_i16(&slice[4..6]) as f32,
    )
}

/// Turn a little-endian array of u16s into its values.
/// Any trailing odd byte is ignored.
pub fn slice_to_u16s(slice: &[u8]) -> Box<[u16]> {
    slice.chunks_exact(2).map(slice_to_u16).collect()
}
