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

//! A complete BSP file

// Trait implementations are stored in their own files.

use log::debug;
use std::marker::PhantomData;

use super::header::{Header, Lump};
use super::visdata::VisLump;
use super::*;
use crate::coords::*;
use crate::traits::ambient::LeafAmbient;
use crate::traits::entities::Entity;
use crate::traits::faces::Face;
use crate::traits::models::Model;
use crate::traits::planes::Plane;
use crate::traits::tree::{Leaf, Node};
use crate::types::{ParseError, Result};

const BRUSH_SIZE: usize = 12;

/// A parsed Source BSP file, with lengths in the coordinate system `S`.
#[derive(Debug, Clone)]
pub struct BspFile<S: CoordSystem> {
    pub(crate) header: Header,
    pub(crate) entities: Box<[Entity]>,
    pub(crate) planes: Box<[Plane]>,
    pub(crate) nodes: Box<[Node]>,
    pub(crate) leaves: Box<[Leaf]>,
    pub(crate) models: Box<[Model]>,
    pub(crate) faces: Box<[Face]>,
    pub(crate) brush_count: u32,
    pub(crate) vis: VisLump,
    pub(crate) ambient_ldr: LeafAmbient,
    pub(crate) ambient_hdr: LeafAmbient,
    _phantom: PhantomData<S>,
}

impl BspFile<SourceUnits> {
    /// Parse `data` as a VBSP file.
    pub fn parse_file(data: &[u8]) -> Result<BspFile<SourceUnits>> {
        let header = Header::from(data)?;

        for lump in [
            Lump::Planes,
            Lump::Nodes,
            Lump::Models,
            Lump::Faces,
            Lump::Visibility,
        ] {
            header.expect_version(lump, &[0])?;
        }
        header.expect_version(Lump::LeafAmbientLighting, &[0, 1])?;
        header.expect_version(Lump::LeafAmbientLightingHdr, &[0, 1])?;
        let leaf_version = header.expect_version(Lump::Leafs, &[0, 1])?;

        let entities = entities::from_data(header.get_lump(data, Lump::Entities)?)?;
        let planes = planes::from_data(header.get_lump(data, Lump::Planes)?)?;

        let brushes = header.get_lump(data, Lump::Brushes)?;
        if brushes.len() % BRUSH_SIZE != 0 {
            return Err(ParseError::Invalid("brushes lump size"));
        }
        let brush_count = (brushes.len() / BRUSH_SIZE) as u32;

        let faces = faces::from_data(header.get_lump(data, Lump::Faces)?, planes.len() as u32)?;

        let leaves = tree::leaves_from_data(
            header.get_lump(data, Lump::Leafs)?,
            leaf_version,
            header.get_lump(data, Lump::LeafFaces)?,
            header.get_lump(data, Lump::LeafBrushes)?,
            faces.len() as u32,
            brush_count,
        )?;

        let nodes = tree::nodes_from_data(
            header.get_lump(data, Lump::Nodes)?,
            planes.len() as u32,
            leaves.len() as u32,
            faces.len() as u32,
        )?;

        let models = models::from_data(
            header.get_lump(data, Lump::Models)?,
            nodes.len() as u32,
            faces.len() as u32,
        )?;

        let vis = visdata::from_data(header.get_lump(data, Lump::Visibility)?)?;

        let ambient_ldr = ambient::from_data(
            header.get_lump(data, Lump::LeafAmbientIndex)?,
            header.get_lump(data, Lump::LeafAmbientLighting)?,
        )?;
        let ambient_hdr = ambient::from_data(
            header.get_lump(data, Lump::LeafAmbientIndexHdr)?,
            header.get_lump(data, Lump::LeafAmbientLightingHdr)?,
        )?;

        debug!(
            "Parsed VBSP v{} (revision {}): {} planes, {} nodes, {} leaves, {} models, {} faces, {} clusters",
            header.version,
            header.map_revision,
            planes.len(),
            nodes.len(),
            leaves.len(),
            models.len(),
            faces.len(),
            vis.num_clusters
        );

        Ok(BspFile {
            header,
            entities,
            planes,
            nodes,
            leaves,
            models,
            faces,
            brush_count,
            vis,
            ambient_ldr,
            ambient_hdr,
            _phantom: PhantomData,
        })
    }
}

impl<S: CoordSystem> BspFile<S> {
    /// Convert every length in the file to the coordinate system `D`.
    /// Directions, colours and the leaf-relative positions of ambient samples are unaffected.
    pub fn rescale_to<D: CoordSystem>(mut self) -> BspFile<D>
    where
        Rescaler: RescaleFromTo<S, D>,
    {
        let rescale = <Rescaler as RescaleFromTo<S, D>>::rescale;
        let rescale_length = <Rescaler as RescaleFromTo<S, D>>::rescale_length;
        let factor = <Rescaler as RescaleFromTo<S, D>>::factor();

        for plane in self.planes.iter_mut() {
            rescale_length(&mut plane.dist);
        }

        for node in self.nodes.iter_mut() {
            rescale(&mut node.mins);
            rescale(&mut node.maxs);
        }

        for leaf in self.leaves.iter_mut() {
            rescale(&mut leaf.mins);
            rescale(&mut leaf.maxs);
        }

        for model in self.models.iter_mut() {
            rescale(&mut model.mins);
            rescale(&mut model.maxs);
            rescale(&mut model.origin);
        }

        for face in self.faces.iter_mut() {
            face.area *= factor * factor;
        }

        BspFile {
            header: self.header,
            entities: self.entities,
            planes: self.planes,
            nodes: self.nodes,
            leaves: self.leaves,
            models: self.models,
            faces: self.faces,
            brush_count: self.brush_count,
            vis: self.vis,
            ambient_ldr: self.ambient_ldr,
            ambient_hdr: self.ambient_hdr,
            _phantom: PhantomData,
        }
    }

    pub fn version(&self) -> i32 {
        self.header.version
    }

    pub fn map_revision(&self) -> i32 {
        self.header.map_revision
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn brush_count(&self) -> u32 {
        self.brush_count
    }

    pub fn vis_lump(&self) -> &VisLump {
        &self.vis
    }
}
