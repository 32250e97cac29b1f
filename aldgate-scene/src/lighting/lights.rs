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

//! Lights read from level entities, and how much they contribute at a point

use aldgate_levels::coords::{source_to_world, SOURCE_UNITS_PER_WORLD_UNIT};
use aldgate_levels::traits::entities::Entity;
use aldgate_levels::traits::visdata::ClusterId;
use aldgate_types::Vector3;

/// Distance, in source units, at which a light shines at its nominal brightness.
const NOMINAL_DISTANCE: f32 = 100.0;

/// `spawnflags` bit for lights that start switched off.
const INITIALLY_DARK: u32 = 1;

/// Falloff is clamped to what it is one source unit away.
const MIN_FALLOFF_DISTANCE: f32 = 1.0 / SOURCE_UNITS_PER_WORLD_UNIT;

const DEFAULT_INNER_CONE: f32 = 30.0;
const DEFAULT_OUTER_CONE: f32 = 45.0;
const DEFAULT_CONE_EXPONENT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Infinitely far away, seen wherever the sky is.
    Sun,
    Point,

    /// A point light with a physical radius.
    Sphere { radius: f32 },

    /// Cone angles are stored as cosines of the half angle.
    Spot {
        inner_cos: f32,
        outer_cos: f32,
        exponent: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vector3,

    /// Unit vector the light points along. Unused by point and sphere lights.
    pub direction: Vector3,

    /// Linear colour at the nominal distance
    pub color: Vector3,

    /// Constant, linear and quadratic falloff coefficients, for distances in world units.
    pub attenuation: [f32; 3],

    /// Leaf containing `position`
    pub leaf: u32,
    pub cluster: ClusterId,
    pub initially_enabled: bool,
}

/// A light picked for a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightContribution {
    /// Index into the level's lights
    pub light: usize,

    /// Colour arriving at the sample
    pub color: Vector3,

    /// Unit vector from the sample towards the light
    pub direction: Vector3,

    /// Luminance of `color`, used for ranking
    pub weight: f32,
}

/// Rec. 709 luminance
pub fn luminance(color: &Vector3) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

/// Forward vector from pitch and yaw in degrees, z up.
fn forward(pitch: f32, yaw: f32) -> Vector3 {
    let (pitch, yaw) = (pitch.to_radians(), yaw.to_radians());
    Vector3::new(
        pitch.cos() * yaw.cos(),
        pitch.cos() * yaw.sin(),
        -pitch.sin(),
    )
}

impl Light {
    /// Read a light from an entity. Returns `None` for other entities.
    ///
    /// Positions and falloff are converted to world units. The leaf and cluster are left
    /// at 0 for the caller to fill in.
    pub fn from_entity(entity: &Entity) -> Option<Light> {
        let classname = entity.classname()?;
        if !matches!(classname, "light" | "light_spot" | "light_environment") {
            return None;
        }

        // "r g b brightness", brightness defaulting to full
        let color = match entity.get_floats("_light").as_deref() {
            Some([r, g, b, brightness, ..]) => Vector3::new(*r, *g, *b) / 255.0 * (*brightness / 255.0),
            Some([r, g, b]) => Vector3::new(*r, *g, *b) / 255.0,
            _ => Vector3::repeat(1.0),
        };

        let angles = entity.get_vector("angles").unwrap_or_else(Vector3::zeros);
        let pitch = entity.get_f32("pitch").unwrap_or(angles.x);
        let direction = forward(pitch, angles.y);

        let position = source_to_world(entity.get_vector("origin").unwrap_or_else(Vector3::zeros));

        let kind = match classname {
            "light_environment" => LightKind::Sun,
            "light_spot" => {
                let inner = entity.get_f32("_inner_cone").unwrap_or(DEFAULT_INNER_CONE);
                let outer = entity.get_f32("_cone").unwrap_or(DEFAULT_OUTER_CONE).max(inner);
                LightKind::Spot {
                    inner_cos: inner.to_radians().cos(),
                    outer_cos: outer.to_radians().cos(),
                    exponent: entity
                        .get_f32("_exponent")
                        .unwrap_or(DEFAULT_CONE_EXPONENT),
                }
            }
            _ => match entity.get_f32("_radius") {
                Some(radius) if radius > 0.0 => LightKind::Sphere {
                    radius: radius / SOURCE_UNITS_PER_WORLD_UNIT,
                },
                _ => LightKind::Point,
            },
        };

        let mut attenuation = [
            entity.get_f32("_constant_attn").unwrap_or(0.0),
            entity.get_f32("_linear_attn").unwrap_or(0.0),
            entity.get_f32("_quadratic_attn").unwrap_or(0.0),
        ];
        if attenuation.iter().all(|&c| c == 0.0) {
            attenuation[2] = 1.0;
        }

        // Brightness is given at the nominal distance
        let nominal = attenuation[0]
            + attenuation[1] * NOMINAL_DISTANCE
            + attenuation[2] * NOMINAL_DISTANCE * NOMINAL_DISTANCE;
        let color = if kind != LightKind::Sun && nominal > 0.0 {
            color * nominal
        } else {
            color
        };

        // Coefficients for distances in world units
        attenuation[1] *= SOURCE_UNITS_PER_WORLD_UNIT;
        attenuation[2] *= SOURCE_UNITS_PER_WORLD_UNIT * SOURCE_UNITS_PER_WORLD_UNIT;

        let spawnflags = entity
            .get("spawnflags")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Some(Light {
            kind,
            position,
            direction,
            color,
            attenuation,
            leaf: 0,
            cluster: 0,
            initially_enabled: spawnflags & INITIALLY_DARK == 0,
        })
    }

    /// Fraction of the light's colour arriving at `point`, from distance falloff and spot cones.
    pub fn intensity_at(&self, point: &Vector3) -> f32 {
        if self.kind == LightKind::Sun {
            return 1.0;
        }

        let to_point = point - self.position;
        let dist = to_point.norm();
        let falloff_dist = match self.kind {
            LightKind::Sphere { radius } => dist - radius,
            _ => dist,
        }
        .max(MIN_FALLOFF_DISTANCE);

        let [constant, linear, quadratic] = self.attenuation;
        let denominator = constant + linear * falloff_dist + quadratic * falloff_dist * falloff_dist;
        let falloff = if denominator > f32::EPSILON {
            1.0 / denominator
        } else {
            1.0 / f32::EPSILON
        };

        let cone = match self.kind {
            LightKind::Spot {
                inner_cos,
                outer_cos,
                exponent,
            } if dist > 0.0 => {
                let cos = self.direction.dot(&(to_point / dist));
                if cos >= inner_cos {
                    1.0
                } else if cos <= outer_cos {
                    0.0
                } else {
                    ((cos - outer_cos) / (inner_cos - outer_cos)).powf(exponent)
                }
            }
            _ => 1.0,
        };

        falloff * cone
    }

    /// What this light adds at `point`.
    pub fn contribution(&self, index: usize, point: &Vector3) -> LightContribution {
        let color = self.color * self.intensity_at(point);
        let direction = match self.kind {
            LightKind::Sun => -self.direction,
            _ => (self.position - point)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros),
        };

        LightContribution {
            light: index,
            color,
            direction,
            weight: luminance(&color),
        }
    }
}
