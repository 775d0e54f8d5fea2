//! Procedural point cloud of a cylindrical cup of coffee surrounded by air.
//!
//! Points are laid out on concentric rings in horizontal layers. Ring `k`
//! of a region sits at radius `r_0 + k * s` and holds `round(2*pi*r / s)`
//! evenly spaced points, so neighboring points are about `s` apart both
//! along and across rings.
//!
//! ```text
//!   air | wall |   coffee   | wall | air
//!       |      |~~~~~~~~~~~~|      |
//!       |      |            |      |
//!       |      +------------+      |
//!       |         base             |
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::Point;
use crate::error::{HeatError, Result};
use crate::sim::materials::MaterialType;
use crate::sim::point_cloud::PointCloud;

/// Slack used when counting rings/layers so that accumulated rounding does
/// not add or drop a ring sitting exactly on a region boundary.
const COUNT_EPS: f64 = 1e-9;

/// Geometry and initial temperatures of the generated cup.
///
/// Lengths in m, temperatures in K.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CupParameters {
    pub inner_radius: f64,
    pub wall_thickness: f64,
    /// Height of the cup wall above the base.
    pub height: f64,
    /// Fill level of the coffee above the base.
    pub coffee_height: f64,
    pub point_spacing: f64,
    /// Thickness of the air shell around the outer wall.
    pub air_margin: f64,
    pub coffee_temperature: f64,
    pub cup_temperature: f64,
    pub air_temperature: f64,
}

impl Default for CupParameters {
    fn default() -> Self {
        Self {
            inner_radius: 0.035,       // 3.5 cm
            wall_thickness: 0.003,     // 3 mm
            height: 0.09,              // 9 cm
            coffee_height: 0.08,       // 8 cm
            point_spacing: 0.005,      // 5 mm
            air_margin: 0.02,          // 2 cm
            coffee_temperature: 363.15, // 90 C
            cup_temperature: 293.15,   // 20 C
            air_temperature: 293.15,   // 20 C
        }
    }
}

impl CupParameters {
    pub fn outer_radius(&self) -> f64 {
        self.inner_radius + self.wall_thickness
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("inner radius", self.inner_radius),
            ("wall thickness", self.wall_thickness),
            ("height", self.height),
            ("coffee height", self.coffee_height),
            ("point spacing", self.point_spacing),
            ("coffee temperature", self.coffee_temperature),
            ("cup temperature", self.cup_temperature),
            ("air temperature", self.air_temperature),
        ];
        for (label, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(HeatError::Configuration(format!(
                    "cup {label} must be finite and positive, got {value}"
                )));
            }
        }
        if !self.air_margin.is_finite() || self.air_margin < 0.0 {
            return Err(HeatError::Configuration(format!(
                "cup air margin must be finite and non-negative, got {}",
                self.air_margin
            )));
        }
        if self.coffee_height > self.height {
            return Err(HeatError::Configuration(format!(
                "coffee height {} exceeds cup height {}",
                self.coffee_height, self.height
            )));
        }
        Ok(())
    }
}

/// Number of multiples of `step` in `[0, length)`.
fn count_below(length: f64, step: f64) -> usize {
    (length / step - COUNT_EPS).ceil().max(0.0) as usize
}

/// Adds one ring of points at radius `r` and height `z`.
fn add_ring(
    cloud: &mut PointCloud,
    r: f64,
    z: f64,
    spacing: f64,
    temperature: f64,
    material: MaterialType,
) {
    if r <= 0.0 {
        cloud.add_point(Point::new(0.0, 0.0, z), temperature, material);
        return;
    }
    let n = ((TAU * r / spacing).round() as usize).max(1);
    for m in 0..n {
        let theta = TAU * m as f64 / n as f64;
        cloud.add_point(Point::from_cylindrical(r, theta, z), temperature, material);
    }
}

/// Generates the initial point cloud of a filled cup.
///
/// - coffee: `r < inner_radius`, `0 <= z < coffee_height`, spacing `s`
/// - cup wall: `inner_radius <= r < outer_radius`, `0 <= z < height`, plus a
///   base of `round(wall_thickness / s)` (at least one) layers below `z = 0`
///   covering `r < outer_radius`
/// - air: `outer_radius <= r < outer_radius + air_margin` from the bottom of
///   the base up to `height`
///
/// All regions share the spacing `s`, so every sample stands for the same
/// `s^3` volume that [`crate::Discretization::from_spacing`] assigns it.
pub fn generate_cup(params: &CupParameters) -> Result<PointCloud> {
    params.validate()?;
    let s = params.point_spacing;
    let outer = params.outer_radius();
    let mut cloud = PointCloud::new();

    // Coffee
    let coffee_rings = count_below(params.inner_radius, s);
    for layer in 0..count_below(params.coffee_height, s) {
        let z = layer as f64 * s;
        for k in 0..coffee_rings {
            let r = k as f64 * s;
            add_ring(&mut cloud, r, z, s, params.coffee_temperature, MaterialType::Coffee);
        }
    }

    // Wall
    let wall_rings = count_below(params.wall_thickness, s);
    for layer in 0..count_below(params.height, s) {
        let z = layer as f64 * s;
        for k in 0..wall_rings {
            let r = params.inner_radius + k as f64 * s;
            add_ring(&mut cloud, r, z, s, params.cup_temperature, MaterialType::CupMaterial);
        }
    }

    // Base
    let base_layers = ((params.wall_thickness / s).round() as usize).max(1);
    let base_rings = count_below(outer, s);
    for layer in 1..=base_layers {
        let z = -(layer as f64) * s;
        for k in 0..base_rings {
            let r = k as f64 * s;
            add_ring(&mut cloud, r, z, s, params.cup_temperature, MaterialType::CupMaterial);
        }
    }

    // Air shell
    let z_bottom = -(base_layers as f64) * s;
    let air_rings = count_below(params.air_margin, s);
    for layer in 0..count_below(params.height - z_bottom, s) {
        let z = z_bottom + layer as f64 * s;
        for k in 0..air_rings {
            let r = outer + k as f64 * s;
            add_ring(&mut cloud, r, z, s, params.air_temperature, MaterialType::Air);
        }
    }

    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::bboxes::is_point_inside_bbox;

    #[test]
    fn test_count_below() {
        assert_eq!(count_below(0.035, 0.005), 7);
        assert_eq!(count_below(0.036, 0.005), 8);
        assert_eq!(count_below(0.003, 0.005), 1);
        assert_eq!(count_below(0.0, 0.005), 0);
    }

    #[test]
    fn test_default_cup() {
        let params = CupParameters::default();
        let cloud = generate_cup(&params).unwrap();
        assert!(cloud.len() > 1000);

        let count = |m: MaterialType| cloud.materials().iter().filter(|&&x| x == m).count();
        assert!(count(MaterialType::Coffee) > 0);
        assert!(count(MaterialType::CupMaterial) > 0);
        assert!(count(MaterialType::Air) > 0);

        let outer = params.outer_radius() + params.air_margin;
        let pmin = Point::new(-outer, -outer, -params.point_spacing);
        let pmax = Point::new(outer, outer, params.height);
        for p in cloud.iter() {
            assert!(is_point_inside_bbox(p.position(), pmin, pmax), "{}", p.position());
            let r = p.position().x.hypot(p.position().y);
            let expected_t = match p.material() {
                MaterialType::Coffee => {
                    assert!(r < params.inner_radius);
                    assert!(p.position().z < params.coffee_height);
                    params.coffee_temperature
                }
                MaterialType::CupMaterial => params.cup_temperature,
                MaterialType::Air => {
                    assert!(r >= params.outer_radius() - 1e-12);
                    params.air_temperature
                }
            };
            assert_eq!(p.temperature(), expected_t);
        }
    }

    #[test]
    fn test_no_coincident_points() {
        let params = CupParameters {
            inner_radius: 0.01,
            height: 0.02,
            coffee_height: 0.015,
            air_margin: 0.01,
            ..CupParameters::default()
        };
        let mut cloud = generate_cup(&params).unwrap();
        cloud.build_index();
        for i in 0..cloud.len() {
            let close = cloud.find_neighbors_within_radius(i, 1e-6).unwrap();
            assert!(close.is_empty(), "point {i} has coincident neighbors {close:?}");
        }
    }

    #[test]
    fn test_air_on_the_same_lattice() {
        let params = CupParameters {
            inner_radius: 0.01,
            height: 0.02,
            coffee_height: 0.015,
            ..CupParameters::default()
        };
        let s = params.point_spacing;
        let mut cloud = generate_cup(&params).unwrap();
        cloud.build_index();
        let materials = cloud.materials().to_vec();
        for (i, &m) in materials.iter().enumerate() {
            if m != MaterialType::Air {
                continue;
            }
            let mut air_near = 0;
            cloud
                .for_each_neighbor(i, 1.1 * s, |j| {
                    if materials[j] == MaterialType::Air {
                        air_near += 1;
                    }
                })
                .unwrap();
            assert!(air_near > 0, "air sample {i} has no air neighbor within 1.1 s");
        }
    }

    #[test]
    fn test_center_point_once_per_layer() {
        let params = CupParameters {
            inner_radius: 0.004,
            coffee_height: 0.005,
            ..CupParameters::default()
        };
        let cloud = generate_cup(&params).unwrap();
        // One coffee layer with a single ring at r = 0
        let coffee: Vec<_> = cloud
            .iter()
            .filter(|p| p.material() == MaterialType::Coffee)
            .collect();
        assert_eq!(coffee.len(), 1);
        assert!(coffee[0].position().is_close(&Point::new(0., 0., 0.)));
    }

    #[test]
    fn test_validate() {
        let ok = CupParameters::default();
        assert!(ok.validate().is_ok());
        let bad = CupParameters {
            point_spacing: 0.0,
            ..ok
        };
        assert!(matches!(generate_cup(&bad), Err(HeatError::Configuration(_))));
        let bad = CupParameters {
            coffee_height: 0.2,
            ..ok
        };
        assert!(bad.validate().is_err());
        let bad = CupParameters {
            air_margin: -0.01,
            ..ok
        };
        assert!(bad.validate().is_err());
        let no_air = CupParameters {
            air_margin: 0.0,
            ..ok
        };
        let cloud = generate_cup(&no_air).unwrap();
        assert!(!cloud.materials().contains(&MaterialType::Air));
    }
}
