use serde::{Deserialize, Serialize};

use crate::error::{HeatError, Result};

/// Default ratio of interaction radius to point spacing.
///
/// On a cubic lattice, 2 spacings reaches face, edge, corner and second-face
/// neighbors (32 per interior point).
pub const RADIUS_FACTOR: f64 = 2.0;

/// Reference point spacing in m (5 mm).
pub const REFERENCE_SPACING: f64 = 0.005;

/// Discretization parameters of the pairwise conduction model.
///
/// A sample stands for a cube of side `s` (the point spacing): its notional
/// volume is `s^3` and the cross-section it exchanges heat through is `s^2`.
/// Samples closer than `interaction_radius` exchange heat. All three values
/// must be derived from the same spacing, otherwise the model leaks or starves
/// energy transfer; [`Discretization::from_spacing`] does this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discretization {
    /// Cutoff distance for pairwise exchange in m.
    pub interaction_radius: f64,
    /// Per-pair contact cross-section in m^2.
    pub contact_area: f64,
    /// Per-sample volume in m^3.
    pub point_volume: f64,
}

impl Discretization {
    pub fn new(interaction_radius: f64, contact_area: f64, point_volume: f64) -> Result<Self> {
        let fields = [
            ("interaction radius", interaction_radius),
            ("contact area", contact_area),
            ("point volume", point_volume),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(HeatError::Configuration(format!(
                    "{label} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(Self {
            interaction_radius,
            contact_area,
            point_volume,
        })
    }

    /// `r = RADIUS_FACTOR * s`, `A = s^2`, `V = s^3`.
    pub fn from_spacing(spacing: f64) -> Result<Self> {
        Self::from_spacing_with_radius_factor(spacing, RADIUS_FACTOR)
    }

    /// `r = radius_factor * s`, `A = s^2`, `V = s^3`.
    pub fn from_spacing_with_radius_factor(spacing: f64, radius_factor: f64) -> Result<Self> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(HeatError::Configuration(format!(
                "point spacing must be finite and positive, got {spacing}"
            )));
        }
        if !radius_factor.is_finite() || radius_factor < 1.0 {
            return Err(HeatError::Configuration(format!(
                "radius factor must be at least 1 (reach the nearest neighbor), got {radius_factor}"
            )));
        }
        Self::new(radius_factor * spacing, spacing.powi(2), spacing.powi(3))
    }

    /// 5 mm spacing: 1 cm radius, 2.5e-5 m^2 contact area, 1.25e-7 m^3 volume.
    pub fn reference() -> Self {
        Self {
            interaction_radius: RADIUS_FACTOR * REFERENCE_SPACING,
            contact_area: REFERENCE_SPACING * REFERENCE_SPACING,
            point_volume: REFERENCE_SPACING * REFERENCE_SPACING * REFERENCE_SPACING,
        }
    }
}

impl Default for Discretization {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let d = Discretization::reference();
        assert!((d.interaction_radius - 0.01).abs() < 1e-15);
        assert!((d.contact_area - 2.5e-5).abs() < 1e-18);
        assert!((d.point_volume - 1.25e-7).abs() < 1e-20);
    }

    #[test]
    fn test_from_spacing_matches_reference() {
        let d = Discretization::from_spacing(REFERENCE_SPACING).unwrap();
        let r = Discretization::reference();
        assert!((d.interaction_radius - r.interaction_radius).abs() < 1e-15);
        assert!((d.contact_area - r.contact_area).abs() < 1e-18);
        assert!((d.point_volume - r.point_volume).abs() < 1e-20);
    }

    #[test]
    fn test_invalid() {
        assert!(Discretization::new(0.0, 1.0, 1.0).is_err());
        assert!(Discretization::new(1.0, -1.0, 1.0).is_err());
        assert!(Discretization::new(1.0, 1.0, f64::INFINITY).is_err());
        assert!(Discretization::from_spacing(0.0).is_err());
        assert!(Discretization::from_spacing_with_radius_factor(0.01, 0.5).is_err());
    }
}
