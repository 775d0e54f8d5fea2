//! JSON configuration of a cup simulation run.
//!
//! Every section and field falls back to its default when missing, so a
//! config file only needs to list what it changes.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::geom::cup::CupParameters;
use crate::sim::heat_transfer::Discretization;
use crate::sim::heat_transfer::discretization::RADIUS_FACTOR;
use crate::sim::materials::{Material, MaterialTable};

/// Time stepping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParameters {
    /// Time step in s
    pub time_step: f64,
    /// Simulated time in s
    pub duration: f64,
    /// Interaction radius as a multiple of the point spacing
    pub radius_factor: f64,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            time_step: 0.01,  // 10 ms
            duration: 60.0,   // 1 min
            radius_factor: RADIUS_FACTOR,
        }
    }
}

/// Material records used instead of the presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialOverrides {
    pub coffee: Material,
    pub cup: Material,
    pub air: Material,
}

impl Default for MaterialOverrides {
    fn default() -> Self {
        Self {
            coffee: Material::coffee(),
            cup: Material::ceramic(),
            air: Material::air(),
        }
    }
}

impl MaterialOverrides {
    pub fn to_table(&self) -> crate::Result<MaterialTable> {
        MaterialTable::new(vec![self.coffee, self.cup, self.air])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cup: CupParameters,
    pub solver: SolverParameters,
    pub materials: MaterialOverrides,
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Checks that the run can start: valid cup, material table and
    /// discretization, and a positive time step and non-negative duration.
    pub fn validate(&self) -> Result<()> {
        self.cup.validate()?;
        self.materials.to_table()?;
        self.discretization()?;
        let SolverParameters {
            time_step,
            duration,
            ..
        } = self.solver;
        if !time_step.is_finite() || time_step <= 0.0 {
            bail!("time step must be finite and positive, got {time_step}");
        }
        if !duration.is_finite() || duration < 0.0 {
            bail!("duration must be finite and non-negative, got {duration}");
        }
        Ok(())
    }

    /// Discretization matching the cup's point spacing.
    pub fn discretization(&self) -> crate::Result<Discretization> {
        Discretization::from_spacing_with_radius_factor(
            self.cup.point_spacing,
            self.solver.radius_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        let disc = config.discretization().unwrap();
        assert!((disc.interaction_radius - 0.01).abs() < 1e-15);
    }

    #[test]
    fn test_missing_fields_use_defaults() -> Result<()> {
        let json = r#"{ "cup": { "point_spacing": 0.004 }, "solver": { "duration": 5.0 } }"#;
        let config: SimulationConfig = serde_json::from_str(json)?;
        assert_eq!(config.cup.point_spacing, 0.004);
        assert_eq!(config.cup.inner_radius, CupParameters::default().inner_radius);
        assert_eq!(config.solver.duration, 5.0);
        assert_eq!(config.solver.time_step, SolverParameters::default().time_step);
        assert_eq!(config.materials, MaterialOverrides::default());

        let empty: SimulationConfig = serde_json::from_str("{}")?;
        assert_eq!(empty, SimulationConfig::default());
        Ok(())
    }

    #[test]
    fn test_file_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        let mut config = SimulationConfig::default();
        config.solver.time_step = 0.002;
        config.materials.air = Material::new(1.1, 1000.0, 0.03, 300.0);
        config.to_file(&path)?;

        let loaded = SimulationConfig::from_file(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::from_file(Path::new("/nonexistent/cupheat.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.solver.time_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.solver.duration = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.solver.radius_factor = 0.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.materials.coffee = Material::new(1000.0, 4180.0, -0.6, 363.15);
        assert!(config.validate().is_err());
    }
}
