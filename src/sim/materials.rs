use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HeatError, Result};

/// Material tag carried by every sample.
///
/// The discriminant is the index of the material's record in a [`MaterialTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    Coffee = 0,
    CupMaterial = 1,
    Air = 2,
}

impl MaterialType {
    /// Number of enumerated materials. A table needs at least this many records.
    pub const COUNT: usize = 3;

    /// All materials in ordinal order.
    pub const ALL: [MaterialType; Self::COUNT] =
        [MaterialType::Coffee, MaterialType::CupMaterial, MaterialType::Air];

    /// Index of this material in a [`MaterialTable`].
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialType::Coffee => "coffee",
            MaterialType::CupMaterial => "cup",
            MaterialType::Air => "air",
        }
    }
}

impl TryFrom<u8> for MaterialType {
    type Error = HeatError;

    fn try_from(value: u8) -> Result<Self> {
        MaterialType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| HeatError::InvalidArgument(format!("unknown material ordinal {value}")))
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bulk thermal properties of one material.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Density in kg/m^3.
    density: f64,
    /// Specific heat capacity in J/(kg*K).
    specific_heat: f64,
    /// Thermal conductivity in W/(m*K).
    conductivity: f64,
    /// Ambient (initial reference) temperature in K.
    ambient_temperature: f64,
}

impl Material {
    pub fn new(
        density: f64,
        specific_heat: f64,
        conductivity: f64,
        ambient_temperature: f64,
    ) -> Self {
        Self {
            density,
            specific_heat,
            conductivity,
            ambient_temperature,
        }
    }

    /// Hot coffee (water-like), ~90 C.
    pub fn coffee() -> Self {
        Self::new(1000.0, 4180.0, 0.6, 363.15)
    }

    /// Ceramic mug wall at room temperature.
    pub fn ceramic() -> Self {
        Self::new(2400.0, 800.0, 1.5, 293.15)
    }

    /// Still air at room temperature.
    pub fn air() -> Self {
        Self::new(1.2, 1005.0, 0.025, 293.15)
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn specific_heat(&self) -> f64 {
        self.specific_heat
    }

    pub fn conductivity(&self) -> f64 {
        self.conductivity
    }

    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temperature
    }

    /// Volumetric heat capacity rho * c_p in J/(m^3*K).
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.density * self.specific_heat
    }

    fn validate(&self, material: MaterialType) -> Result<()> {
        let fields = [
            ("density", self.density),
            ("specific heat", self.specific_heat),
            ("conductivity", self.conductivity),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(HeatError::Configuration(format!(
                    "{material} {label} must be finite and positive, got {value}"
                )));
            }
        }
        if !self.ambient_temperature.is_finite() || self.ambient_temperature < 0.0 {
            return Err(HeatError::Configuration(format!(
                "{material} ambient temperature must be a finite absolute temperature, got {}",
                self.ambient_temperature
            )));
        }
        Ok(())
    }
}

/// Material records indexed by [`MaterialType`] ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable {
    records: Vec<Material>,
}

impl MaterialTable {
    /// Builds a table from records in ordinal order.
    ///
    /// Fails if there is no record for some [`MaterialType`] or if a record
    /// has non-physical properties. Extra trailing records are kept but unused.
    pub fn new(records: Vec<Material>) -> Result<Self> {
        if records.len() < MaterialType::COUNT {
            return Err(HeatError::Configuration(format!(
                "material table needs {} records (one per material), got {}",
                MaterialType::COUNT,
                records.len()
            )));
        }
        for material in MaterialType::ALL {
            records[material.ordinal()].validate(material)?;
        }
        Ok(Self { records })
    }

    /// Coffee, ceramic and air presets.
    pub fn standard() -> Self {
        Self {
            records: vec![Material::coffee(), Material::ceramic(), Material::air()],
        }
    }

    pub fn get(&self, material: MaterialType) -> &Material {
        // Length is checked in new(), so every ordinal is present.
        &self.records[material.ordinal()]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Conductivity across the interface between two materials in W/(m*K).
    ///
    /// Same material: its own conductivity. Different materials: harmonic mean
    /// `2*k1*k2/(k1+k2)`, i.e. two equal-length layers in series.
    pub fn effective_conductivity(&self, a: MaterialType, b: MaterialType) -> f64 {
        if a == b {
            return self.get(a).conductivity;
        }
        // Fixed operand order keeps the result bit-for-bit symmetric
        let (a, b) = if a.ordinal() < b.ordinal() { (a, b) } else { (b, a) };
        let k1 = self.get(a).conductivity;
        let k2 = self.get(b).conductivity;
        2.0 * k1 * k2 / (k1 + k2)
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::standard()
    }
}
