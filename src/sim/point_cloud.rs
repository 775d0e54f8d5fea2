//! Columnar (structure-of-arrays) storage of point samples.
//!
//! Every sample has a position, a temperature and a material tag, each kept
//! in its own column. All columns have the same length at all times. Samples
//! never move and are never removed individually, so a sample's index is
//! stable for the lifetime of the cloud (until [`PointCloud::clear`]).
//!
//! Callers access samples through index-based views ([`PointRef`],
//! [`PointMut`]) which hold no data of their own.

use log::debug;
use ndarray as nd;
use std::fmt;

use crate::Point;
use crate::error::{HeatError, Result};
use crate::sim::index::{IndexStrategy, NeighborSearch, Positions};
use crate::sim::materials::MaterialType;

/// Number of columns in [`PointCloud::to_array`]: x, y, z, temperature, material.
pub const ARRAY_COLUMNS: usize = 5;

pub struct PointCloud {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    /// Temperatures in K.
    temperatures: Vec<f64>,
    materials: Vec<MaterialType>,
    strategy: IndexStrategy,
    /// Spatial index over the current positions, `None` when stale.
    index: Option<Box<dyn NeighborSearch>>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            temperatures: Vec::with_capacity(capacity),
            materials: Vec::with_capacity(capacity),
            strategy: IndexStrategy::default(),
            index: None,
        }
    }

    /// Appends a sample and returns its index.
    ///
    /// Invalidates the spatial index.
    pub fn add_point(&mut self, position: Point, temperature: f64, material: MaterialType) -> usize {
        self.x.push(position.x);
        self.y.push(position.y);
        self.z.push(position.z);
        self.temperatures.push(temperature);
        self.materials.push(material);
        self.index = None;
        self.x.len() - 1
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Removes all samples and discards the spatial index.
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.temperatures.clear();
        self.materials.clear();
        self.index = None;
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(HeatError::IndexOutOfRange {
                index,
                size: self.len(),
            })
        }
    }

    pub fn position(&self, index: usize) -> Result<Point> {
        self.check(index)?;
        Ok(self.positions().get(index))
    }

    pub fn temperature(&self, index: usize) -> Result<f64> {
        self.check(index)?;
        Ok(self.temperatures[index])
    }

    pub fn set_temperature(&mut self, index: usize, temperature: f64) -> Result<()> {
        self.check(index)?;
        self.temperatures[index] = temperature;
        Ok(())
    }

    pub fn material(&self, index: usize) -> Result<MaterialType> {
        self.check(index)?;
        Ok(self.materials[index])
    }

    /// Changes the material tag. Does not invalidate the spatial index.
    pub fn set_material(&mut self, index: usize, material: MaterialType) -> Result<()> {
        self.check(index)?;
        self.materials[index] = material;
        Ok(())
    }

    /// Read view of one sample.
    pub fn point(&self, index: usize) -> Result<PointRef<'_>> {
        self.check(index)?;
        Ok(PointRef { cloud: self, index })
    }

    /// Read/write view of one sample.
    pub fn point_mut(&mut self, index: usize) -> Result<PointMut<'_>> {
        self.check(index)?;
        Ok(PointMut { cloud: self, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = PointRef<'_>> + '_ {
        (0..self.len()).map(move |index| PointRef { cloud: self, index })
    }

    pub fn positions(&self) -> Positions<'_> {
        Positions::new(&self.x, &self.y, &self.z)
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn materials(&self) -> &[MaterialType] {
        &self.materials
    }

    /// Temperature column for in-place updates by the solver.
    pub(crate) fn temperatures_mut(&mut self) -> &mut [f64] {
        &mut self.temperatures
    }

    pub fn index_strategy(&self) -> IndexStrategy {
        self.strategy
    }

    /// Selects the neighbor search used by [`Self::build_index`].
    ///
    /// Invalidates the spatial index if the strategy changes.
    pub fn set_index_strategy(&mut self, strategy: IndexStrategy) -> Result<()> {
        strategy.validate()?;
        if strategy != self.strategy {
            self.strategy = strategy;
            self.index = None;
        }
        Ok(())
    }

    /// Builds (or rebuilds) the spatial index over the current positions.
    ///
    /// On an empty cloud this builds an empty index.
    pub fn build_index(&mut self) {
        let index = self.strategy.build(self.positions());
        debug!("Built {} index over {} points", index.name(), self.len());
        self.index = Some(index);
    }

    pub fn is_index_built(&self) -> bool {
        self.index.is_some()
    }

    /// The built index, or [`HeatError::StaleIndex`].
    pub(crate) fn neighbor_search(&self) -> Result<&dyn NeighborSearch> {
        self.index.as_deref().ok_or(HeatError::StaleIndex)
    }

    fn check_query(&self, index: usize, radius: f64) -> Result<&dyn NeighborSearch> {
        let search = self.neighbor_search()?;
        self.check(index)?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(HeatError::InvalidArgument(format!(
                "neighbor radius must be finite and non-negative, got {radius}"
            )));
        }
        Ok(search)
    }

    /// Indices of all other samples within `radius` (inclusive) of sample `index`.
    ///
    /// The result is sorted ascending. Fails with [`HeatError::StaleIndex`]
    /// if the index has not been built since the last insertion.
    pub fn find_neighbors_within_radius(&self, index: usize, radius: f64) -> Result<Vec<usize>> {
        let mut neighbors = Vec::new();
        self.for_each_neighbor(index, radius, |j| neighbors.push(j))?;
        neighbors.sort_unstable();
        Ok(neighbors)
    }

    /// Calls `f(j)` for every neighbor of `index`, in unspecified but
    /// deterministic order, without allocating.
    pub fn for_each_neighbor<F>(&self, index: usize, radius: f64, mut f: F) -> Result<()>
    where
        F: FnMut(usize),
    {
        let search = self.check_query(index, radius)?;
        search.for_each_within(self.positions(), index, radius, &mut f);
        Ok(())
    }

    /// Snapshot as an `(n, 5)` array of `[x, y, z, temperature, material ordinal]`.
    pub fn to_array(&self) -> nd::Array2<f64> {
        let mut arr = nd::Array2::from_elem((self.len(), ARRAY_COLUMNS), 0.);
        for (i, mut row) in arr.rows_mut().into_iter().enumerate() {
            row[0] = self.x[i];
            row[1] = self.y[i];
            row[2] = self.z[i];
            row[3] = self.temperatures[i];
            row[4] = self.materials[i].ordinal() as f64;
        }
        arr
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones the samples and strategy. The clone starts with a stale index.
impl Clone for PointCloud {
    fn clone(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
            temperatures: self.temperatures.clone(),
            materials: self.materials.clone(),
            strategy: self.strategy,
            index: None,
        }
    }
}

impl fmt::Debug for PointCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointCloud")
            .field("len", &self.len())
            .field("strategy", &self.strategy)
            .field("index_built", &self.is_index_built())
            .finish()
    }
}

/// Read-only view of one sample.
#[derive(Clone, Copy)]
pub struct PointRef<'a> {
    cloud: &'a PointCloud,
    index: usize,
}

impl PointRef<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Point {
        self.cloud.positions().get(self.index)
    }

    pub fn temperature(&self) -> f64 {
        self.cloud.temperatures[self.index]
    }

    pub fn material(&self) -> MaterialType {
        self.cloud.materials[self.index]
    }
}

impl fmt::Debug for PointRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointRef")
            .field("index", &self.index)
            .field("position", &self.position())
            .field("temperature", &self.temperature())
            .field("material", &self.material())
            .finish()
    }
}

/// Read/write view of one sample. Position is read-only: samples never move.
pub struct PointMut<'a> {
    cloud: &'a mut PointCloud,
    index: usize,
}

impl PointMut<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Point {
        self.cloud.positions().get(self.index)
    }

    pub fn temperature(&self) -> f64 {
        self.cloud.temperatures[self.index]
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.cloud.temperatures[self.index] = temperature;
    }

    pub fn material(&self) -> MaterialType {
        self.cloud.materials[self.index]
    }

    pub fn set_material(&mut self, material: MaterialType) {
        self.cloud.materials[self.index] = material;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_cloud(n: usize, spacing: f64) -> PointCloud {
        let mut cloud = PointCloud::new();
        for i in 0..n {
            cloud.add_point(
                Point::new(i as f64 * spacing, 0., 0.),
                293.15 + i as f64,
                MaterialType::Coffee,
            );
        }
        cloud
    }

    #[test]
    fn test_add_point_returns_contiguous_indices() {
        let mut cloud = PointCloud::new();
        assert!(cloud.is_empty());
        let a = cloud.add_point(Point::new(0., 0., 0.), 300., MaterialType::Coffee);
        let b = cloud.add_point(Point::new(1., 0., 0.), 310., MaterialType::Air);
        assert_eq!((a, b), (0, 1));
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.temperature(1).unwrap(), 310.);
        assert_eq!(cloud.material(1).unwrap(), MaterialType::Air);
        assert_eq!(cloud.position(1).unwrap(), Point::new(1., 0., 0.));
    }

    #[test]
    fn test_out_of_range() {
        let mut cloud = line_cloud(2, 0.01);
        let err = HeatError::IndexOutOfRange { index: 2, size: 2 };
        assert_eq!(cloud.temperature(2).unwrap_err(), err);
        assert_eq!(cloud.material(2).unwrap_err(), err);
        assert_eq!(cloud.position(2).unwrap_err(), err);
        assert_eq!(cloud.set_temperature(2, 1.).unwrap_err(), err);
        assert_eq!(cloud.set_material(2, MaterialType::Air).unwrap_err(), err);
        assert!(cloud.point(2).is_err());
        assert!(cloud.point_mut(2).is_err());
    }

    #[test]
    fn test_views_share_storage() {
        let mut cloud = line_cloud(3, 0.01);
        {
            let mut p = cloud.point_mut(1).unwrap();
            p.set_temperature(400.);
            p.set_material(MaterialType::CupMaterial);
        }
        let p = cloud.point(1).unwrap();
        assert_eq!(p.index(), 1);
        assert_eq!(p.temperature(), 400.);
        assert_eq!(p.material(), MaterialType::CupMaterial);
        assert_eq!(cloud.temperatures()[1], 400.);
        assert_eq!(cloud.iter().count(), 3);
    }

    #[test]
    fn test_index_lifecycle() {
        let mut cloud = line_cloud(3, 0.01);
        assert!(!cloud.is_index_built());
        assert_eq!(
            cloud.find_neighbors_within_radius(0, 0.01).unwrap_err(),
            HeatError::StaleIndex
        );

        cloud.build_index();
        assert!(cloud.is_index_built());
        assert_eq!(cloud.find_neighbors_within_radius(1, 0.015).unwrap(), vec![0, 2]);

        // Temperature and material edits keep the index valid
        cloud.set_temperature(0, 500.).unwrap();
        cloud.set_material(0, MaterialType::Air).unwrap();
        assert!(cloud.is_index_built());

        // Insertion invalidates it
        cloud.add_point(Point::new(0.03, 0., 0.), 300., MaterialType::Air);
        assert!(!cloud.is_index_built());
        cloud.build_index();
        assert_eq!(cloud.find_neighbors_within_radius(2, 0.015).unwrap(), vec![1, 3]);

        // Rebuilding a built index is fine
        cloud.build_index();
        assert!(cloud.is_index_built());
    }

    #[test]
    fn test_clear_discards_index() {
        let mut cloud = line_cloud(3, 0.01);
        cloud.build_index();
        cloud.clear();
        assert_eq!(cloud.len(), 0);
        assert!(!cloud.is_index_built());
        assert!(cloud.temperatures().is_empty());
        assert!(cloud.materials().is_empty());
    }

    #[test]
    fn test_build_empty_index() {
        let mut cloud = PointCloud::new();
        cloud.build_index();
        assert!(cloud.is_index_built());
    }

    #[test]
    fn test_query_arguments() {
        let mut cloud = line_cloud(3, 0.01);
        cloud.build_index();
        assert!(cloud.find_neighbors_within_radius(0, 0.0).unwrap().is_empty());
        assert!(matches!(
            cloud.find_neighbors_within_radius(0, -1.0),
            Err(HeatError::InvalidArgument(_))
        ));
        assert!(matches!(
            cloud.find_neighbors_within_radius(0, f64::NAN),
            Err(HeatError::InvalidArgument(_))
        ));
        assert!(matches!(
            cloud.find_neighbors_within_radius(5, 0.01),
            Err(HeatError::IndexOutOfRange { index: 5, size: 3 })
        ));
    }

    #[test]
    fn test_inclusive_radius() {
        let mut cloud = PointCloud::new();
        cloud.add_point(Point::new(0., 0., 0.), 300., MaterialType::Coffee);
        cloud.add_point(Point::new(0.5, 0., 0.), 300., MaterialType::Coffee);
        cloud.build_index();
        assert_eq!(cloud.find_neighbors_within_radius(0, 0.5).unwrap(), vec![1]);
    }

    #[test]
    fn test_strategies_agree() {
        let mut cloud = PointCloud::new();
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    let p = Point::new(i as f64 * 0.005, j as f64 * 0.005, k as f64 * 0.005);
                    cloud.add_point(p, 300., MaterialType::Coffee);
                }
            }
        }
        let mut oracle = cloud.clone();
        oracle.set_index_strategy(IndexStrategy::BruteForce).unwrap();
        oracle.build_index();
        cloud.build_index();
        for r in [0.0, 0.005, 0.0075, 0.01, 1.0] {
            for i in 0..cloud.len() {
                assert_eq!(
                    cloud.find_neighbors_within_radius(i, r).unwrap(),
                    oracle.find_neighbors_within_radius(i, r).unwrap()
                );
            }
        }
        // Far corner with a radius beyond the cloud sees every other point
        assert_eq!(cloud.find_neighbors_within_radius(0, 1.0).unwrap().len(), 124);
    }

    #[test]
    fn test_set_strategy_invalidates() {
        let mut cloud = line_cloud(3, 0.01);
        cloud.build_index();
        cloud.set_index_strategy(IndexStrategy::default()).unwrap();
        assert!(cloud.is_index_built());
        cloud.set_index_strategy(IndexStrategy::BruteForce).unwrap();
        assert!(!cloud.is_index_built());
        assert!(cloud.set_index_strategy(IndexStrategy::voxel_grid(0.0)).is_err());
        assert_eq!(cloud.index_strategy(), IndexStrategy::BruteForce);
    }

    #[test]
    fn test_to_array() {
        let mut cloud = PointCloud::new();
        cloud.add_point(Point::new(1., 2., 3.), 350., MaterialType::CupMaterial);
        cloud.add_point(Point::new(4., 5., 6.), 290., MaterialType::Air);
        let arr = cloud.to_array();
        assert_eq!(arr.shape(), &[2, ARRAY_COLUMNS]);
        assert_eq!(arr[[0, 2]], 3.);
        assert_eq!(arr[[0, 3]], 350.);
        assert_eq!(arr[[0, 4]], 1.);
        assert_eq!(arr[[1, 4]], 2.);
    }

    #[test]
    fn test_clone_starts_stale() {
        let mut cloud = line_cloud(2, 0.01);
        cloud.build_index();
        let copy = cloud.clone();
        assert!(!copy.is_index_built());
        assert_eq!(copy.temperatures(), cloud.temperatures());
    }
}
