//! Spatial neighbor search over the sample positions of a point cloud.
//!
//! Two interchangeable strategies implement [`NeighborSearch`]:
//!
//! - [`BruteForce`] scans every point per query. It is the correctness oracle.
//! - [`VoxelGrid`] buckets points into cubic cells and only visits the cells
//!   overlapping the query sphere. This is what the solver uses.
//!
//! Both decide membership the same way: a point `j != center` is a neighbor
//! iff `|p_j - p_center|^2 <= radius^2`. Exact equality counts as a neighbor.
//! A radius of zero (or less) has no neighbors, even for coincident points.
//!
//! Indices are built in one pass and are never updated incrementally; adding
//! points to a cloud requires a rebuild.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Point;
use crate::error::{HeatError, Result};

pub mod brute_force;
pub mod voxel_grid;

pub use brute_force::BruteForce;
pub use voxel_grid::VoxelGrid;

/// Default voxel edge length in m (matches the reference 1 cm interaction radius).
pub const DEFAULT_CELL_SIZE: f64 = 0.01;

/// Borrowed column view of sample positions.
#[derive(Debug, Clone, Copy)]
pub struct Positions<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
}

impl<'a> Positions<'a> {
    /// # Panics
    ///
    /// Panics if the three columns differ in length.
    pub fn new(x: &'a [f64], y: &'a [f64], z: &'a [f64]) -> Self {
        assert!(
            x.len() == y.len() && y.len() == z.len(),
            "position columns must have equal length ({}, {}, {})",
            x.len(),
            y.len(),
            z.len()
        );
        Self { x, y, z }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn get(&self, i: usize) -> Point {
        Point::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

/// Radius query over a fixed set of positions.
///
/// Implementations are read-only after construction, so a built index can be
/// queried from several threads at once.
pub trait NeighborSearch: Send + Sync + fmt::Debug {
    /// Human-readable identifier for logging.
    fn name(&self) -> &'static str;

    /// Calls `f(j)` for each point `j != center` with `|p_j - p_center| <= radius`.
    ///
    /// `positions` must be the positions the index was built from.
    /// Visiting order is deterministic for a given index but not sorted.
    fn for_each_within(
        &self,
        positions: Positions<'_>,
        center: usize,
        radius: f64,
        f: &mut dyn FnMut(usize),
    );
}

/// Which [`NeighborSearch`] a point cloud builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndexStrategy {
    /// O(n) per query. Intended as a test oracle.
    BruteForce,
    /// Uniform grid with cubic cells of edge `cell_size` (m).
    VoxelGrid { cell_size: f64 },
}

impl IndexStrategy {
    pub fn voxel_grid(cell_size: f64) -> Self {
        Self::VoxelGrid { cell_size }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::BruteForce => Ok(()),
            Self::VoxelGrid { cell_size } if cell_size.is_finite() && cell_size > 0.0 => Ok(()),
            Self::VoxelGrid { cell_size } => Err(HeatError::Configuration(format!(
                "voxel cell size must be finite and positive, got {cell_size}"
            ))),
        }
    }

    /// Builds the index over `positions`.
    pub fn build(&self, positions: Positions<'_>) -> Box<dyn NeighborSearch> {
        match *self {
            Self::BruteForce => Box::new(BruteForce),
            Self::VoxelGrid { cell_size } => Box::new(VoxelGrid::new(positions, cell_size)),
        }
    }
}

impl Default for IndexStrategy {
    fn default() -> Self {
        Self::VoxelGrid {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Squared query radius, or `None` if the query can have no neighbors.
pub(crate) fn radius_squared(radius: f64) -> Option<f64> {
    if radius > 0.0 {
        Some(radius * radius)
    } else {
        None
    }
}
