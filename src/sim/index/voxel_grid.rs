use std::collections::HashMap;

use super::{NeighborSearch, Positions, radius_squared};
use crate::Point;
use crate::geom::bboxes::bounding_box;

type CellKey = (i32, i32, i32);

/// Uniform grid of cubic cells, each holding the indices of the points inside it.
///
/// A query visits the cells overlapping the bounding box of the query sphere,
/// clamped to the occupied cell range, then applies the exact distance test.
/// With `step` close to the query radius this is 27 cells per query.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    grid: HashMap<CellKey, Vec<usize>>,
    /// Occupied cell keys in sorted order (deterministic full-grid sweeps).
    keys: Vec<CellKey>,
    /// Inclusive range of occupied cell keys, `None` when empty.
    extent: Option<(CellKey, CellKey)>,
    step: f64,
}

impl VoxelGrid {
    /// Buckets every position into cubic cells of edge `step`.
    ///
    /// # Panics
    ///
    /// Panics if `step` is not positive. [`super::IndexStrategy::validate`]
    /// rejects such steps before a grid is built through a point cloud.
    pub fn new(positions: Positions<'_>, step: f64) -> Self {
        assert!(step > 0.0, "voxel step must be positive, got {step}");
        let mut grid: HashMap<CellKey, Vec<usize>> = HashMap::new();

        for (i, p) in positions.iter().enumerate() {
            grid.entry(cell_key(p, step)).or_default().push(i);
        }

        let extent = bounding_box(positions.iter())
            .map(|(pmin, pmax)| (cell_key(pmin, step), cell_key(pmax, step)));

        let mut keys: Vec<CellKey> = grid.keys().copied().collect();
        keys.sort_unstable();

        Self {
            grid,
            keys,
            extent,
            step,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.step
    }

    /// Number of non-empty cells.
    pub fn num_cells(&self) -> usize {
        self.grid.len()
    }

    fn coord(&self, v: f64) -> i32 {
        // Saturating cast: infinite query bounds clamp to the extent below
        (v / self.step).floor() as i32
    }
}

fn cell_key(p: Point, step: f64) -> CellKey {
    (
        (p.x / step).floor() as i32,
        (p.y / step).floor() as i32,
        (p.z / step).floor() as i32,
    )
}

/// Number of cells in the inclusive range `lo..=hi` (`lo <= hi`).
fn cells_between(lo: i32, hi: i32) -> u64 {
    (i64::from(hi) - i64::from(lo) + 1) as u64
}

impl NeighborSearch for VoxelGrid {
    fn name(&self) -> &'static str {
        "voxel-grid"
    }

    fn for_each_within(
        &self,
        positions: Positions<'_>,
        center: usize,
        radius: f64,
        f: &mut dyn FnMut(usize),
    ) {
        let Some(r2) = radius_squared(radius) else {
            return;
        };
        let Some((lo, hi)) = self.extent else {
            return;
        };
        let c = positions.get(center);

        // Pad by one cell: c -/+ radius is rounded, and a point one ulp past
        // the rounded bound can still pass the distance test
        let imin = self.coord(c.x - radius).saturating_sub(1).max(lo.0);
        let jmin = self.coord(c.y - radius).saturating_sub(1).max(lo.1);
        let kmin = self.coord(c.z - radius).saturating_sub(1).max(lo.2);
        let imax = self.coord(c.x + radius).saturating_add(1).min(hi.0);
        let jmax = self.coord(c.y + radius).saturating_add(1).min(hi.1);
        let kmax = self.coord(c.z + radius).saturating_add(1).min(hi.2);
        if imin > imax || jmin > jmax || kmin > kmax {
            return;
        }

        let mut visit = |indices: &Vec<usize>| {
            for &j in indices {
                if j != center && c.distance_squared(&positions.get(j)) <= r2 {
                    f(j);
                }
            }
        };

        let span = cells_between(imin, imax)
            .saturating_mul(cells_between(jmin, jmax))
            .saturating_mul(cells_between(kmin, kmax));
        if span > self.keys.len() as u64 {
            // Query box covers more cells than are occupied: sweep occupied cells instead
            for key in &self.keys {
                let (i, j, k) = *key;
                if (imin..=imax).contains(&i)
                    && (jmin..=jmax).contains(&j)
                    && (kmin..=kmax).contains(&k)
                {
                    visit(&self.grid[key]);
                }
            }
            return;
        }

        for i in imin..=imax {
            for j in jmin..=jmax {
                for k in kmin..=kmax {
                    if let Some(indices) = self.grid.get(&(i, j, k)) {
                        visit(indices);
                    }
                }
            }
        }
    }
}
