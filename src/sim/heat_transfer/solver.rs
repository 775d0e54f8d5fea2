use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{HeatError, Result};
use crate::sim::heat_transfer::discretization::Discretization;
use crate::sim::heat_transfer::observer::{StepObserver, StepReport};
use crate::sim::index::{IndexStrategy, NeighborSearch, Positions};
use crate::sim::materials::{Material, MaterialTable, MaterialType};
use crate::sim::point_cloud::PointCloud;
use crate::vecutils;

/// Pairs of samples closer than this (m) are skipped: their flux would blow up.
pub const MIN_DISTANCE: f64 = 1e-9;

/// Explicit (forward Euler) pairwise conduction solver over a point cloud.
///
/// Each step computes, for every sample `i`, the net heat rate
/// `Q_i = sum_j k_eff(i, j) * A * (T_j - T_i) / d_ij` over the samples within
/// the interaction radius, then `dT_i = Q_i * dt / (rho_i * c_i * V)`.
/// All deltas are computed from the same temperature snapshot and committed
/// together (Jacobi update), so the result does not depend on the order in
/// which samples are evaluated.
///
/// The solver owns the cloud. Adding points through [`Self::cloud_mut`]
/// invalidates the spatial index, which the next step rebuilds.
pub struct HeatSolver {
    cloud: PointCloud,
    materials: MaterialTable,
    discretization: Discretization,
    /// Time step [s].
    time_step: f64,
    /// Simulation clock [s].
    current_time: f64,
    steps: u64,
    /// Scratch buffer for pending temperature deltas [K].
    deltas: Vec<f64>,
    observer: Option<Box<dyn StepObserver>>,
    stability_checked: bool,
}

/// Read-only inputs of the delta pass, shared across worker threads.
struct StepContext<'a> {
    positions: Positions<'a>,
    temperatures: &'a [f64],
    materials: &'a [MaterialType],
    table: &'a MaterialTable,
    search: &'a dyn NeighborSearch,
    discretization: Discretization,
    time_step: f64,
}

impl StepContext<'_> {
    /// Pending temperature change of sample `i` and the number of coincident
    /// pairs `(i, j)` with `j > i` that were skipped.
    fn delta(&self, i: usize) -> (f64, usize) {
        let pi = self.positions.get(i);
        let ti = self.temperatures[i];
        let mi = self.materials[i];
        let area = self.discretization.contact_area;

        let mut q = 0.0;
        let mut degenerate = 0;
        self.search.for_each_within(
            self.positions,
            i,
            self.discretization.interaction_radius,
            &mut |j| {
                let d = pi.distance(&self.positions.get(j));
                if d < MIN_DISTANCE {
                    if j > i {
                        degenerate += 1;
                    }
                    return;
                }
                let k = self.table.effective_conductivity(mi, self.materials[j]);
                q += k * area * (self.temperatures[j] - ti) / d;
            },
        );

        let cap = capacity(self.table.get(mi), &self.discretization);
        (q * self.time_step / cap, degenerate)
    }

    /// Sum of pair conductances `k_eff * A / d` around sample `i` [W/K].
    fn conductance(&self, i: usize) -> f64 {
        let pi = self.positions.get(i);
        let mi = self.materials[i];
        let mut g = 0.0;
        self.search.for_each_within(
            self.positions,
            i,
            self.discretization.interaction_radius,
            &mut |j| {
                let d = pi.distance(&self.positions.get(j));
                if d >= MIN_DISTANCE {
                    let k = self.table.effective_conductivity(mi, self.materials[j]);
                    g += k * self.discretization.contact_area / d;
                }
            },
        );
        g
    }
}

/// Thermal capacity of one sample: rho * c_p * V [J/K].
fn capacity(material: &Material, discretization: &Discretization) -> f64 {
    material.volumetric_heat_capacity() * discretization.point_volume
}

impl HeatSolver {
    /// Creates a solver over `cloud`.
    ///
    /// `materials` is indexed by [`MaterialType`] ordinal and must hold one
    /// valid record per material. `time_step` must be finite and positive.
    /// The simulation clock starts at 0.
    pub fn new(
        cloud: PointCloud,
        materials: Vec<Material>,
        time_step: f64,
        discretization: Discretization,
    ) -> Result<Self> {
        let table = MaterialTable::new(materials)?;
        Self::with_material_table(cloud, table, time_step, discretization)
    }

    pub fn with_material_table(
        mut cloud: PointCloud,
        materials: MaterialTable,
        time_step: f64,
        discretization: Discretization,
    ) -> Result<Self> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(HeatError::Configuration(format!(
                "time step must be finite and positive, got {time_step}"
            )));
        }
        // Re-validate: the fields are public
        let discretization = Discretization::new(
            discretization.interaction_radius,
            discretization.contact_area,
            discretization.point_volume,
        )?;

        // Size voxels to the interaction radius so a query touches 27 cells
        if let IndexStrategy::VoxelGrid { .. } = cloud.index_strategy() {
            cloud.set_index_strategy(IndexStrategy::voxel_grid(discretization.interaction_radius))?;
        }

        Ok(Self {
            deltas: Vec::with_capacity(cloud.len()),
            cloud,
            materials,
            discretization,
            time_step,
            current_time: 0.0,
            steps: 0,
            observer: None,
            stability_checked: false,
        })
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn cloud_mut(&mut self) -> &mut PointCloud {
        &mut self.cloud
    }

    pub fn into_cloud(self) -> PointCloud {
        self.cloud
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn discretization(&self) -> &Discretization {
        &self.discretization
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Simulation clock [s].
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn set_observer(&mut self, observer: Box<dyn StepObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn effective_conductivity(&self, a: MaterialType, b: MaterialType) -> f64 {
        self.materials.effective_conductivity(a, b)
    }

    fn ensure_index(&mut self) {
        if !self.cloud.is_index_built() {
            self.cloud.build_index();
        }
    }

    fn context(&self) -> Result<StepContext<'_>> {
        Ok(StepContext {
            positions: self.cloud.positions(),
            temperatures: self.cloud.temperatures(),
            materials: self.cloud.materials(),
            table: &self.materials,
            search: self.cloud.neighbor_search()?,
            discretization: self.discretization,
            time_step: self.time_step,
        })
    }

    /// Largest time step for which every update stays a convex combination of
    /// the old temperatures: `min_i rho_i c_i V / sum_j k_eff A / d_ij`.
    ///
    /// Above this bound the explicit update can overshoot and oscillate.
    /// Returns infinity if no sample has a neighbor.
    pub fn max_stable_time_step(&mut self) -> Result<f64> {
        self.ensure_index();
        let ctx = self.context()?;
        let bound = (0..self.cloud.len())
            .into_par_iter()
            .map(|i| {
                let g = ctx.conductance(i);
                if g > 0.0 {
                    capacity(ctx.table.get(ctx.materials[i]), &ctx.discretization) / g
                } else {
                    f64::INFINITY
                }
            })
            .reduce(|| f64::INFINITY, f64::min);
        Ok(bound)
    }

    fn check_stability(&mut self) -> Result<()> {
        if self.stability_checked {
            return Ok(());
        }
        self.stability_checked = true;
        let bound = self.max_stable_time_step()?;
        if self.time_step > bound {
            warn!(
                "Time step {} s exceeds the explicit stability bound {:.3e} s, temperatures may oscillate",
                self.time_step, bound
            );
        } else {
            debug!("Time step {} s, stability bound {:.3e} s", self.time_step, bound);
        }
        Ok(())
    }

    /// Advances the simulation by one time step.
    ///
    /// Builds the spatial index first if it is stale. Deltas are computed in
    /// parallel from a frozen snapshot and committed together.
    pub fn step(&mut self) -> Result<()> {
        self.ensure_index();
        self.check_stability()?;

        let mut deltas = std::mem::take(&mut self.deltas);
        deltas.clear();
        deltas.resize(self.cloud.len(), 0.0);

        let degenerate: usize = {
            let ctx = self.context()?;
            deltas
                .par_iter_mut()
                .enumerate()
                .map(|(i, delta)| {
                    let (d, skipped) = ctx.delta(i);
                    *delta = d;
                    skipped
                })
                .sum()
        };

        self.commit(deltas, degenerate);
        Ok(())
    }

    /// Same as [`Self::step`] but evaluates samples one by one in `order`.
    ///
    /// `order` must be a permutation of `0..n`. The outcome is identical to
    /// [`Self::step`] for every permutation.
    pub fn step_in_order(&mut self, order: &[usize]) -> Result<()> {
        let n = self.cloud.len();
        if order.len() != n {
            return Err(HeatError::InvalidArgument(format!(
                "order has {} entries, cloud has {n} points",
                order.len()
            )));
        }
        let mut seen = vec![false; n];
        for &i in order {
            if i >= n || seen[i] {
                return Err(HeatError::InvalidArgument(format!(
                    "order is not a permutation of 0..{n} (entry {i})"
                )));
            }
            seen[i] = true;
        }

        self.ensure_index();
        self.check_stability()?;

        let mut deltas = std::mem::take(&mut self.deltas);
        deltas.clear();
        deltas.resize(n, 0.0);

        let mut degenerate = 0;
        {
            let ctx = self.context()?;
            for &i in order {
                let (d, skipped) = ctx.delta(i);
                deltas[i] = d;
                degenerate += skipped;
            }
        }

        self.commit(deltas, degenerate);
        Ok(())
    }

    fn commit(&mut self, deltas: Vec<f64>, degenerate: usize) {
        self.cloud
            .temperatures_mut()
            .par_iter_mut()
            .zip(deltas.par_iter())
            .for_each(|(t, d)| *t += d);
        self.deltas = deltas;

        self.current_time += self.time_step;
        self.steps += 1;

        if let Some(observer) = self.observer.as_mut() {
            let temps = self.cloud.temperatures();
            let report = StepReport {
                step: self.steps,
                time: self.current_time,
                min_temperature: vecutils::min(temps).unwrap_or(0.0),
                max_temperature: vecutils::max(temps).unwrap_or(0.0),
                degenerate_pairs: degenerate,
            };
            observer.on_step(&report);
        }
    }

    /// Steps until the clock has advanced by at least `duration` seconds.
    ///
    /// The last step is not shortened, so the clock may overshoot the target
    /// by less than one time step. Returns the number of steps taken.
    pub fn run_for_duration(&mut self, duration: f64) -> Result<u64> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(HeatError::InvalidArgument(format!(
                "duration must be finite and non-negative, got {duration}"
            )));
        }
        let end = self.current_time + duration;
        let mut n = 0;
        while self.current_time < end {
            self.step()?;
            n += 1;
        }
        Ok(n)
    }

    /// Mean temperature of the samples tagged `material` [K], 0 if there are none.
    pub fn average_temperature(&self, material: MaterialType) -> f64 {
        let materials = self.cloud.materials();
        vecutils::mean_where(self.cloud.temperatures(), |i| materials[i] == material)
            .unwrap_or(0.0)
    }

    /// Hottest sample [K], 0 on an empty cloud.
    pub fn max_temperature(&self) -> f64 {
        vecutils::max(self.cloud.temperatures()).unwrap_or(0.0)
    }

    /// Coldest sample [K], 0 on an empty cloud.
    pub fn min_temperature(&self) -> f64 {
        vecutils::min(self.cloud.temperatures()).unwrap_or(0.0)
    }

    /// Internal energy `sum_i rho_i c_i V T_i` [J].
    ///
    /// Pair fluxes are antisymmetric, so this is constant across steps.
    pub fn total_thermal_energy(&self) -> f64 {
        self.cloud
            .iter()
            .map(|p| capacity(self.materials.get(p.material()), &self.discretization) * p.temperature())
            .sum()
    }
}
