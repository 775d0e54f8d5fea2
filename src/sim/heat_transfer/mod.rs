//! Pairwise conduction heat transfer over a point cloud.
//!
//! Every sample exchanges heat with the samples within a fixed interaction
//! radius. The exchange rate between two samples follows Fourier's law over a
//! notional contact area, and each sample's temperature integrates its net
//! heat rate over a notional volume.
//!
//! # Architecture
//!
//! ```text
//! PointCloud + MaterialTable + Discretization ──► HeatSolver
//!                                                   │
//!                                  step() / run_for_duration() ──► StepObserver
//! ```
//!
//! The solver never sees geometry beyond pairwise distances, which it gets
//! from the cloud's spatial index.

pub mod discretization;
pub mod observer;
pub mod solver;

pub use discretization::Discretization;
pub use observer::{LogObserver, StepObserver, StepReport};
pub use solver::{HeatSolver, MIN_DISTANCE};
