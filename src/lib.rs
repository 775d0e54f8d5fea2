pub mod config;
pub mod error;
pub mod geom;
pub mod io;
pub mod sim;
pub mod vecutils;

// Prelude
pub use error::{HeatError, Result};
pub use geom::cup::{CupParameters, generate_cup};
pub use geom::point::Point;
pub use sim::heat_transfer::{Discretization, HeatSolver, LogObserver, StepObserver, StepReport};
pub use sim::index::IndexStrategy;
pub use sim::materials::{Material, MaterialTable, MaterialType};
pub use sim::point_cloud::PointCloud;
