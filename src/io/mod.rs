//! File export of point clouds.

pub mod vtk;

pub use vtk::{save_vtk, write_vtk};
