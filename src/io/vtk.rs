//! Legacy ASCII VTK export.
//!
//! The cloud is written as an unstructured grid with one vertex cell per
//! point, carrying temperature and material ordinal as point data. ParaView
//! and VisIt open these files directly.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sim::point_cloud::PointCloud;

/// VTK cell type id of a single vertex.
const VTK_VERTEX: u8 = 1;

/// Writes the cloud in legacy VTK format to any writer.
pub fn write_vtk<W: Write>(cloud: &PointCloud, mut writer: W) -> Result<()> {
    let n = cloud.len();

    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "cupheat point cloud")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(writer, "POINTS {n} double")?;
    for p in cloud.positions().iter() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    // Each cell record is "1 <point index>"
    writeln!(writer, "CELLS {n} {}", 2 * n)?;
    for i in 0..n {
        writeln!(writer, "1 {i}")?;
    }
    writeln!(writer, "CELL_TYPES {n}")?;
    for _ in 0..n {
        writeln!(writer, "{VTK_VERTEX}")?;
    }

    writeln!(writer, "POINT_DATA {n}")?;
    writeln!(writer, "SCALARS temperature double 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for t in cloud.temperatures() {
        writeln!(writer, "{t}")?;
    }
    writeln!(writer, "SCALARS material int 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for m in cloud.materials() {
        writeln!(writer, "{}", m.ordinal())?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the cloud to a `.vtk` file.
pub fn save_vtk(cloud: &PointCloud, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    write_vtk(cloud, BufWriter::new(file))
        .with_context(|| format!("Failed to write VTK file: {}", path.display()))
}
