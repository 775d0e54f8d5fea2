//! Two samples 0.5 cm apart: coffee at 90 C next to the cup wall at 20 C.
//!
//! Run with `cargo run --example two_points`.

use anyhow::Result;
use cupheat::{Discretization, HeatSolver, Material, MaterialType, Point, PointCloud};

fn main() -> Result<()> {
    let mut cloud = PointCloud::new();
    cloud.add_point(Point::new(0., 0., 0.), 363.15, MaterialType::Coffee);
    cloud.add_point(Point::new(0.005, 0., 0.), 293.15, MaterialType::CupMaterial);

    let materials = vec![Material::coffee(), Material::ceramic(), Material::air()];
    let mut solver = HeatSolver::new(cloud, materials, 0.001, Discretization::reference())?;

    println!("{:>8} {:>10} {:>10}", "t [s]", "coffee", "cup");
    for _ in 0..10 {
        solver.step()?;
        println!(
            "{:>8.3} {:>10.4} {:>10.4}",
            solver.current_time(),
            solver.cloud().temperature(0)?,
            solver.cloud().temperature(1)?
        );
    }
    Ok(())
}
