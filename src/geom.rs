pub mod bboxes;
pub mod cup;
pub mod point;

/// Geometric precision
#[cfg(test)]
const EPS: f64 = 1e-13;
