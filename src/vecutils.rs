//! Slice utility functions like min(), max(), mean()
pub fn max(vec: &[f64]) -> Option<f64> {
    vec.iter().copied().max_by(f64::total_cmp)
}

pub fn min(vec: &[f64]) -> Option<f64> {
    vec.iter().copied().min_by(f64::total_cmp)
}

/// Arithmetic mean of the selected values, `None` if nothing is selected.
pub fn mean_where<F>(vec: &[f64], mut keep: F) -> Option<f64>
where
    F: FnMut(usize) -> bool,
{
    let (sum, count) = vec
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(*i))
        .fold((0.0, 0usize), |(s, n), (_, v)| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Checks if two arrays or vectors are almost equal.
///
/// Elements in both containers must be in the same order.
pub fn almost_equal(a: &[f64], b: &[f64], eps: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(&x, &y)| (x - y).abs() <= eps)
}
