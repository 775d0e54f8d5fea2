use thiserror::Error;

/// Errors surfaced by the point cloud, the neighbor index and the heat solver.
///
/// Coincident points (zero distance between two samples) are not an error:
/// the solver skips such pairs and reports how many it skipped through
/// [`crate::StepReport::degenerate_pairs`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatError {
    /// Insufficient or malformed setup (material table, time step, discretization).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A point index past the end of the cloud.
    #[error("point index {index} out of range for cloud of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// A neighbor query was issued before the spatial index was (re)built.
    #[error("spatial index is not built, call build_index() first")]
    StaleIndex,

    /// A call argument outside its domain (negative duration, bad radius...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, HeatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = HeatError::IndexOutOfRange { index: 7, size: 3 };
        assert_eq!(e.to_string(), "point index 7 out of range for cloud of size 3");
        let e = HeatError::Configuration("table too short".into());
        assert!(e.to_string().contains("table too short"));
    }
}
