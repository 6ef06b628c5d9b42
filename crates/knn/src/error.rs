//! Error types for the wde-knn crate.

/// Error type for all fallible operations in the wde-knn crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnnError {
    /// Returned when the points slice is empty.
    #[error("no points provided")]
    EmptyPoints,

    /// Returned when k is zero.
    #[error("k must be >= 1, got {k}")]
    InvalidK {
        /// The invalid k value.
        k: usize,
    },

    /// Returned when there are fewer than k + 2 points.
    #[error("need at least k + 2 = {} points, got {n}", .k + 2)]
    InsufficientPoints {
        /// Number of points provided.
        n: usize,
        /// Neighbor order.
        k: usize,
    },

    /// Returned when the points slice length is not divisible by n_vars.
    #[error("points length {len} is not divisible by n_vars {n_vars}")]
    PointsShapeMismatch {
        /// Length of the points slice.
        len: usize,
        /// Expected number of variables.
        n_vars: usize,
    },

    /// Returned when a required input contains NaN or infinity.
    #[error("non-finite value in {input}")]
    NonFiniteInput {
        /// Name of the input containing the non-finite value.
        input: &'static str,
    },

    /// Returned when a sample index is out of range.
    #[error("sample index {index} out of range for {n} points")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of points.
        n: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_points() {
        let e = KnnError::EmptyPoints;
        assert_eq!(e.to_string(), "no points provided");
    }

    #[test]
    fn error_invalid_k() {
        let e = KnnError::InvalidK { k: 0 };
        assert_eq!(e.to_string(), "k must be >= 1, got 0");
    }

    #[test]
    fn error_insufficient_points() {
        let e = KnnError::InsufficientPoints { n: 3, k: 2 };
        assert_eq!(e.to_string(), "need at least k + 2 = 4 points, got 3");
    }

    #[test]
    fn error_points_shape_mismatch() {
        let e = KnnError::PointsShapeMismatch { len: 10, n_vars: 3 };
        assert_eq!(
            e.to_string(),
            "points length 10 is not divisible by n_vars 3"
        );
    }

    #[test]
    fn error_non_finite_input() {
        let e = KnnError::NonFiniteInput { input: "points" };
        assert_eq!(e.to_string(), "non-finite value in points");
    }

    #[test]
    fn error_index_out_of_range() {
        let e = KnnError::IndexOutOfRange { index: 12, n: 10 };
        assert_eq!(e.to_string(), "sample index 12 out of range for 10 points");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<KnnError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<KnnError>();
    }
}
