//! Error types for the wde-estimator crate.

use wde_knn::KnnError;
use wde_wavelet::WaveletError;

/// Error type for all fallible operations in the wde-estimator crate.
///
/// Wraps wavelet construction and nearest-neighbor errors, and adds the
/// fitting and model-selection failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WdeError {
    /// Wavelet construction or indexing error.
    #[error(transparent)]
    Wavelet(#[from] WaveletError),

    /// Nearest-neighbor ball statistics error.
    #[error(transparent)]
    Knn(#[from] KnnError),

    /// Returned when the sample dimension does not match the wavelet spec.
    #[error("expected {expected} dimensions, got {got}")]
    DimensionMismatch {
        /// Number of axes of the wavelet spec.
        expected: usize,
        /// Dimension of the offending input.
        got: usize,
    },

    /// Returned for an unsupported option combination or parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Returned when the selected coefficients have a zero norm.
    #[error("degenerate model: coefficient norm is zero")]
    DegenerateModel,

    /// Returned when a leave-one-out reconstruction is non-zero but its
    /// norm is zero.
    #[error("inconsistent state at sample {sample}: g_ring = {g_ring} with zero norm")]
    InconsistentState {
        /// Index of the left-out sample.
        sample: usize,
        /// Leave-one-out reconstruction value.
        g_ring: f64,
    },

    /// Returned when no samples are given.
    #[error("no samples provided")]
    EmptySamples,

    /// Returned when the sample buffer length is not a multiple of the
    /// dimension.
    #[error("sample buffer length {len} is not divisible by dimension {dim}")]
    SamplesShapeMismatch {
        /// Length of the buffer.
        len: usize,
        /// Requested dimension.
        dim: usize,
    },

    /// Returned when a sample coordinate is NaN or infinite.
    #[error("non-finite coordinate in sample {sample}")]
    NonFiniteSamples {
        /// Index of the first offending sample.
        sample: usize,
    },
}

impl WdeError {
    /// Returns `true` if the wavelet family has no support formula.
    pub fn is_unsupported_family(&self) -> bool {
        matches!(
            self,
            WdeError::Wavelet(WaveletError::UnsupportedFamily { .. })
        )
    }
}
