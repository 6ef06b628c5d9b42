//! Error types for the wde-wavelet crate.

/// Error type for all fallible operations in the wde-wavelet crate.
///
/// Covers name resolution, family support lookup and shape checks on
/// tensor-product basis indices.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WaveletError {
    /// Returned when a wavelet name does not resolve in the filter tables.
    #[error("unknown wavelet: {0}")]
    UnknownWavelet(String),

    /// Returned when a wavelet resolves but its family has no support formula.
    #[error("wavelet {name} belongs to family {family}, which has no known support")]
    UnsupportedFamily {
        /// Normalized wavelet name.
        name: String,
        /// Family name.
        family: String,
    },

    /// Returned when a dyadic scale exponent is too large to represent exactly.
    #[error("scale exponent {exponent} exceeds the maximum of {max}")]
    LevelTooHigh {
        /// Requested exponent `j0 + j`.
        exponent: u32,
        /// Largest supported exponent.
        max: u32,
    },

    /// Returned when a basis index or point has the wrong number of axes.
    #[error("dimension mismatch: expected {expected} axes, got {got}")]
    DimensionMismatch {
        /// Number of axes of the tensor wavelet.
        expected: usize,
        /// Number of axes supplied.
        got: usize,
    },

    /// Returned when a tensor wavelet is built from an empty name list.
    #[error("at least one wavelet is required")]
    EmptyWaveletList,
}
