//! Estimator and selection configuration.

use std::fmt;
use std::str::FromStr;

use wde_wavelet::MAX_SCALE_EXPONENT;

use crate::error::WdeError;

/// Number of resolution levels scanned by the level search (`0..7`).
pub const LEVEL_SEARCH_LEVELS: u32 = 7;

/// Wavelet name and base level `j0` for one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveSpec {
    name: String,
    j0: u32,
}

impl WaveSpec {
    /// Creates an axis spec.
    pub fn new(name: impl Into<String>, j0: u32) -> Self {
        Self {
            name: name.into(),
            j0,
        }
    }

    /// Wavelet name, e.g. `"db2"` or `"bior2.2"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base level.
    pub fn j0(&self) -> u32 {
        self.j0
    }
}

/// Configuration of a [`WaveletDensityEstimator`](crate::WaveletDensityEstimator).
///
/// # Example
///
/// ```
/// use wde_estimator::{WaveSpec, WdeConfig};
///
/// let config = WdeConfig::new(vec![WaveSpec::new("db2", 2), WaveSpec::new("sym3", 1)])
///     .with_k(2)
///     .with_delta_j(1);
///
/// assert_eq!(config.dim(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WdeConfig {
    /// One wavelet spec per axis.
    waves: Vec<WaveSpec>,
    /// Neighbor order for the ball volumes.
    k: usize,
    /// Number of detail levels above `j0`; zero means scaling functions only.
    delta_j: u32,
}

impl WdeConfig {
    /// Creates a configuration with the given axis specs.
    ///
    /// Defaults: `k = 1`, `delta_j = 0`.
    pub fn new(waves: Vec<WaveSpec>) -> Self {
        Self {
            waves,
            k: 1,
            delta_j: 0,
        }
    }

    /// Sets the neighbor order.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the number of detail levels.
    pub fn with_delta_j(mut self, delta_j: u32) -> Self {
        self.delta_j = delta_j;
        self
    }

    /// Axis specs.
    pub fn waves(&self) -> &[WaveSpec] {
        &self.waves
    }

    /// Neighbor order.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of detail levels.
    pub fn delta_j(&self) -> u32 {
        self.delta_j
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.waves.len()
    }

    /// Wavelet names, one per axis.
    pub fn names(&self) -> Vec<&str> {
        self.waves.iter().map(WaveSpec::name).collect()
    }

    /// Base levels, one per axis.
    pub fn j0s(&self) -> Vec<u32> {
        self.waves.iter().map(WaveSpec::j0).collect()
    }

    /// Validates this configuration.
    ///
    /// Returns [`WdeError::InvalidConfiguration`] if there are no axes,
    /// `k < 1`, or `j0 + delta_j` exceeds the largest dyadic exponent.
    pub fn validate(&self) -> Result<(), WdeError> {
        if self.waves.is_empty() {
            return Err(WdeError::InvalidConfiguration(
                "at least one wave spec is required".to_string(),
            ));
        }
        if self.k < 1 {
            return Err(WdeError::InvalidConfiguration(format!(
                "k must be >= 1, got {}",
                self.k
            )));
        }
        for w in &self.waves {
            if w.j0 + self.delta_j > MAX_SCALE_EXPONENT {
                return Err(WdeError::InvalidConfiguration(format!(
                    "j0 + delta_j = {} exceeds {MAX_SCALE_EXPONENT} for {}",
                    w.j0 + self.delta_j,
                    w.name
                )));
            }
        }
        Ok(())
    }
}

/// Loss driving the cross-validated risk curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Loss {
    /// Running `½·Σc·c̃ − Σcontribution` target.
    #[default]
    Improved,
    /// Running sum of contributions.
    Original,
    /// Running sum of contributions divided by the running norm.
    Normed,
}

/// Ranking criterion for detail coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CoeffOrdering {
    /// Leave-one-out risk contribution.
    #[default]
    QTerm,
    /// `|c| / √(j + 1)`.
    Traditional,
}

/// Score used by the level search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LevelMode {
    /// `ω·Σ √(g̊²/‖g̊‖²)·v`.
    #[default]
    Normed,
    /// `2ω·Σ |g̊|·v − Σ c·c̃`.
    Diff,
}

/// Strategy to pick the number of detail coefficients from the risk curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cutoff {
    /// Position of the maximum of the smoothed curve.
    #[default]
    MaxSmoothed,
    /// First position where the raw curve exceeds `min(max − 0.001, 1)`.
    ClosestToOne,
}

macro_rules! named_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = WdeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(WdeError::InvalidConfiguration(format!(
                        concat!("unknown ", $what, " '{}', expected one of: {}"),
                        other,
                        [$($name),+].join(", ")
                    ))),
                }
            }
        }
    };
}

named_enum!(Loss, "loss", {
    Improved => "improved",
    Original => "original",
    Normed => "normed",
});

named_enum!(CoeffOrdering, "ordering", {
    QTerm => "qterm",
    Traditional => "traditional",
});

named_enum!(LevelMode, "level mode", {
    Normed => "normed",
    Diff => "diff",
});

named_enum!(Cutoff, "cutoff", {
    MaxSmoothed => "max-smoothed",
    ClosestToOne => "closest-to-one",
});

/// Every supported `(loss, ordering)` pair.
///
/// The normed loss only pairs with the traditional ordering.
pub fn valid_options() -> Vec<(Loss, CoeffOrdering)> {
    let mut out = Vec::new();
    for loss in [Loss::Improved, Loss::Original, Loss::Normed] {
        for ordering in [CoeffOrdering::QTerm, CoeffOrdering::Traditional] {
            if loss == Loss::Normed && ordering != CoeffOrdering::Traditional {
                continue;
            }
            out.push((loss, ordering));
        }
    }
    out
}

/// Configuration of the cross-validated subset selection.
///
/// # Example
///
/// ```
/// use wde_estimator::{CoeffOrdering, CvConfig, Loss};
///
/// let cv = CvConfig::new(Loss::Original, CoeffOrdering::Traditional).with_smoothing_window(7);
/// assert!(cv.validate().is_ok());
///
/// let bad = CvConfig::new(Loss::Normed, CoeffOrdering::QTerm);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvConfig {
    loss: Loss,
    ordering: CoeffOrdering,
    smoothing_window: usize,
    cutoff: Cutoff,
}

impl CvConfig {
    /// Creates a configuration for a loss and ordering.
    ///
    /// Defaults: `smoothing_window = 5`, `cutoff = MaxSmoothed`.
    pub fn new(loss: Loss, ordering: CoeffOrdering) -> Self {
        Self {
            loss,
            ordering,
            smoothing_window: 5,
            cutoff: Cutoff::MaxSmoothed,
        }
    }

    /// Sets the moving-average window of the risk curve.
    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.smoothing_window = window;
        self
    }

    /// Sets the cutoff strategy.
    pub fn with_cutoff(mut self, cutoff: Cutoff) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Loss.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Ordering.
    pub fn ordering(&self) -> CoeffOrdering {
        self.ordering
    }

    /// Smoothing window width.
    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    /// Cutoff strategy.
    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Validates this configuration.
    ///
    /// Returns [`WdeError::InvalidConfiguration`] for the `(Normed, QTerm)`
    /// pair or an even or zero smoothing window.
    pub fn validate(&self) -> Result<(), WdeError> {
        if !valid_options().contains(&(self.loss, self.ordering)) {
            return Err(WdeError::InvalidConfiguration(format!(
                "loss '{}' does not support ordering '{}'",
                self.loss, self.ordering
            )));
        }
        if self.smoothing_window == 0 || self.smoothing_window.is_multiple_of(2) {
            return Err(WdeError::InvalidConfiguration(format!(
                "smoothing window must be odd and >= 1, got {}",
                self.smoothing_window
            )));
        }
        Ok(())
    }
}

impl Default for CvConfig {
    fn default() -> Self {
        Self::new(Loss::default(), CoeffOrdering::default())
    }
}
