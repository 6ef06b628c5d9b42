//! # wde-estimator
//!
//! Square-root wavelet density estimation with nearest-neighbor bias
//! correction. The square root of the density is expanded in a tensor
//! wavelet basis; coefficients are weighted sums over the samples using
//! k-NN ball volumes, and the density is the normalized square of the
//! expansion.
//!
//! ## Fitting Strategies
//!
//! | Method | Selection | Output |
//! |--------|-----------|--------|
//! | [`fit`](WaveletDensityEstimator::fit) | every coefficient at `j0..j0+delta_j` | [`Density`] |
//! | [`cvfit`](WaveletDensityEstimator::cvfit) | ranked detail coefficients, cross-validated cutoff | [`CvSelection`] |
//! | [`mdlfit`](WaveletDensityEstimator::mdlfit) | contribution-ranked prefix | [`MdlSelection`] |
//! | [`best_j`](WaveletDensityEstimator::best_j) | scaling-only level `0..7` | [`LevelSelection`] |
//! | [`best_c`](WaveletDensityEstimator::best_c) | hard threshold on `|c|/√(j+1)` | [`ThresholdSelection`] |
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["Samples"] --> B["BallsInfo (wde-knn)"]
//!     A --> C["BasisTable per block"]
//!     B --> D["CoefficientEngine"]
//!     C --> D
//!     D --> E["FitState (cached by fingerprint)"]
//!     E --> F["cv / mdl / threshold / level"]
//!     F --> G["Density"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use wde_estimator::{Samples, WaveSpec, WaveletDensityEstimator, WdeConfig};
//!
//! let xs: Vec<f64> = (0..200).map(|i| (0.5 + i as f64 * 0.618_034).fract()).collect();
//! let samples = Samples::new(xs, 1).unwrap();
//!
//! let mut wde = WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 2)])).unwrap();
//! let density = wde.fit(&samples).unwrap();
//! assert!(density.eval(&[0.25]).unwrap() > 0.0);
//! ```

mod basis;
mod config;
mod cv;
mod density;
mod engine;
mod error;
mod estimator;
mod key;
mod level;
mod mdl;
mod samples;
mod state;
mod threshold;

pub use config::{
    CoeffOrdering, Cutoff, CvConfig, LEVEL_SEARCH_LEVELS, LevelMode, Loss, WaveSpec, WdeConfig,
    valid_options,
};
pub use cv::CvSelection;
pub use density::Density;
pub use engine::{Terms, omega};
pub use error::WdeError;
pub use estimator::{FitInfo, FitMethod, WaveletDensityEstimator};
pub use key::{Coeff, CoeffKey, CoeffMap};
pub use level::{LevelScore, LevelSelection};
pub use mdl::{MDL_TOLERANCE, MdlSelection};
pub use samples::Samples;
pub use threshold::ThresholdSelection;
