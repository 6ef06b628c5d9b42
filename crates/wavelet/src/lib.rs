//! # wde-wavelet
//!
//! Continuous wavelet basis functions for density estimation, built from
//! embedded filter tables by cascade refinement.
//!
//! ## Construction Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["FilterBank::from_name(name)?"] -->|"family formulas"| B["SupportInfo"]
//!     A -->|"cascade"| C["SampledFunction (phi)"]
//!     C -->|"two-scale relation"| D["SampledFunction (psi)"]
//!     B --> E["Wavelet"]
//!     C --> E
//!     D --> E
//!     E -->|"one per axis"| F["TensorWavelet"]
//!     F --> G[".fun_ix() / .supp_ix()"]
//!     F --> H[".z_range() → TranslationLattice"]
//! ```
//!
//! ## Supported Families
//!
//! | Family | Names | Orthogonal |
//! |--------|-------|------------|
//! | Daubechies | `db1`..`db5` | yes |
//! | Symlets | `sym2`..`sym4` | yes |
//! | Coiflets | `coif1`, `coif2` | yes |
//! | Biorthogonal | `bior1.1`, `bior1.3`, `bior2.2`, `bior2.4`, `bior3.1`, `bior3.3` | no |
//! | Reverse biorthogonal | `rbio` with the same orders | no |
//!
//! `haar` resolves to its own family, which has no support formula, so
//! [`Wavelet::new`] rejects it with [`WaveletError::UnsupportedFamily`].
//!
//! ## Quick Start
//!
//! ```
//! use wde_wavelet::{TensorWavelet, Which, dyadic_scales};
//!
//! let wave = TensorWavelet::new(&["db2", "db2"]).unwrap();
//! let scales = dyadic_scales(&[1, 1], 0).unwrap();
//! let qq = wave.scaling_quadrant().to_vec();
//! let f = wave.fun_ix(Which::Base, &qq, &scales, &[0, 0]).unwrap();
//! assert!(f.eval(&[0.5, 0.5]).unwrap() > 0.0);
//! ```

mod cascade;
mod error;
mod filter;
mod support;
mod tensor;
mod wavelet;

pub use cascade::{REFINEMENT_LEVEL, SampledFunction};
pub use error::WaveletError;
pub use filter::{FilterBank, WaveletFamily, wavelist};
pub use support::{Quad, Support, SupportInfo, Which, support_info};
pub use tensor::{
    MAX_SCALE_EXPONENT, TensorFunction, TensorSupport, TensorWavelet, TranslationLattice,
    dyadic_scales, scale_norm,
};
pub use wavelet::{Dilated, Wavelet};
