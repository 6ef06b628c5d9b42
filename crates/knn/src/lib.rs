//! Nearest-neighbor ball statistics for density estimation.
//!
//! For every sample the crate finds its k-th and (k+1)-th nearest
//! neighbors (excluding itself) and converts their distances into
//! square-rooted ball volumes, used as stochastic quadrature weights:
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | Unit ball | `V_d = π^(d/2) / Γ(d/2 + 1)` |
//! | Ball weight | `r^(d/2) · √V_d` |
//! | Leave-one-out | (k+1)-th weight for samples whose k-NN set held the removed point |
//!
//! # Quick start
//!
//! ```
//! use wde_knn::BallsInfo;
//!
//! let points = vec![0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 3.0, 3.0];
//! let balls = BallsInfo::compute(&points, 2, 1).unwrap();
//! assert_eq!(balls.n(), 4);
//! assert!(balls
//!     .sqrt_vol_k()
//!     .iter()
//!     .zip(balls.sqrt_vol_k_plus_1())
//!     .all(|(a, b)| a <= b));
//!
//! let loo = balls.leave_one_out(0).unwrap();
//! assert_eq!(loo[0], 0.0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! BallsInfo::compute()
//!   ├─ validate inputs
//!   └─ per sample (rayon, per-thread scratch)
//!        ├─ sq_distances()      (distance.rs)
//!        └─ select_k_nearest()  (select.rs)
//! ```
//!
//! The neighbor search is brute force, `O(n²)` distance evaluations.

pub mod balls;
pub mod error;

pub(crate) mod distance;
pub(crate) mod select;

pub use balls::{BallsInfo, sqrt_unit_ball_volume};
pub use error::KnnError;
