//! Nearest-neighbor ball volumes and leave-one-out weights.

use std::f64::consts::PI;

use rayon::prelude::*;
use statrs::function::gamma::gamma;
use tracing::debug;

use crate::distance::sq_distances;
use crate::error::KnnError;
use crate::select::select_k_nearest;

/// Square root of the volume of the unit ball in `dim` dimensions:
/// `√(π^(d/2) / Γ(d/2 + 1))`.
pub fn sqrt_unit_ball_volume(dim: usize) -> f64 {
    let half = dim as f64 / 2.0;
    (PI.powf(half) / gamma(half + 1.0)).sqrt()
}

/// Reusable per-thread buffers for neighbor queries.
#[derive(Debug, Clone, Default)]
struct Scratch {
    d2_sq: Vec<f64>,
    pairs: Vec<(f64, usize)>,
    nn_indices: Vec<usize>,
    nn_dists: Vec<f64>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            d2_sq: vec![0.0; n],
            pairs: Vec::with_capacity(n),
            nn_indices: Vec::new(),
            nn_dists: Vec::new(),
        }
    }
}

/// Per-sample k-th and (k+1)-th nearest-neighbor ball statistics.
///
/// The square-rooted ball volume of sample `i` at distance `r` is
/// `r^(d/2) · √(unit ball volume)`. Neighbors exclude the sample itself.
///
/// # Example
///
/// ```
/// use wde_knn::BallsInfo;
///
/// let points = [0.0, 1.0, 3.0, 6.0];
/// let balls = BallsInfo::compute(&points, 1, 1).unwrap();
/// // Nearest neighbor of 0.0 is 1.0, the second nearest is 3.0.
/// assert_eq!(balls.neighbors(0), &[1, 2]);
/// assert!((balls.sqrt_vol_k()[0] - 2f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BallsInfo {
    dim: usize,
    k: usize,
    sqrt_vol_k: Vec<f64>,
    sqrt_vol_k1: Vec<f64>,
    neighbors: Vec<usize>,
    promoted: Vec<Vec<usize>>,
}

impl BallsInfo {
    /// Queries the `k + 1` nearest neighbors of every point.
    ///
    /// `points` is row-major with `n_vars` columns.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`KnnError::PointsShapeMismatch`] | `n_vars == 0` or length not divisible |
    /// | [`KnnError::EmptyPoints`] | no points |
    /// | [`KnnError::InvalidK`] | `k == 0` |
    /// | [`KnnError::InsufficientPoints`] | fewer than `k + 2` points |
    /// | [`KnnError::NonFiniteInput`] | NaN or infinite coordinate |
    #[tracing::instrument(skip(points), fields(n = points.len() / n_vars.max(1)))]
    pub fn compute(points: &[f64], n_vars: usize, k: usize) -> Result<Self, KnnError> {
        let n = validate_inputs(points, n_vars, k)?;
        let half_dim = n_vars as f64 / 2.0;
        let unit = sqrt_unit_ball_volume(n_vars);

        let rows: Vec<(Vec<usize>, f64, f64)> = (0..n)
            .into_par_iter()
            .map_init(
                || Scratch::new(n),
                |scratch, i| {
                    let target = &points[i * n_vars..(i + 1) * n_vars];
                    sq_distances(points, n_vars, target, &mut scratch.d2_sq);
                    select_k_nearest(
                        &scratch.d2_sq,
                        k + 1,
                        i,
                        &mut scratch.pairs,
                        &mut scratch.nn_indices,
                        &mut scratch.nn_dists,
                    );
                    let dk = scratch.nn_dists[k - 1];
                    let dk1 = scratch.nn_dists[k];
                    (
                        scratch.nn_indices.clone(),
                        dk.powf(half_dim) * unit,
                        dk1.powf(half_dim) * unit,
                    )
                },
            )
            .collect();

        let mut neighbors = Vec::with_capacity(n * (k + 1));
        let mut sqrt_vol_k = Vec::with_capacity(n);
        let mut sqrt_vol_k1 = Vec::with_capacity(n);
        let mut promoted = vec![Vec::new(); n];
        for (p, (nn, vk, vk1)) in rows.into_iter().enumerate() {
            for &m in &nn[..k] {
                promoted[m].push(p);
            }
            neighbors.extend(nn);
            sqrt_vol_k.push(vk);
            sqrt_vol_k1.push(vk1);
        }

        debug!(n, dim = n_vars, k, "computed nearest-neighbor balls");

        Ok(Self {
            dim: n_vars,
            k,
            sqrt_vol_k,
            sqrt_vol_k1,
            neighbors,
            promoted,
        })
    }

    /// Number of points.
    pub fn n(&self) -> usize {
        self.sqrt_vol_k.len()
    }

    /// Number of coordinates per point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Neighbor order.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Square-rooted k-th neighbor ball volumes.
    pub fn sqrt_vol_k(&self) -> &[f64] {
        &self.sqrt_vol_k
    }

    /// Square-rooted (k+1)-th neighbor ball volumes.
    pub fn sqrt_vol_k_plus_1(&self) -> &[f64] {
        &self.sqrt_vol_k1
    }

    /// The `k + 1` nearest neighbors of sample `i`, nearest first.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        let w = self.k + 1;
        &self.neighbors[i * w..(i + 1) * w]
    }

    /// The (k+1)-th nearest neighbor of sample `i`.
    pub fn last_neighbor(&self, i: usize) -> usize {
        self.neighbors[i * (self.k + 1) + self.k]
    }

    /// Samples whose k nearest neighbors include `i`, ascending.
    ///
    /// Removing `i` moves each of them to its (k+1)-th ball.
    pub fn promoted(&self, i: usize) -> &[usize] {
        &self.promoted[i]
    }

    /// Ball weights with sample `i` left out.
    ///
    /// Entry `i` is zero, samples in [`promoted(i)`](Self::promoted) take
    /// their (k+1)-th volume and every other sample keeps its k-th volume.
    ///
    /// # Errors
    ///
    /// [`KnnError::IndexOutOfRange`] if `i >= n`.
    pub fn leave_one_out(&self, i: usize) -> Result<Vec<f64>, KnnError> {
        let n = self.n();
        if i >= n {
            return Err(KnnError::IndexOutOfRange { index: i, n });
        }
        let mut weights = self.sqrt_vol_k.clone();
        for &p in &self.promoted[i] {
            weights[p] = self.sqrt_vol_k1[p];
        }
        weights[i] = 0.0;
        Ok(weights)
    }
}

/// Validates all inputs and returns the number of points.
fn validate_inputs(points: &[f64], n_vars: usize, k: usize) -> Result<usize, KnnError> {
    if n_vars == 0 {
        return Err(KnnError::PointsShapeMismatch {
            len: points.len(),
            n_vars,
        });
    }
    if points.is_empty() {
        return Err(KnnError::EmptyPoints);
    }
    if !points.len().is_multiple_of(n_vars) {
        return Err(KnnError::PointsShapeMismatch {
            len: points.len(),
            n_vars,
        });
    }
    if k < 1 {
        return Err(KnnError::InvalidK { k });
    }
    let n = points.len() / n_vars;
    if n < k + 2 {
        return Err(KnnError::InsufficientPoints { n, k });
    }
    if points.iter().any(|v| !v.is_finite()) {
        return Err(KnnError::NonFiniteInput { input: "points" });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_ball_volumes() {
        assert_abs_diff_eq!(sqrt_unit_ball_volume(1).powi(2), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sqrt_unit_ball_volume(2).powi(2), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(
            sqrt_unit_ball_volume(3).powi(2),
            4.0 * PI / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn one_dimensional_hand_computed() {
        let points = [0.0, 1.0, 3.0, 6.0];
        let balls = BallsInfo::compute(&points, 1, 1).unwrap();
        // k-th distances: 1, 1, 2, 3; (k+1)-th: 3, 2, 3, 5
        let want_k: [f64; 4] = [1.0, 1.0, 2.0, 3.0];
        let want_k1: [f64; 4] = [3.0, 2.0, 3.0, 5.0];
        for i in 0..4 {
            assert_abs_diff_eq!(
                balls.sqrt_vol_k()[i],
                (2.0 * want_k[i]).sqrt(),
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(
                balls.sqrt_vol_k_plus_1()[i],
                (2.0 * want_k1[i]).sqrt(),
                epsilon = 1e-12
            );
        }
        assert_eq!(balls.neighbors(2), &[1, 0]);
        assert_eq!(balls.last_neighbor(3), 1);
        // Nearest neighbors: 0→1, 1→0, 2→1, 3→2
        assert_eq!(balls.promoted(1), &[0, 2]);
        assert_eq!(balls.promoted(3), &[] as &[usize]);
    }

    #[test]
    fn leave_one_out_promotes_reverse_neighbors() {
        let points = [0.0, 1.0, 3.0, 6.0];
        let balls = BallsInfo::compute(&points, 1, 1).unwrap();
        let w = balls.leave_one_out(1).unwrap();
        assert_eq!(w[1], 0.0);
        assert_eq!(w[0], balls.sqrt_vol_k_plus_1()[0]);
        assert_eq!(w[2], balls.sqrt_vol_k_plus_1()[2]);
        assert_eq!(w[3], balls.sqrt_vol_k()[3]);
        assert!(matches!(
            balls.leave_one_out(4).unwrap_err(),
            KnnError::IndexOutOfRange { index: 4, n: 4 }
        ));
    }

    #[test]
    fn validation_errors() {
        assert!(matches!(
            BallsInfo::compute(&[], 1, 1).unwrap_err(),
            KnnError::EmptyPoints
        ));
        assert!(matches!(
            BallsInfo::compute(&[1.0, 2.0, 3.0], 2, 1).unwrap_err(),
            KnnError::PointsShapeMismatch { len: 3, n_vars: 2 }
        ));
        assert!(matches!(
            BallsInfo::compute(&[1.0, 2.0, 3.0], 0, 1).unwrap_err(),
            KnnError::PointsShapeMismatch { .. }
        ));
        assert!(matches!(
            BallsInfo::compute(&[1.0, 2.0, 3.0], 1, 0).unwrap_err(),
            KnnError::InvalidK { k: 0 }
        ));
        assert!(matches!(
            BallsInfo::compute(&[1.0, 2.0, 3.0], 1, 2).unwrap_err(),
            KnnError::InsufficientPoints { n: 3, k: 2 }
        ));
        assert!(matches!(
            BallsInfo::compute(&[1.0, f64::NAN, 3.0], 1, 1).unwrap_err(),
            KnnError::NonFiniteInput { input: "points" }
        ));
    }
}
