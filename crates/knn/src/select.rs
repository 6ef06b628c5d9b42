//! Top-k nearest neighbor selection.

use std::cmp::Ordering;

/// Selects the `k` nearest neighbors of point `exclude` from its squared
/// distances, skipping `exclude` itself.
///
/// Ties are broken by index so that results do not depend on sort
/// stability. Duplicate points at distance zero are kept as neighbors.
///
/// Writes results into caller-provided buffers:
/// - `pairs`: scratch buffer for (distance, index) pairs
/// - `nn_indices`: indices of the k nearest neighbors (ascending distance)
/// - `nn_dists`: Euclidean distances of the k nearest neighbors
///
/// # Panics
///
/// Debug-asserts that `k >= 1` and `k < d2_sq.len()`.
pub(crate) fn select_k_nearest(
    d2_sq: &[f64],
    k: usize,
    exclude: usize,
    pairs: &mut Vec<(f64, usize)>,
    nn_indices: &mut Vec<usize>,
    nn_dists: &mut Vec<f64>,
) {
    debug_assert!(k >= 1);
    debug_assert!(k < d2_sq.len());

    pairs.clear();
    pairs.extend(
        d2_sq
            .iter()
            .copied()
            .enumerate()
            .filter(|&(i, _)| i != exclude)
            .map(|(i, d)| (d, i)),
    );

    // NaN-safe via Ordering::Equal fallback
    pairs.sort_unstable_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    pairs.truncate(k);

    nn_indices.clear();
    nn_dists.clear();
    for &(d2, idx) in pairs.iter() {
        nn_indices.push(idx);
        nn_dists.push(d2.sqrt());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Helper to avoid repeating buffer setup in every test.
    fn run(d2_sq: &[f64], k: usize, exclude: usize) -> (Vec<usize>, Vec<f64>) {
        let mut pairs = Vec::new();
        let mut nn_indices = Vec::new();
        let mut nn_dists = Vec::new();
        select_k_nearest(d2_sq, k, exclude, &mut pairs, &mut nn_indices, &mut nn_dists);
        (nn_indices, nn_dists)
    }

    #[test]
    fn self_is_skipped() {
        let (indices, dists) = run(&[9.0, 0.0, 4.0], 1, 1);
        assert_eq!(indices, vec![2]);
        assert_abs_diff_eq!(dists[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn all_others_sorted() {
        let (indices, dists) = run(&[4.0, 1.0, 0.0, 9.0], 3, 2);
        assert_eq!(indices, vec![1, 0, 3]);
        let expected = [1.0, 2.0, 3.0];
        for (got, want) in dists.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn ties_break_by_index() {
        let (indices, _) = run(&[0.0, 4.0, 4.0, 1.0], 2, 0);
        assert_eq!(indices, vec![3, 1]);
    }

    #[test]
    fn duplicate_point_is_a_neighbor() {
        let (indices, dists) = run(&[0.0, 0.0, 5.0], 1, 0);
        assert_eq!(indices, vec![1]);
        assert_eq!(dists[0], 0.0);
    }

    #[test]
    fn buffer_clearing() {
        let mut pairs = Vec::new();
        let mut nn_indices = Vec::new();
        let mut nn_dists = Vec::new();

        select_k_nearest(
            &[9.0, 1.0, 4.0, 0.0],
            2,
            3,
            &mut pairs,
            &mut nn_indices,
            &mut nn_dists,
        );
        assert_eq!(nn_indices, vec![1, 2]);

        // Second call with different data: buffers must be cleared internally
        select_k_nearest(&[0.0, 16.0, 25.0], 1, 0, &mut pairs, &mut nn_indices, &mut nn_dists);
        assert_eq!(nn_indices, vec![1]);
        assert_abs_diff_eq!(nn_dists[0], 4.0, epsilon = 1e-12);
        assert_eq!(nn_dists.len(), 1);
    }
}
