//! Squared Euclidean distance computation.

/// Computes squared Euclidean distances from `target` to every point.
///
/// For each point row `i`:
/// ```text
/// out[i] = Σⱼ (points[i × n_vars + j] − target[j])²
/// ```
///
/// Dispatches to specialised implementations for 1D and 2D cases.
///
/// # Panics
///
/// Debug-asserts that `points.len() % n_vars == 0`, `target.len() == n_vars`
/// and `out.len() == points.len() / n_vars`.
pub(crate) fn sq_distances(points: &[f64], n_vars: usize, target: &[f64], out: &mut [f64]) {
    debug_assert_eq!(points.len() % n_vars, 0);
    debug_assert_eq!(target.len(), n_vars);
    debug_assert_eq!(out.len(), points.len() / n_vars);

    match n_vars {
        1 => sq_dist_1d(points, target[0], out),
        2 => sq_dist_2d(points, target, out),
        _ => sq_dist_nd(points, n_vars, target, out),
    }
}

#[inline]
fn sq_dist_1d(points: &[f64], target: f64, out: &mut [f64]) {
    for (o, &p) in out.iter_mut().zip(points.iter()) {
        let d = p - target;
        *o = d * d;
    }
}

#[inline]
fn sq_dist_2d(points: &[f64], target: &[f64], out: &mut [f64]) {
    let (t0, t1) = (target[0], target[1]);
    for (o, row) in out.iter_mut().zip(points.chunks_exact(2)) {
        let d0 = row[0] - t0;
        let d1 = row[1] - t1;
        *o = d0 * d0 + d1 * d1;
    }
}

#[inline]
fn sq_dist_nd(points: &[f64], n_vars: usize, target: &[f64], out: &mut [f64]) {
    for (o, row) in out.iter_mut().zip(points.chunks_exact(n_vars)) {
        *o = row
            .iter()
            .zip(target)
            .map(|(&p, &t)| (p - t) * (p - t))
            .sum();
    }
}
