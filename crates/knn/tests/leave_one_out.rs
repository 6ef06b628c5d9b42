//! Leave-one-out ball weight integration tests.

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use wde_knn::BallsInfo;

fn gaussian_points(n: usize, dim: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n * dim).map(|_| normal.sample(&mut rng)).collect()
}

/// Sum of the leave-one-out vector equals the full sum minus the excluded
/// sample plus the promotion deltas.
#[test]
fn leave_one_out_sum_2d() {
    let points = gaussian_points(12, 2, 7);
    let balls = BallsInfo::compute(&points, 2, 1).unwrap();
    let full: f64 = balls.sqrt_vol_k().iter().sum();

    for i in 0..balls.n() {
        let loo: f64 = balls.leave_one_out(i).unwrap().iter().sum();
        let delta: f64 = balls
            .promoted(i)
            .iter()
            .map(|&p| balls.sqrt_vol_k_plus_1()[p] - balls.sqrt_vol_k()[p])
            .sum();
        assert_abs_diff_eq!(loo, full - balls.sqrt_vol_k()[i] + delta, epsilon = 1e-12);
    }
}

/// The leave-one-out vector matches a fresh computation without the point.
#[test]
fn leave_one_out_matches_recomputation() {
    let dim = 2;
    let points = gaussian_points(15, dim, 11);
    let balls = BallsInfo::compute(&points, dim, 2).unwrap();

    for i in [0, 4, 14] {
        let loo = balls.leave_one_out(i).unwrap();
        let reduced: Vec<f64> = points
            .chunks_exact(dim)
            .enumerate()
            .filter(|&(j, _)| j != i)
            .flat_map(|(_, row)| row.iter().copied())
            .collect();
        let fresh = BallsInfo::compute(&reduced, dim, 2).unwrap();

        let kept: Vec<f64> = (0..balls.n()).filter(|&j| j != i).map(|j| loo[j]).collect();
        for (got, want) in kept.iter().zip(fresh.sqrt_vol_k()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }
}

#[test]
fn kth_ball_never_exceeds_next() {
    for dim in 1..=3 {
        let points = gaussian_points(40, dim, 3);
        let balls = BallsInfo::compute(&points, dim, 3).unwrap();
        for (a, b) in balls.sqrt_vol_k().iter().zip(balls.sqrt_vol_k_plus_1()) {
            assert!(a <= b);
        }
    }
}

#[test]
fn neighbors_exclude_self() {
    let points = gaussian_points(30, 3, 5);
    let balls = BallsInfo::compute(&points, 3, 2).unwrap();
    for i in 0..balls.n() {
        assert_eq!(balls.neighbors(i).len(), 3);
        assert!(!balls.neighbors(i).contains(&i));
        assert_eq!(balls.last_neighbor(i), balls.neighbors(i)[2]);
    }
}

#[test]
fn results_are_deterministic() {
    let points = gaussian_points(64, 2, 99);
    let a = BallsInfo::compute(&points, 2, 1).unwrap();
    let b = BallsInfo::compute(&points, 2, 1).unwrap();
    assert_eq!(a.sqrt_vol_k(), b.sqrt_vol_k());
    for i in 0..a.n() {
        assert_eq!(a.neighbors(i), b.neighbors(i));
        assert_eq!(a.promoted(i), b.promoted(i));
    }
}
