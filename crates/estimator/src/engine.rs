//! Empirical coefficients from ball-weighted basis sums.
//!
//! With `vᵢ` the square-rooted k-th neighbor ball volume of sample `i`:
//!
//! ```text
//! coeff(z) = ω(n,k) · Σᵢ dual_z(xᵢ) · vᵢ
//! dual(z)  = ω(n,k) · Σᵢ base_z(xᵢ) · vᵢ
//! ω(n,k)   = √(n−1) · Γ(k) / Γ(k+½) / n
//! ```
//!
//! Leave-one-out sums drop sample `i` and move every sample whose k
//! nearest neighbors held `i` to its (k+1)-th ball, scaled by `ω(n−1,k)`.

use std::collections::BTreeMap;

use statrs::function::gamma::ln_gamma;
use wde_knn::BallsInfo;

use crate::basis::BasisTable;
use crate::key::Coeff;

/// Bias correction turning a k-NN ball-volume sum over `n` samples into
/// an unbiased estimate of `∫ f·√p`.
pub fn omega(n: usize, k: usize) -> f64 {
    let n = n as f64;
    let k = k as f64;
    (n - 1.0).sqrt() * (ln_gamma(k) - ln_gamma(k + 0.5)).exp() / n
}

/// The three decomposed risk terms of one coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terms {
    /// `ω(n−1)/ω(n) · coeff · dual`.
    pub term1: f64,
    /// Leave-one-out self-interaction correction.
    pub term2: f64,
    /// Neighbor-pair cross term weighted by ball-volume differences.
    pub term3: f64,
    /// `coeff · dual`.
    pub norm2: f64,
}

impl Terms {
    /// `term1 − term2 + term3`.
    pub fn contribution(&self) -> f64 {
        self.term1 - self.term2 + self.term3
    }
}

/// Coefficient computations over one dataset's ball statistics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CoefficientEngine<'a> {
    balls: &'a BallsInfo,
    orthogonal: bool,
    omega_n: f64,
    omega_n1: f64,
}

impl<'a> CoefficientEngine<'a> {
    pub(crate) fn new(balls: &'a BallsInfo, orthogonal: bool) -> Self {
        let n = balls.n();
        let k = balls.k();
        Self {
            balls,
            orthogonal,
            omega_n: omega(n, k),
            omega_n1: omega(n - 1, k),
        }
    }

    pub(crate) fn omega_n(&self) -> f64 {
        self.omega_n
    }

    pub(crate) fn omega_n1(&self) -> f64 {
        self.omega_n1
    }

    /// Unscaled sums `(Σ dual·v, Σ base·v)` per translation.
    pub(crate) fn sums(&self, table: &BasisTable) -> Vec<(f64, f64)> {
        let v = self.balls.sqrt_vol_k();
        (0..table.len())
            .map(|key| {
                table.column(key).iter().fold((0.0, 0.0), |(sd, sb), e| {
                    (sd + e.dual * v[e.sample], sb + e.base * v[e.sample])
                })
            })
            .collect()
    }

    /// Coefficients of every translation of the table.
    pub(crate) fn coefficients(&self, table: &BasisTable) -> Vec<Coeff> {
        self.sums(table)
            .into_iter()
            .enumerate()
            .map(|(key, (sd, sb))| {
                let coeff = self.omega_n * sd;
                Coeff {
                    coeff,
                    dual: if self.orthogonal {
                        coeff
                    } else {
                        self.omega_n * sb
                    },
                    num: table.column(key).iter().filter(|e| e.in_dual).count(),
                }
            })
            .collect()
    }

    /// Changes of the unscaled sums when sample `i` is left out, for the
    /// translations whose sums change.
    pub(crate) fn loo_deltas(&self, table: &BasisTable, i: usize) -> BTreeMap<usize, (f64, f64)> {
        let v = self.balls.sqrt_vol_k();
        let v1 = self.balls.sqrt_vol_k_plus_1();
        let mut deltas: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
        for e in table.row(i) {
            let d = deltas.entry(e.key).or_default();
            d.0 -= e.dual * v[i];
            d.1 -= e.base * v[i];
        }
        for &p in self.balls.promoted(i) {
            let dv = v1[p] - v[p];
            for e in table.row(p) {
                let d = deltas.entry(e.key).or_default();
                d.0 += e.dual * dv;
                d.1 += e.base * dv;
            }
        }
        deltas
    }

    /// Leave-one-out coefficients `(coeff, dual)` of every translation.
    pub(crate) fn coefficients_no_i(&self, table: &BasisTable, i: usize) -> Vec<(f64, f64)> {
        let mut sums = self.sums(table);
        for (key, (dd, db)) in self.loo_deltas(table, i) {
            sums[key].0 += dd;
            sums[key].1 += db;
        }
        sums.into_iter()
            .map(|(sd, sb)| self.scale_no_i(sd, sb))
            .collect()
    }

    /// Leave-one-out coefficient `(coeff, dual)` of one translation.
    ///
    /// `sum` holds the full unscaled sums of `key`.
    pub(crate) fn coefficient_no_i(
        &self,
        table: &BasisTable,
        key: usize,
        sum: (f64, f64),
        i: usize,
    ) -> (f64, f64) {
        let v = self.balls.sqrt_vol_k();
        let v1 = self.balls.sqrt_vol_k_plus_1();
        let (di, bi) = table.values_at(key, i);
        let mut sd = sum.0 - di * v[i];
        let mut sb = sum.1 - bi * v[i];
        for &p in self.balls.promoted(i) {
            let (dp, bp) = table.values_at(key, p);
            let dv = v1[p] - v[p];
            sd += dp * dv;
            sb += bp * dv;
        }
        self.scale_no_i(sd, sb)
    }

    fn scale_no_i(&self, sd: f64, sb: f64) -> (f64, f64) {
        let coeff = self.omega_n1 * sd;
        if self.orthogonal {
            (coeff, coeff)
        } else {
            (coeff, self.omega_n1 * sb)
        }
    }

    /// Risk terms of translation `key` with coefficient `c`.
    pub(crate) fn terms(&self, table: &BasisTable, key: usize, c: &Coeff) -> Terms {
        let v = self.balls.sqrt_vol_k();
        let v1 = self.balls.sqrt_vol_k_plus_1();
        let omega2 = self.omega_n * self.omega_n1;
        let col = table.column(key);

        let term1 = self.omega_n1 / self.omega_n * c.coeff * c.dual;
        let term2 = omega2
            * col
                .iter()
                .map(|e| e.dual * e.base * v[e.sample] * v[e.sample])
                .sum::<f64>();
        let term3 = omega2
            * col
                .iter()
                .filter(|e| e.dual != 0.0)
                .map(|e| {
                    let m = self.balls.last_neighbor(e.sample);
                    let (_, base_m) = table.values_at(key, m);
                    base_m * e.dual * v[m] * (v1[e.sample] - v[m])
                })
                .sum::<f64>();

        Terms {
            term1,
            term2,
            term3,
            norm2: c.coeff * c.dual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wde_wavelet::{Quad, TensorWavelet, Which};

    use crate::samples::Samples;

    fn weyl(n: usize) -> Samples {
        let step = (5f64.sqrt() - 1.0) / 2.0;
        let data = (0..n).map(|i| (0.5 + i as f64 * step).fract()).collect();
        Samples::new(data, 1).unwrap()
    }

    fn setup(name: &str, samples: &Samples) -> (TensorWavelet, BallsInfo, BasisTable) {
        let wave = TensorWavelet::new(&[name]).unwrap();
        let balls = BallsInfo::compute(samples.as_slice(), 1, 1).unwrap();
        let (minx, maxx) = samples.bounds();
        let table =
            BasisTable::build(&wave, samples, 0, &[Quad::Scaling], &[8], &minx, &maxx).unwrap();
        (wave, balls, table)
    }

    #[test]
    fn omega_values() {
        // k = 1: Γ(1)/Γ(1.5) = 2/√π
        let want = 9f64.sqrt() * 2.0 / std::f64::consts::PI.sqrt() / 10.0;
        assert_abs_diff_eq!(omega(10, 1), want, epsilon = 1e-12);
        assert!(omega(1_000_000, 400).is_finite());
    }

    #[test]
    fn orthogonal_coeff_equals_dual() {
        let samples = weyl(60);
        let (wave, balls, table) = setup("db3", &samples);
        let engine = CoefficientEngine::new(&balls, wave.is_orthogonal());
        for c in engine.coefficients(&table) {
            assert_eq!(c.coeff, c.dual);
        }
    }

    #[test]
    fn coefficients_match_direct_sum() {
        let samples = weyl(50);
        let (wave, balls, table) = setup("bior2.2", &samples);
        let engine = CoefficientEngine::new(&balls, false);
        let coeffs = engine.coefficients(&table);
        let w = omega(50, 1);
        for (idx, c) in coeffs.iter().enumerate() {
            let z = table.lattice().get(idx);
            let dual = wave.fun_ix(Which::Dual, &[Quad::Scaling], &[8], &z).unwrap();
            let base = wave.fun_ix(Which::Base, &[Quad::Scaling], &[8], &z).unwrap();
            let (mut sd, mut sb) = (0.0, 0.0);
            for i in 0..samples.n() {
                sd += dual.eval(samples.row(i)).unwrap() * balls.sqrt_vol_k()[i];
                sb += base.eval(samples.row(i)).unwrap() * balls.sqrt_vol_k()[i];
            }
            assert_abs_diff_eq!(c.coeff, w * sd, epsilon = 1e-12);
            assert_abs_diff_eq!(c.dual, w * sb, epsilon = 1e-12);
        }
    }

    #[test]
    fn leave_one_out_matches_weight_vector() {
        let samples = weyl(40);
        let (_, balls, table) = setup("bior2.2", &samples);
        let engine = CoefficientEngine::new(&balls, false);
        let sums = engine.sums(&table);
        let w1 = omega(39, 1);

        for i in [0, 13, 39] {
            let weights = balls.leave_one_out(i).unwrap();
            let loo = engine.coefficients_no_i(&table, i);
            for key in 0..table.len() {
                let (sd, sb) = table.column(key).iter().fold((0.0, 0.0), |acc, e| {
                    (acc.0 + e.dual * weights[e.sample], acc.1 + e.base * weights[e.sample])
                });
                assert_abs_diff_eq!(loo[key].0, w1 * sd, epsilon = 1e-12);
                assert_abs_diff_eq!(loo[key].1, w1 * sb, epsilon = 1e-12);
                let single = engine.coefficient_no_i(&table, key, sums[key], i);
                assert_abs_diff_eq!(single.0, loo[key].0, epsilon = 1e-12);
                assert_abs_diff_eq!(single.1, loo[key].1, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn terms_follow_definitions() {
        let samples = weyl(30);
        let (_, balls, table) = setup("db2", &samples);
        let engine = CoefficientEngine::new(&balls, true);
        let coeffs = engine.coefficients(&table);
        let key = (0..table.len())
            .max_by_key(|&k| table.column(k).len())
            .unwrap();
        let t = engine.terms(&table, key, &coeffs[key]);

        let v = balls.sqrt_vol_k();
        let v1 = balls.sqrt_vol_k_plus_1();
        let w = engine.omega_n() * engine.omega_n1();
        let mut term2 = 0.0;
        let mut term3 = 0.0;
        for j in 0..samples.n() {
            let (dj, bj) = table.values_at(key, j);
            term2 += dj * bj * v[j] * v[j];
            let m = balls.last_neighbor(j);
            let (_, bm) = table.values_at(key, m);
            term3 += bm * dj * v[m] * (v1[j] - v[m]);
        }
        assert_abs_diff_eq!(t.term2, w * term2, epsilon = 1e-12);
        assert_abs_diff_eq!(t.term3, w * term3, epsilon = 1e-12);
        assert_abs_diff_eq!(
            t.term1,
            engine.omega_n1() / engine.omega_n() * coeffs[key].norm2(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(t.contribution(), t.term1 - t.term2 + t.term3, epsilon = 1e-15);
    }
}
