//! Cascade refinement of low-pass filters into sampled continuous functions.

use std::f64::consts::SQRT_2;

use crate::support::Support;

/// Number of dyadic refinement steps: functions are sampled every `2^-14`.
pub const REFINEMENT_LEVEL: u32 = 14;

/// A function sampled on a uniform dyadic grid over its support and
/// evaluated by linear interpolation.
///
/// The function is zero outside the open support interval.
#[derive(Clone, Debug)]
pub struct SampledFunction {
    lower: f64,
    upper: f64,
    per_unit: f64,
    values: Vec<f64>,
}

impl SampledFunction {
    fn new(lower: i64, upper: i64, level: u32, values: Vec<f64>) -> Self {
        debug_assert_eq!(
            values.len() as i64,
            (upper - lower) * (1i64 << level) + 1
        );
        Self {
            lower: lower as f64,
            upper: upper as f64,
            per_unit: (1u64 << level) as f64,
            values,
        }
    }

    /// Evaluates the function at `x`.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        if x <= self.lower || x >= self.upper {
            return 0.0;
        }
        let t = (x - self.lower) * self.per_unit;
        let i = t as usize;
        let frac = t - i as f64;
        match (self.values.get(i), self.values.get(i + 1)) {
            (Some(&a), Some(&b)) => a + (b - a) * frac,
            (Some(&a), None) => a,
            _ => 0.0,
        }
    }

    /// Support interval.
    pub fn support(&self) -> Support {
        Support::new(self.lower, self.upper)
    }

    /// Grid values, the first at the lower support end.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Grid spacing.
    pub fn step(&self) -> f64 {
        1.0 / self.per_unit
    }
}

/// Runs `level` cascade iterations of the low-pass filter.
///
/// Returns `(L−1)·2^level + 1` values approximating phi on the grid
/// `n / 2^level` measured from the first filter tap.
pub(crate) fn cascade(lowpass: &[f64], level: u32) -> Vec<f64> {
    debug_assert!(lowpass.len() >= 2);
    let p: Vec<f64> = lowpass.iter().map(|h| h * SQRT_2).collect();
    let mut current = vec![1.0];
    for _ in 0..level {
        let mut next = vec![0.0; 2 * current.len() + p.len() - 2];
        for (i, &c) in current.iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            for (o, &pk) in next[2 * i..2 * i + p.len()].iter_mut().zip(&p) {
                *o += c * pk;
            }
        }
        current = next;
    }
    current.resize((lowpass.len() - 1) * (1usize << level) + 1, 0.0);
    current
}

/// Builds the scaling function of `lowpass`, whose first tap sits at `lower`.
pub(crate) fn scaling_function(lowpass: &[f64], lower: i64, level: u32) -> SampledFunction {
    let upper = lower + lowpass.len() as i64 - 1;
    SampledFunction::new(lower, upper, level, cascade(lowpass, level))
}

/// Builds the wavelet `psi(x) = Σ g_k √2 phi(2x − k)` on `support`.
///
/// The high-pass taps are `g_k = (−1)^k h̃_{1−k}`, where `h̃` is the
/// opposite low-pass filter with its first tap at `opposite_lower`. The
/// grid of `phi` is reused, so no interpolation happens here.
pub(crate) fn wavelet_function(
    phi: &SampledFunction,
    opposite: &[f64],
    opposite_lower: i64,
    support: (i64, i64),
    level: u32,
) -> SampledFunction {
    let n = 1i64 << level;
    let (c, d) = support;
    let phi_lower = phi.lower as i64;
    let phi_values = phi.values();
    let len = ((d - c) * n + 1) as usize;

    let values = (0..len as i64)
        .map(|m| {
            let mut acc = 0.0;
            for (t, &h) in opposite.iter().enumerate() {
                let k = 1 - (opposite_lower + t as i64);
                let sign = if k.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
                let idx = (2 * c - k - phi_lower) * n + 2 * m;
                if idx >= 0 {
                    if let Some(&v) = phi_values.get(idx as usize) {
                        acc += SQRT_2 * sign * h * v;
                    }
                }
            }
            acc
        })
        .collect();

    SampledFunction::new(c, d, level, values)
}
