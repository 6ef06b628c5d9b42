//! Squared, normalized wavelet density.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use rayon::prelude::*;
use wde_wavelet::{Quad, TensorWavelet, Which, scale_norm};

use crate::basis::for_each_translation;
use crate::error::WdeError;
use crate::key::CoeffMap;

/// Coefficients sharing one quadrant selector and scale vector.
#[derive(Debug, Clone)]
struct Block {
    qq: Vec<Quad>,
    scales: Vec<f64>,
    norm: f64,
    /// Smallest and largest stored translation per axis.
    span: Vec<(i64, i64)>,
    coeffs: BTreeMap<Vec<i64>, f64>,
}

impl Block {
    fn new(qq: Vec<Quad>, scales: &[u64], coeffs: BTreeMap<Vec<i64>, f64>) -> Self {
        let mut span = vec![(i64::MAX, i64::MIN); qq.len()];
        for z in coeffs.keys() {
            for (bounds, &zi) in span.iter_mut().zip(z) {
                bounds.0 = bounds.0.min(zi);
                bounds.1 = bounds.1.max(zi);
            }
        }
        Self {
            norm: scale_norm(scales),
            scales: scales.iter().map(|&s| s as f64).collect(),
            qq,
            span,
            coeffs,
        }
    }
}

/// Density `p(x) = (Σ c_z · base_z(x))² / Σ c_z · c̃_z`.
///
/// An immutable value: built once from a coefficient set and evaluated
/// any number of times. Only the primal functions whose support contains
/// the point are visited.
///
/// # Example
///
/// ```
/// use wde_estimator::{Samples, WaveSpec, WaveletDensityEstimator, WdeConfig};
///
/// let xs: Vec<f64> = (0..100).map(|i| (0.5 + i as f64 * 0.618_034).fract()).collect();
/// let samples = Samples::new(xs, 1).unwrap();
/// let mut wde = WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 1)])).unwrap();
/// let density = wde.fit(&samples).unwrap();
///
/// assert!(density.eval(&[0.5]).unwrap() > 0.0);
/// assert!(density.eval(&[0.5, 0.5]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Density {
    wave: Arc<TensorWavelet>,
    blocks: Vec<Block>,
    norm_const: f64,
    nparams: usize,
    min_num: Option<usize>,
    name: String,
}

impl Density {
    /// Builds the density from a coefficient set.
    ///
    /// # Errors
    ///
    /// [`WdeError::DegenerateModel`] if `Σ coeff·dual` is exactly zero.
    pub fn new(
        wave: Arc<TensorWavelet>,
        coeffs: &CoeffMap,
        name: impl Into<String>,
    ) -> Result<Self, WdeError> {
        let norm_const: f64 = coeffs.values().map(|c| c.norm2()).sum();
        if norm_const == 0.0 {
            return Err(WdeError::DegenerateModel);
        }
        let min_num = coeffs.values().map(|c| c.num).filter(|&n| n > 0).min();

        let mut grouped: BTreeMap<(Vec<Quad>, Vec<u64>), BTreeMap<Vec<i64>, f64>> =
            BTreeMap::new();
        for (key, c) in coeffs {
            if c.coeff == 0.0 {
                continue;
            }
            grouped
                .entry((key.qq().to_vec(), key.scales().to_vec()))
                .or_default()
                .insert(key.z().to_vec(), c.coeff);
        }
        let blocks = grouped
            .into_iter()
            .map(|((qq, scales), coeffs)| Block::new(qq, &scales, coeffs))
            .collect();

        Ok(Self {
            wave,
            blocks,
            norm_const,
            nparams: coeffs.len(),
            min_num,
            name: name.into(),
        })
    }

    /// Evaluates the density at one point.
    ///
    /// # Errors
    ///
    /// [`WdeError::DimensionMismatch`] if `point` has the wrong length.
    pub fn eval(&self, point: &[f64]) -> Result<f64, WdeError> {
        if point.len() != self.dim() {
            return Err(WdeError::DimensionMismatch {
                expected: self.dim(),
                got: point.len(),
            });
        }
        Ok(self.eval_unchecked(point))
    }

    /// Evaluates the density at one point of the right dimension.
    pub fn eval_unchecked(&self, point: &[f64]) -> f64 {
        let g = self.sqrt_unnormalized(point);
        g * g / self.norm_const
    }

    /// Evaluates row-major `points` in parallel.
    ///
    /// # Errors
    ///
    /// [`WdeError::SamplesShapeMismatch`] if the length is not a multiple
    /// of the dimension.
    pub fn eval_many(&self, points: &[f64]) -> Result<Vec<f64>, WdeError> {
        let dim = self.dim();
        if !points.len().is_multiple_of(dim) {
            return Err(WdeError::SamplesShapeMismatch {
                len: points.len(),
                dim,
            });
        }
        Ok(points
            .par_chunks_exact(dim)
            .map(|p| self.eval_unchecked(p))
            .collect())
    }

    /// `Σ c_z · base_z(x)`, zero outside every stored support.
    fn sqrt_unnormalized(&self, point: &[f64]) -> f64 {
        if point.iter().any(|x| !x.is_finite()) {
            return 0.0;
        }
        let mut total = 0.0;
        for block in &self.blocks {
            let ranges: Vec<RangeInclusive<i64>> = (0..self.dim())
                .map(|axis| {
                    let local = self.wave.local_translations(
                        axis,
                        Which::Base,
                        block.qq[axis],
                        block.scales[axis],
                        point[axis],
                    );
                    let (lo, hi) = block.span[axis];
                    *local.start().max(&lo)..=*local.end().min(&hi)
                })
                .collect();
            for_each_translation(&ranges, |z| {
                if let Some(&c) = block.coeffs.get(z) {
                    total += c * self.wave.eval_unchecked(
                        Which::Base,
                        &block.qq,
                        &block.scales,
                        z,
                        block.norm,
                        point,
                    );
                }
            });
        }
        total
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.wave.dim()
    }

    /// `Σ coeff · dual` over the coefficient set.
    pub fn norm_const(&self) -> f64 {
        self.norm_const
    }

    /// Number of coefficients.
    pub fn nparams(&self) -> usize {
        self.nparams
    }

    /// Smallest positive support count, if any.
    pub fn min_num(&self) -> Option<usize> {
        self.min_num
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Coeff, CoeffKey};

    fn wave(names: &[&str]) -> Arc<TensorWavelet> {
        Arc::new(TensorWavelet::new(names).unwrap())
    }

    fn alpha(z: i64, coeff: f64) -> (CoeffKey, Coeff) {
        (
            CoeffKey::new(0, vec![Quad::Scaling], vec![z], vec![4]),
            Coeff {
                coeff,
                dual: coeff,
                num: 1,
            },
        )
    }

    #[test]
    fn degenerate_model() {
        let mut map = CoeffMap::new();
        map.insert(alpha(0, 0.0).0, alpha(0, 0.0).1);
        map.insert(alpha(1, 0.0).0, alpha(1, 0.0).1);
        assert!(matches!(
            Density::new(wave(&["db2"]), &map, "zero").unwrap_err(),
            WdeError::DegenerateModel
        ));
    }

    #[test]
    fn matches_direct_sum() {
        let w = wave(&["db2"]);
        let map: CoeffMap = [alpha(-1, 0.3), alpha(0, 0.5), alpha(1, -0.2), alpha(2, 0.4)]
            .into_iter()
            .collect();
        let density = Density::new(w.clone(), &map, "manual").unwrap();
        assert!((density.norm_const() - 0.54).abs() < 1e-15);

        for x in [-0.3, 0.0, 0.11, 0.37, 0.5, 0.83, 1.2] {
            let mut g = 0.0;
            for (key, c) in &map {
                let f = w.fun_ix(Which::Base, key.qq(), key.scales(), key.z()).unwrap();
                g += c.coeff * f.eval(&[x]).unwrap();
            }
            let want = g * g / 0.54;
            let got = density.eval(&[x]).unwrap();
            assert!((got - want).abs() < 1e-12, "x={x}: {got} vs {want}");
            assert!(got >= 0.0);
        }
    }

    #[test]
    fn far_and_infinite_points_are_zero() {
        let map: CoeffMap = [alpha(-1, 0.3), alpha(0, 0.5), alpha(1, -0.2)]
            .into_iter()
            .collect();
        let density = Density::new(wave(&["db2"]), &map, "manual").unwrap();
        for x in [1e19, -1e19, f64::MAX, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(density.eval(&[x]).unwrap(), 0.0, "x={x}");
        }
        assert_eq!(density.eval(&[50.0]).unwrap(), 0.0);
    }

    #[test]
    fn eval_checks_dimension() {
        let map: CoeffMap = [alpha(0, 1.0)].into_iter().collect();
        let density = Density::new(wave(&["db2"]), &map, "one").unwrap();
        assert!(matches!(
            density.eval(&[0.1, 0.2]).unwrap_err(),
            WdeError::DimensionMismatch {
                expected: 1,
                got: 2
            }
        ));
        assert_eq!(density.eval_many(&[0.1, 0.2, 0.3]).unwrap().len(), 3);
        assert_eq!(density.nparams(), 1);
        assert_eq!(density.min_num(), Some(1));
        assert_eq!(density.name(), "one");
    }
}
