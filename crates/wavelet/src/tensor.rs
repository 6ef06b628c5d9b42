//! Tensor-product wavelet bases over `d` axes.

use std::ops::RangeInclusive;

use crate::error::WaveletError;
use crate::support::{Quad, Support, Which};
use crate::wavelet::Wavelet;

/// Largest supported dyadic scale exponent `j0 + j`.
pub const MAX_SCALE_EXPONENT: u32 = 30;

/// Separable `d`-dimensional wavelet built from one wavelet per axis.
///
/// A basis function is indexed by a quadrant selector `qq` (scaling or
/// wavelet per axis), a scale vector `s` and a translation vector `z`:
///
/// ```text
/// Ψ(x) = √(Π sᵢ) · Π fᵢ(sᵢ·xᵢ − zᵢ)
/// ```
#[derive(Clone, Debug)]
pub struct TensorWavelet {
    axes: Vec<Wavelet>,
    quadrants: Vec<Vec<Quad>>,
    name: String,
}

impl TensorWavelet {
    /// Builds one [`Wavelet`] per name.
    ///
    /// # Errors
    ///
    /// [`WaveletError::EmptyWaveletList`] for an empty list, otherwise any
    /// error of [`Wavelet::new`].
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, WaveletError> {
        if names.is_empty() {
            return Err(WaveletError::EmptyWaveletList);
        }
        let axes = names
            .iter()
            .map(|n| Wavelet::new(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let name = axes
            .iter()
            .map(|w| w.name())
            .collect::<Vec<_>>()
            .join(",");
        let quadrants = all_quadrants(axes.len());
        Ok(Self {
            axes,
            quadrants,
            name,
        })
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    /// Comma-joined axis wavelet names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wavelet of one axis.
    pub fn axis(&self, axis: usize) -> &Wavelet {
        &self.axes[axis]
    }

    /// Returns `true` iff every axis wavelet is orthogonal.
    pub fn is_orthogonal(&self) -> bool {
        self.axes.iter().all(Wavelet::is_orthogonal)
    }

    /// All `2^d` quadrant selectors in lexicographic order; the first one is
    /// all-scaling.
    pub fn quadrants(&self) -> &[Vec<Quad>] {
        &self.quadrants
    }

    /// The all-scaling quadrant selector.
    pub fn scaling_quadrant(&self) -> &[Quad] {
        &self.quadrants[0]
    }

    /// The detail quadrant selectors (every selector but the all-scaling one).
    pub fn detail_quadrants(&self) -> &[Vec<Quad>] {
        &self.quadrants[1..]
    }

    /// The tensor-product function for `(qq, scales, z)`.
    ///
    /// # Errors
    ///
    /// [`WaveletError::DimensionMismatch`] if any index vector does not
    /// have one entry per axis.
    pub fn fun_ix(
        &self,
        which: Which,
        qq: &[Quad],
        scales: &[u64],
        z: &[i64],
    ) -> Result<TensorFunction<'_>, WaveletError> {
        self.check_index(qq, scales, z)?;
        Ok(TensorFunction {
            wave: self,
            which,
            qq: qq.to_vec(),
            scales: scales.iter().map(|&s| s as f64).collect(),
            z: z.to_vec(),
            norm: scale_norm(scales),
        })
    }

    /// Per-axis supports of the tensor-product function for `(qq, scales, z)`.
    ///
    /// # Errors
    ///
    /// [`WaveletError::DimensionMismatch`] on index length mismatch.
    pub fn supp_ix(
        &self,
        which: Which,
        qq: &[Quad],
        scales: &[u64],
        z: &[i64],
    ) -> Result<TensorSupport, WaveletError> {
        self.check_index(qq, scales, z)?;
        Ok(TensorSupport(
            self.axes
                .iter()
                .zip(qq)
                .zip(scales.iter().zip(z))
                .map(|((w, &q), (&s, &zi))| w.supp_ix(which, q, s as f64, zi as f64))
                .collect(),
        ))
    }

    /// Per-axis inclusive translation ranges whose functions can reach the
    /// box `[minx, maxx]`.
    ///
    /// ```text
    /// z_min = ⌊sᵢ·minxᵢ − upperᵢ⌋ − 1
    /// z_max = ⌊sᵢ·maxxᵢ − lowerᵢ⌋ + 1
    /// ```
    ///
    /// # Errors
    ///
    /// [`WaveletError::DimensionMismatch`] on length mismatch.
    pub fn z_range(
        &self,
        which: Which,
        qq: &[Quad],
        scales: &[u64],
        minx: &[f64],
        maxx: &[f64],
    ) -> Result<Vec<(i64, i64)>, WaveletError> {
        let d = self.dim();
        for len in [qq.len(), scales.len(), minx.len(), maxx.len()] {
            if len != d {
                return Err(WaveletError::DimensionMismatch {
                    expected: d,
                    got: len,
                });
            }
        }
        Ok((0..d)
            .map(|i| {
                let supp = self.axes[i].support(which, qq[i]);
                let s = scales[i] as f64;
                let zmin = ((s * minx[i] - supp.upper()).floor() as i64).saturating_sub(1);
                let zmax = ((s * maxx[i] - supp.lower()).floor() as i64).saturating_add(1);
                (zmin, zmax)
            })
            .collect())
    }

    /// Translations `z` on one axis whose function support strictly
    /// contains `x`.
    ///
    /// Saturates at the `i64` bounds; a NaN `x` gives an empty range.
    #[inline]
    pub fn local_translations(
        &self,
        axis: usize,
        which: Which,
        quad: Quad,
        scale: f64,
        x: f64,
    ) -> RangeInclusive<i64> {
        let supp = self.axes[axis].support(which, quad);
        if x.is_nan() {
            return 1..=0;
        }
        let first = ((scale * x - supp.upper()).floor() as i64).saturating_add(1);
        let last = ((scale * x - supp.lower()).ceil() as i64).saturating_sub(1);
        first..=last
    }

    /// Value of one axis factor `f(s·x − z)`, without the `√s` factor.
    #[inline]
    pub fn axis_value(&self, axis: usize, which: Which, quad: Quad, scale: f64, z: i64, x: f64) -> f64 {
        self.axes[axis].eval(which, quad, scale, z as f64, x)
    }

    /// Evaluates the tensor-product function at `point` without checks.
    ///
    /// `norm` must be `√(Π sᵢ)`, see [`scale_norm`].
    #[inline]
    pub fn eval_unchecked(
        &self,
        which: Which,
        qq: &[Quad],
        scales: &[f64],
        z: &[i64],
        norm: f64,
        point: &[f64],
    ) -> f64 {
        debug_assert_eq!(point.len(), self.dim());
        let mut acc = norm;
        for (i, w) in self.axes.iter().enumerate() {
            acc *= w.eval(which, qq[i], scales[i], z[i] as f64, point[i]);
            if acc == 0.0 {
                return 0.0;
            }
        }
        acc
    }

    fn check_index(&self, qq: &[Quad], scales: &[u64], z: &[i64]) -> Result<(), WaveletError> {
        let d = self.dim();
        for len in [qq.len(), scales.len(), z.len()] {
            if len != d {
                return Err(WaveletError::DimensionMismatch {
                    expected: d,
                    got: len,
                });
            }
        }
        Ok(())
    }
}

/// Dyadic scales `2^(j0ᵢ + level)` for each axis.
///
/// # Errors
///
/// [`WaveletError::LevelTooHigh`] if an exponent exceeds [`MAX_SCALE_EXPONENT`].
pub fn dyadic_scales(j0s: &[u32], level: u32) -> Result<Vec<u64>, WaveletError> {
    j0s.iter()
        .map(|&j0| {
            let exponent = j0 + level;
            if exponent > MAX_SCALE_EXPONENT {
                Err(WaveletError::LevelTooHigh {
                    exponent,
                    max: MAX_SCALE_EXPONENT,
                })
            } else {
                Ok(1u64 << exponent)
            }
        })
        .collect()
}

/// Normalization factor `√(Π sᵢ)` of a tensor-product function.
pub fn scale_norm(scales: &[u64]) -> f64 {
    scales.iter().map(|&s| s as f64).product::<f64>().sqrt()
}

fn all_quadrants(dim: usize) -> Vec<Vec<Quad>> {
    (0..1usize << dim)
        .map(|bits| {
            (0..dim)
                .map(|axis| {
                    if (bits >> (dim - 1 - axis)) & 1 == 1 {
                        Quad::Wavelet
                    } else {
                        Quad::Scaling
                    }
                })
                .collect()
        })
        .collect()
}

/// A tensor-product basis function bound to its index.
#[derive(Clone, Debug)]
pub struct TensorFunction<'a> {
    wave: &'a TensorWavelet,
    which: Which,
    qq: Vec<Quad>,
    scales: Vec<f64>,
    z: Vec<i64>,
    norm: f64,
}

impl TensorFunction<'_> {
    /// Evaluates the function at `point`.
    ///
    /// # Errors
    ///
    /// [`WaveletError::DimensionMismatch`] if `point` has the wrong length.
    pub fn eval(&self, point: &[f64]) -> Result<f64, WaveletError> {
        if point.len() != self.wave.dim() {
            return Err(WaveletError::DimensionMismatch {
                expected: self.wave.dim(),
                got: point.len(),
            });
        }
        Ok(self
            .wave
            .eval_unchecked(self.which, &self.qq, &self.scales, &self.z, self.norm, point))
    }

    /// Per-axis supports.
    pub fn support(&self) -> TensorSupport {
        TensorSupport(
            (0..self.wave.dim())
                .map(|i| {
                    self.wave.axes[i].supp_ix(self.which, self.qq[i], self.scales[i], self.z[i] as f64)
                })
                .collect(),
        )
    }
}

/// Product of per-axis open support intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorSupport(Vec<Support>);

impl TensorSupport {
    /// Per-axis intervals.
    pub fn intervals(&self) -> &[Support] {
        &self.0
    }

    /// Returns `true` if every coordinate lies strictly inside its interval.
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.0.len() && self.0.iter().zip(point).all(|(s, &x)| s.contains(x))
    }
}

/// The Cartesian product of per-axis inclusive translation ranges, in
/// lexicographic order (last axis fastest).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationLattice {
    ranges: Vec<(i64, i64)>,
}

impl TranslationLattice {
    /// Creates a lattice from inclusive ranges.
    pub fn new(ranges: Vec<(i64, i64)>) -> Self {
        Self { ranges }
    }

    /// Per-axis inclusive ranges.
    pub fn ranges(&self) -> &[(i64, i64)] {
        &self.ranges
    }

    /// Number of translation vectors.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|&(lo, hi)| if hi < lo { 0 } else { (hi - lo + 1) as usize })
            .product()
    }

    /// Returns `true` if some axis range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `z` in iteration order, or `None` if outside.
    pub fn index_of(&self, z: &[i64]) -> Option<usize> {
        if z.len() != self.ranges.len() {
            return None;
        }
        let mut idx = 0usize;
        for (&zi, &(lo, hi)) in z.iter().zip(&self.ranges) {
            if zi < lo || zi > hi {
                return None;
            }
            idx = idx * (hi - lo + 1) as usize + (zi - lo) as usize;
        }
        Some(idx)
    }

    /// Translation vector at position `idx`.
    pub fn get(&self, mut idx: usize) -> Vec<i64> {
        debug_assert!(idx < self.len());
        let mut z = vec![0; self.ranges.len()];
        for (slot, &(lo, hi)) in z.iter_mut().zip(&self.ranges).rev() {
            let width = (hi - lo + 1) as usize;
            *slot = lo + (idx % width) as i64;
            idx /= width;
        }
        z
    }

    /// Iterates over all translation vectors.
    pub fn iter(&self) -> impl Iterator<Item = Vec<i64>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}
