//! Validated sample matrix.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::WdeError;

/// Row-major sample matrix of `n` points in `dim` dimensions.
///
/// All coordinates are finite. The content fingerprint identifies the
/// data for cache lookups: two matrices with equal shape and bit-equal
/// coordinates share a fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    data: Vec<f64>,
    dim: usize,
}

impl Samples {
    /// Wraps a row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WdeError::EmptySamples`] | empty buffer |
    /// | [`WdeError::SamplesShapeMismatch`] | `dim == 0` or length not divisible |
    /// | [`WdeError::NonFiniteSamples`] | NaN or infinite coordinate |
    pub fn new(data: Vec<f64>, dim: usize) -> Result<Self, WdeError> {
        if dim == 0 || !data.len().is_multiple_of(dim) {
            return Err(WdeError::SamplesShapeMismatch {
                len: data.len(),
                dim,
            });
        }
        if data.is_empty() {
            return Err(WdeError::EmptySamples);
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(WdeError::NonFiniteSamples { sample: pos / dim });
        }
        Ok(Self { data, dim })
    }

    /// Builds a matrix from rows of equal length.
    ///
    /// # Errors
    ///
    /// As [`Samples::new`]; ragged rows yield [`WdeError::DimensionMismatch`].
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, WdeError> {
        let dim = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.is_empty() {
            return Err(WdeError::EmptySamples);
        }
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(WdeError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, dim)
    }

    /// Number of samples.
    pub fn n(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Number of coordinates per sample.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Sample `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterates over samples.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dim)
    }

    /// Row-major coordinate buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// One axis as a column vector.
    pub fn column(&self, axis: usize) -> Vec<f64> {
        self.rows().map(|r| r[axis]).collect()
    }

    /// Per-axis minimum and maximum.
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        let mut minx = vec![f64::INFINITY; self.dim];
        let mut maxx = vec![f64::NEG_INFINITY; self.dim];
        for row in self.rows() {
            for (axis, &x) in row.iter().enumerate() {
                minx[axis] = minx[axis].min(x);
                maxx[axis] = maxx[axis].max(x);
            }
        }
        (minx, maxx)
    }

    /// Content hash over the shape and every coordinate's bit pattern.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.n().hash(&mut hasher);
        self.dim.hash(&mut hasher);
        for v in &self.data {
            v.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
