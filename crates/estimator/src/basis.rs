//! Sparse tables of basis function values at the samples.
//!
//! One [`BasisTable`] covers one block `(level, qq, scales)`: every
//! translation of the union of the primal and dual `z_range` lattices.
//! Only the functions whose support reaches a sample are stored, by
//! sample (rows) and by translation (columns).

use std::ops::RangeInclusive;

use rayon::prelude::*;
use wde_wavelet::{Quad, TensorWavelet, TranslationLattice, Which, scale_norm};

use crate::error::WdeError;
use crate::key::CoeffKey;
use crate::samples::Samples;

/// Dual and primal values of one basis function at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BasisEntry {
    /// Lattice index of the translation.
    pub key: usize,
    pub dual: f64,
    pub base: f64,
    /// Sample lies strictly inside the dual support.
    pub in_dual: bool,
}

/// Values of one basis function at one sample, stored by column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColumnEntry {
    pub sample: usize,
    pub dual: f64,
    pub base: f64,
    pub in_dual: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct BasisTable {
    level: u32,
    qq: Vec<Quad>,
    scales: Vec<u64>,
    lattice: TranslationLattice,
    rows: Vec<Vec<BasisEntry>>,
    columns: Vec<Vec<ColumnEntry>>,
}

impl BasisTable {
    /// Evaluates every basis function of the block at every sample.
    pub(crate) fn build(
        wave: &TensorWavelet,
        samples: &Samples,
        level: u32,
        qq: &[Quad],
        scales: &[u64],
        minx: &[f64],
        maxx: &[f64],
    ) -> Result<Self, WdeError> {
        let dual = wave.z_range(Which::Dual, qq, scales, minx, maxx)?;
        let base = wave.z_range(Which::Base, qq, scales, minx, maxx)?;
        let ranges: Vec<(i64, i64)> = dual
            .iter()
            .zip(&base)
            .map(|(&(dl, dh), &(bl, bh))| (dl.min(bl), dh.max(bh)))
            .collect();
        let lattice = TranslationLattice::new(ranges);
        let norm = scale_norm(scales);
        let scales_f: Vec<f64> = scales.iter().map(|&s| s as f64).collect();

        let rows: Vec<Vec<BasisEntry>> = (0..samples.n())
            .into_par_iter()
            .map(|i| sample_row(wave, &lattice, qq, &scales_f, norm, samples.row(i)))
            .collect();

        let mut columns = vec![Vec::new(); lattice.len()];
        for (i, row) in rows.iter().enumerate() {
            for e in row {
                columns[e.key].push(ColumnEntry {
                    sample: i,
                    dual: e.dual,
                    base: e.base,
                    in_dual: e.in_dual,
                });
            }
        }

        Ok(Self {
            level,
            qq: qq.to_vec(),
            scales: scales.to_vec(),
            lattice,
            rows,
            columns,
        })
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    #[cfg(test)]
    pub(crate) fn lattice(&self) -> &TranslationLattice {
        &self.lattice
    }

    /// Number of translations.
    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }

    /// Basis functions reaching sample `i`, by ascending key.
    pub(crate) fn row(&self, i: usize) -> &[BasisEntry] {
        &self.rows[i]
    }

    /// Samples reached by basis function `key`, by ascending sample.
    pub(crate) fn column(&self, key: usize) -> &[ColumnEntry] {
        &self.columns[key]
    }

    /// Dual and primal values of `key` at `sample` (zero if not stored).
    pub(crate) fn values_at(&self, key: usize, sample: usize) -> (f64, f64) {
        let col = &self.columns[key];
        match col.binary_search_by_key(&sample, |e| e.sample) {
            Ok(pos) => (col[pos].dual, col[pos].base),
            Err(_) => (0.0, 0.0),
        }
    }

    /// Coefficient key of lattice index `idx`.
    pub(crate) fn key(&self, idx: usize) -> CoeffKey {
        CoeffKey::new(
            self.level,
            self.qq.clone(),
            self.lattice.get(idx),
            self.scales.clone(),
        )
    }
}

/// Basis values of one sample over the lattice.
fn sample_row(
    wave: &TensorWavelet,
    lattice: &TranslationLattice,
    qq: &[Quad],
    scales: &[f64],
    norm: f64,
    x: &[f64],
) -> Vec<BasisEntry> {
    // Per-axis factors: (z, dual, base, inside dual support).
    let mut axes: Vec<Vec<(i64, f64, f64, bool)>> = Vec::with_capacity(x.len());
    for (axis, (&(lo, hi), &xi)) in lattice.ranges().iter().zip(x).enumerate() {
        let d = wave.local_translations(axis, Which::Dual, qq[axis], scales[axis], xi);
        let b = wave.local_translations(axis, Which::Base, qq[axis], scales[axis], xi);
        let first = (*d.start()).min(*b.start()).max(lo);
        let last = (*d.end()).max(*b.end()).min(hi);
        let factors: Vec<_> = (first..=last)
            .map(|z| {
                (
                    z,
                    wave.axis_value(axis, Which::Dual, qq[axis], scales[axis], z, xi),
                    wave.axis_value(axis, Which::Base, qq[axis], scales[axis], z, xi),
                    d.contains(&z),
                )
            })
            .collect();
        if factors.is_empty() {
            return Vec::new();
        }
        axes.push(factors);
    }

    let ranges: Vec<RangeInclusive<i64>> = axes
        .iter()
        .map(|f| 0..=(f.len() as i64 - 1))
        .collect();
    let mut row = Vec::new();
    let mut z = vec![0i64; x.len()];
    for_each_translation(&ranges, |pos| {
        let mut dual = norm;
        let mut base = norm;
        let mut in_dual = true;
        for (axis, &p) in pos.iter().enumerate() {
            let (zi, da, ba, inside) = axes[axis][p as usize];
            z[axis] = zi;
            dual *= da;
            base *= ba;
            in_dual &= inside;
        }
        if dual == 0.0 && base == 0.0 && !in_dual {
            return;
        }
        if let Some(key) = lattice.index_of(&z) {
            row.push(BasisEntry {
                key,
                dual,
                base,
                in_dual,
            });
        }
    });
    row
}

/// Calls `f` for every point of the Cartesian product of `ranges`, last
/// axis fastest. Does nothing if any range is empty.
pub(crate) fn for_each_translation(ranges: &[RangeInclusive<i64>], mut f: impl FnMut(&[i64])) {
    if ranges.is_empty() || ranges.iter().any(|r| r.is_empty()) {
        return;
    }
    let mut z: Vec<i64> = ranges.iter().map(|r| *r.start()).collect();
    loop {
        f(&z);
        let mut axis = ranges.len();
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            if z[axis] < *ranges[axis].end() {
                z[axis] += 1;
                break;
            }
            z[axis] = *ranges[axis].start();
        }
    }
}
