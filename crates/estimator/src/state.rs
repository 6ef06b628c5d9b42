//! Per-dataset fitting state: ball statistics and the full coefficient
//! lattice.

use rayon::prelude::*;
use tracing::debug;
use wde_knn::{BallsInfo, KnnError};
use wde_wavelet::{TensorWavelet, dyadic_scales};

use crate::basis::BasisTable;
use crate::config::WdeConfig;
use crate::engine::{CoefficientEngine, Terms};
use crate::error::WdeError;
use crate::key::{Coeff, CoeffKey, CoeffMap};
use crate::samples::Samples;

/// Position of one coefficient: block index and translation index.
pub(crate) type Slot = (usize, usize);

#[derive(Debug, Clone)]
pub(crate) struct FitState {
    fingerprint: u64,
    n: usize,
    minx: Vec<f64>,
    maxx: Vec<f64>,
    orthogonal: bool,
    balls: BallsInfo,
    /// Scaling block at level 0 first, then detail blocks by level.
    tables: Vec<BasisTable>,
    coeffs: Vec<Vec<Coeff>>,
}

impl FitState {
    /// Computes ball statistics and every coefficient of levels
    /// `0..delta_j`.
    pub(crate) fn build(
        wave: &TensorWavelet,
        config: &WdeConfig,
        samples: &Samples,
    ) -> Result<Self, WdeError> {
        let balls = ball_stats(wave, config.k(), samples)?;
        let (minx, maxx) = samples.bounds();
        let j0s = config.j0s();

        let mut blocks = vec![(0, wave.scaling_quadrant().to_vec())];
        for level in 0..config.delta_j() {
            for qq in wave.detail_quadrants() {
                blocks.push((level, qq.clone()));
            }
        }
        let tables = blocks
            .into_iter()
            .map(|(level, qq)| {
                let scales = dyadic_scales(&j0s, level)?;
                BasisTable::build(wave, samples, level, &qq, &scales, &minx, &maxx)
            })
            .collect::<Result<Vec<_>, WdeError>>()?;

        let engine = CoefficientEngine::new(&balls, wave.is_orthogonal());
        let coeffs: Vec<Vec<Coeff>> = tables.iter().map(|t| engine.coefficients(t)).collect();

        debug!(
            n = samples.n(),
            blocks = tables.len(),
            coefficients = coeffs.iter().map(Vec::len).sum::<usize>(),
            norm = coeffs.iter().flatten().map(Coeff::norm2).sum::<f64>(),
            "computed coefficient lattice"
        );

        Ok(Self {
            fingerprint: samples.fingerprint(),
            n: samples.n(),
            minx,
            maxx,
            orthogonal: wave.is_orthogonal(),
            balls,
            tables,
            coeffs,
        })
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn n(&self) -> usize {
        self.n
    }

    pub(crate) fn bounds(&self) -> (&[f64], &[f64]) {
        (&self.minx, &self.maxx)
    }

    pub(crate) fn balls(&self) -> &BallsInfo {
        &self.balls
    }

    pub(crate) fn engine(&self) -> CoefficientEngine<'_> {
        CoefficientEngine::new(&self.balls, self.orthogonal)
    }

    pub(crate) fn tables(&self) -> &[BasisTable] {
        &self.tables
    }

    pub(crate) fn coeff(&self, slot: Slot) -> &Coeff {
        &self.coeffs[slot.0][slot.1]
    }

    pub(crate) fn key(&self, slot: Slot) -> CoeffKey {
        self.tables[slot.0].key(slot.1)
    }

    /// Every slot in key order.
    pub(crate) fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.coeffs
            .iter()
            .enumerate()
            .flat_map(|(b, block)| (0..block.len()).map(move |z| (b, z)))
    }

    /// Slots with a non-zero coefficient, in key order.
    pub(crate) fn nonzero_slots(&self) -> Vec<Slot> {
        self.slots().filter(|&s| self.coeff(s).coeff != 0.0).collect()
    }

    /// Returns `true` for the level-0 scaling block.
    pub(crate) fn is_alpha(&self, slot: Slot) -> bool {
        slot.0 == 0
    }

    /// Risk terms of the given slots, in order.
    pub(crate) fn terms(&self, slots: &[Slot]) -> Vec<Terms> {
        let engine = self.engine();
        slots
            .par_iter()
            .map(|&(b, z)| engine.terms(&self.tables[b], z, &self.coeffs[b][z]))
            .collect()
    }

    /// Every coefficient of the lattice with sample `i` left out.
    ///
    /// Support counts drop by one where `i` lies inside the dual support.
    pub(crate) fn coeff_map_no_i(&self, i: usize) -> Result<CoeffMap, WdeError> {
        if i >= self.n {
            return Err(KnnError::IndexOutOfRange { index: i, n: self.n }.into());
        }
        let engine = self.engine();
        let mut map = CoeffMap::new();
        for (table, coeffs) in self.tables.iter().zip(&self.coeffs) {
            let mut nums: Vec<usize> = coeffs.iter().map(|c| c.num).collect();
            for e in table.row(i).iter().filter(|e| e.in_dual) {
                nums[e.key] -= 1;
            }
            let loo = engine.coefficients_no_i(table, i);
            for (z, ((coeff, dual), num)) in loo.into_iter().zip(nums).enumerate() {
                map.insert(table.key(z), Coeff { coeff, dual, num });
            }
        }
        Ok(map)
    }

    /// The full coefficient mapping.
    pub(crate) fn coeff_map(&self) -> CoeffMap {
        self.collect(self.slots())
    }

    /// Mapping of the given slots.
    pub(crate) fn collect(&self, slots: impl IntoIterator<Item = Slot>) -> CoeffMap {
        slots
            .into_iter()
            .map(|s| (self.key(s), *self.coeff(s)))
            .collect()
    }
}

/// Ball statistics of `samples` after checking their dimension.
pub(crate) fn ball_stats(
    wave: &TensorWavelet,
    k: usize,
    samples: &Samples,
) -> Result<BallsInfo, WdeError> {
    if samples.dim() != wave.dim() {
        return Err(WdeError::DimensionMismatch {
            expected: wave.dim(),
            got: samples.dim(),
        });
    }
    Ok(BallsInfo::compute(samples.as_slice(), samples.dim(), k)?)
}
