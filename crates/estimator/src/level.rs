//! Resolution level search over scaling-only expansions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::debug;
use wde_knn::BallsInfo;
use wde_stats::argmax;
use wde_wavelet::{TensorWavelet, dyadic_scales};

use crate::basis::BasisTable;
use crate::config::{LEVEL_SEARCH_LEVELS, LevelMode};
use crate::density::Density;
use crate::engine::CoefficientEngine;
use crate::error::WdeError;
use crate::key::CoeffMap;
use crate::samples::Samples;

/// Score and density of one candidate level.
#[derive(Debug, Clone)]
pub struct LevelScore {
    level: u32,
    score: f64,
    is_best: bool,
    elapsed: Duration,
    density: Density,
}

impl LevelScore {
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Bias-corrected score; larger is better.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_best(&self) -> bool {
        self.is_best
    }

    /// Time since the search began when this level finished.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Scaling-only density at this level.
    pub fn density(&self) -> &Density {
        &self.density
    }
}

/// Outcome of [`WaveletDensityEstimator::best_j`](crate::WaveletDensityEstimator::best_j).
#[derive(Debug, Clone)]
pub struct LevelSelection {
    mode: LevelMode,
    levels: Vec<LevelScore>,
    best: usize,
}

impl LevelSelection {
    pub fn mode(&self) -> LevelMode {
        self.mode
    }

    /// Every scanned level in ascending order.
    pub fn levels(&self) -> &[LevelScore] {
        &self.levels
    }

    /// The level with the largest score, first on ties.
    pub fn best(&self) -> &LevelScore {
        &self.levels[self.best]
    }

    pub fn best_level(&self) -> u32 {
        self.levels[self.best].level
    }

    pub fn best_density(&self) -> &Density {
        &self.levels[self.best].density
    }
}

/// Scans levels `0..LEVEL_SEARCH_LEVELS` and scores the leave-one-out
/// reconstructions `g̊ᵢ = Σ_z coeff_no_i(z) · base_z(xᵢ)`.
#[tracing::instrument(skip_all, fields(mode = %mode, n = samples.n()))]
pub(crate) fn best_j(
    wave: &Arc<TensorWavelet>,
    samples: &Samples,
    balls: &BallsInfo,
    bounds: (&[f64], &[f64]),
    j0s: &[u32],
    mode: LevelMode,
    name: &str,
) -> Result<LevelSelection, WdeError> {
    let t0 = Instant::now();
    let engine = CoefficientEngine::new(balls, wave.is_orthogonal());
    let (minx, maxx) = bounds;
    let qq = wave.scaling_quadrant();
    let v = balls.sqrt_vol_k();

    let mut levels = Vec::with_capacity(LEVEL_SEARCH_LEVELS as usize);
    for level in 0..LEVEL_SEARCH_LEVELS {
        let scales = dyadic_scales(j0s, level)?;
        let table = BasisTable::build(wave, samples, level, qq, &scales, minx, maxx)?;
        let sums = engine.sums(&table);
        let total: f64 = sums.iter().map(|&(sd, sb)| scaled_norm2(&engine, sd, sb)).sum();

        let tots = (0..samples.n())
            .into_par_iter()
            .map(|i| loo_term(&engine, &table, &sums, total, i, mode))
            .collect::<Result<Vec<f64>, WdeError>>()?;

        let weighted: f64 = tots.iter().zip(v).map(|(t, vi)| t.sqrt() * vi).sum();
        let coeffs = engine.coefficients(&table);
        let score = match mode {
            LevelMode::Normed => engine.omega_n() * weighted,
            LevelMode::Diff => {
                2.0 * engine.omega_n() * weighted - coeffs.iter().map(|c| c.norm2()).sum::<f64>()
            }
        };
        debug!(level, score, keys = table.len(), "level score");

        let map: CoeffMap = coeffs
            .into_iter()
            .enumerate()
            .map(|(idx, c)| (table.key(idx), c))
            .collect();
        let density = Density::new(
            Arc::clone(wave),
            &map,
            format!("WDE-LEVEL(j={level},{name})"),
        )?;
        levels.push(LevelScore {
            level,
            score,
            is_best: false,
            elapsed: t0.elapsed(),
            density,
        });
    }

    let scores: Vec<f64> = levels.iter().map(|l| l.score).collect();
    let best = argmax(&scores).unwrap_or(0);
    levels[best].is_best = true;
    Ok(LevelSelection { mode, levels, best })
}

/// Leave-one-out `coeff · dual` from unscaled sums.
fn scaled_norm2(engine: &CoefficientEngine<'_>, sd: f64, sb: f64) -> f64 {
    let w = engine.omega_n1();
    w * w * sd * sb
}

/// Per-sample score term: `g̊²/‖g̊‖²` (normed) or `g̊²` (diff).
fn loo_term(
    engine: &CoefficientEngine<'_>,
    table: &BasisTable,
    sums: &[(f64, f64)],
    total: f64,
    i: usize,
    mode: LevelMode,
) -> Result<f64, WdeError> {
    let deltas = engine.loo_deltas(table, i);

    let mut norm2 = total;
    for (&key, &(dd, db)) in &deltas {
        let (sd, sb) = sums[key];
        norm2 += scaled_norm2(engine, sd + dd, sb + db) - scaled_norm2(engine, sd, sb);
    }

    let mut g_ring = 0.0;
    for e in table.row(i) {
        let (sd, _) = sums[e.key];
        let (dd, _) = deltas.get(&e.key).copied().unwrap_or_default();
        g_ring += engine.omega_n1() * (sd + dd) * e.base;
    }

    if norm2 == 0.0 {
        if g_ring == 0.0 {
            return Ok(0.0);
        }
        return Err(WdeError::InconsistentState { sample: i, g_ring });
    }
    Ok(match mode {
        LevelMode::Normed => g_ring * g_ring / norm2,
        LevelMode::Diff => g_ring * g_ring,
    })
}
