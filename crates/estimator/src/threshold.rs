//! Hard-threshold curve over detail coefficients ranked by magnitude.

use std::sync::Arc;

use tracing::{debug, warn};
use wde_stats::argmax;
use wde_wavelet::TensorWavelet;

use crate::density::Density;
use crate::error::WdeError;
use crate::state::{FitState, Slot};

/// Outcome of [`WaveletDensityEstimator::best_c`](crate::WaveletDensityEstimator::best_c).
#[derive(Debug, Clone)]
pub struct ThresholdSelection {
    curve: Vec<(f64, f64)>,
    best: Option<usize>,
    density: Density,
}

impl ThresholdSelection {
    /// `(|c|/√(j+1), b̂)` after adding each ranked detail coefficient.
    pub fn curve(&self) -> &[(f64, f64)] {
        &self.curve
    }

    /// Curve position with the largest `b̂`; `None` without detail
    /// coefficients.
    pub fn best(&self) -> Option<usize> {
        self.best
    }

    /// Number of detail coefficients kept.
    pub fn count(&self) -> usize {
        self.best.map_or(0, |b| b + 1)
    }

    /// Scaling coefficients plus the kept detail coefficients.
    pub fn density(&self) -> &Density {
        &self.density
    }
}

/// `|c| / √(j + 1)`.
pub(crate) fn traditional_threshold(coeff: f64, level: u32) -> f64 {
    coeff.abs() / (f64::from(level) + 1.0).sqrt()
}

/// Adds detail coefficients by decreasing `|c|/√(j+1)` and tracks
/// `b̂ = 2ω·Σ|v̊ᵢ|·vᵢ − Σ c·c̃`, where `v̊ᵢ` accumulates leave-one-out
/// coefficients times the primal function at `xᵢ`.
#[tracing::instrument(skip_all, fields(n = state.n()))]
pub(crate) fn best_c(
    wave: &Arc<TensorWavelet>,
    state: &FitState,
    name: &str,
) -> Result<ThresholdSelection, WdeError> {
    let engine = state.engine();
    let tables = state.tables();
    let v = state.balls().sqrt_vol_k();

    let mut betas: Vec<(Slot, f64)> = state
        .nonzero_slots()
        .into_iter()
        .filter(|&s| !state.is_alpha(s))
        .map(|s| (s, traditional_threshold(state.coeff(s).coeff, tables[s.0].level())))
        .collect();
    betas.sort_by(|a, b| b.1.total_cmp(&a.1));

    let alpha_table = &tables[0];
    let mut q_norm2 = 0.0;
    let mut vs = vec![0.0; state.n()];
    for z in 0..alpha_table.len() {
        let c = state.coeff((0, z));
        q_norm2 += c.norm2();
        for e in alpha_table.column(z) {
            vs[e.sample] += c.coeff * e.base;
        }
    }

    let mut block_sums: Vec<Option<Vec<(f64, f64)>>> = vec![None; tables.len()];
    let mut curve = Vec::with_capacity(betas.len());
    for &((b, z), threshold) in &betas {
        let table = &tables[b];
        let sums = block_sums[b].get_or_insert_with(|| engine.sums(table));
        q_norm2 += state.coeff((b, z)).norm2();
        for e in table.column(z) {
            if e.base == 0.0 {
                continue;
            }
            let (c_i, _) = engine.coefficient_no_i(table, z, sums[z], e.sample);
            vs[e.sample] += c_i * e.base;
        }
        let b_hat = 2.0 * engine.omega_n() * vs.iter().zip(v).map(|(s, vi)| s.abs() * vi).sum::<f64>()
            - q_norm2;
        curve.push((threshold, b_hat));
    }

    let b_hats: Vec<f64> = curve.iter().map(|&(_, b)| b).collect();
    let best = argmax(&b_hats);
    match best {
        Some(pos) => debug!(pos, threshold = curve[pos].0, b_hat = curve[pos].1, "best threshold"),
        None => warn!("no detail coefficients to threshold"),
    }

    let kept = best.map_or(0, |b| b + 1);
    let slots = (0..alpha_table.len())
        .map(|z| (0, z))
        .chain(betas[..kept].iter().map(|&(s, _)| s));
    let density = Density::new(
        Arc::clone(wave),
        &state.collect(slots),
        format!("WDE-HT(c={kept},{name})"),
    )?;

    Ok(ThresholdSelection {
        curve,
        best,
        density,
    })
}
