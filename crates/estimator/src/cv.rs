//! Cross-validated coefficient subset selection.
//!
//! Detail coefficients are ranked by a threshold, then added one by one
//! while a running risk target is updated from their leave-one-out
//! terms. The smoothed curve of `1 − target` picks the cutoff.

use std::sync::Arc;

use tracing::{debug, warn};
use wde_stats::{argmax, moving_average};
use wde_wavelet::TensorWavelet;

use crate::config::{CoeffOrdering, CvConfig, Cutoff, Loss};
use crate::density::Density;
use crate::engine::Terms;
use crate::error::WdeError;
use crate::state::{FitState, Slot};
use crate::threshold::traditional_threshold;

/// Outcome of [`WaveletDensityEstimator::cvfit_with`](crate::WaveletDensityEstimator::cvfit_with).
#[derive(Debug, Clone)]
pub struct CvSelection {
    curve: Vec<(f64, f64)>,
    smoothed: Vec<f64>,
    cutoff: usize,
    threshold: Option<f64>,
    running_norm: f64,
    density: Density,
}

impl CvSelection {
    /// `(threshold, 1 − target)` after adding each ranked coefficient.
    pub fn curve(&self) -> &[(f64, f64)] {
        &self.curve
    }

    /// Moving average of the curve values.
    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Number of detail coefficients kept.
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    /// Threshold at the curve peak; `None` without detail coefficients.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Running `Σ coeff·dual` of the kept coefficients.
    pub fn running_norm(&self) -> f64 {
        self.running_norm
    }

    pub fn density(&self) -> &Density {
        &self.density
    }
}

struct Candidate {
    slot: Slot,
    threshold: f64,
    terms: Terms,
}

fn rank_threshold(loss: Loss, ordering: CoeffOrdering, coeff: f64, level: u32, t: &Terms) -> f64 {
    match (loss, ordering) {
        (_, CoeffOrdering::Traditional) => traditional_threshold(coeff, level),
        (Loss::Original, CoeffOrdering::QTerm) => t.contribution(),
        (_, CoeffOrdering::QTerm) => -0.5 * t.norm2 + t.contribution(),
    }
}

/// Runs the subset selection on a fitted lattice.
///
/// # Errors
///
/// [`WdeError::InvalidConfiguration`] for an invalid configuration,
/// [`WdeError::DegenerateModel`] if the selected set has zero norm.
#[tracing::instrument(skip_all, fields(loss = %config.loss(), ordering = %config.ordering()))]
pub(crate) fn calc_pdf_cv(
    wave: &Arc<TensorWavelet>,
    state: &FitState,
    config: &CvConfig,
    name: &str,
) -> Result<CvSelection, WdeError> {
    config.validate()?;
    let loss = config.loss();
    let ordering = config.ordering();
    let tables = state.tables();

    let slots = state.nonzero_slots();
    let terms = state.terms(&slots);

    let mut alphas = Vec::new();
    let mut alpha_norm = 0.0;
    let mut alpha_contribution = 0.0;
    let mut candidates = Vec::new();
    for (slot, t) in slots.into_iter().zip(terms) {
        if state.is_alpha(slot) {
            alphas.push(slot);
            alpha_norm += t.norm2;
            alpha_contribution += t.contribution();
            continue;
        }
        let threshold = rank_threshold(
            loss,
            ordering,
            state.coeff(slot).coeff,
            tables[slot.0].level(),
            &t,
        );
        candidates.push(Candidate {
            slot,
            threshold,
            terms: t,
        });
    }
    candidates.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
    debug!(
        alphas = alphas.len(),
        candidates = candidates.len(),
        alpha_norm,
        alpha_contribution,
        "ranked coefficients"
    );

    let mut target_sum = match loss {
        Loss::Original | Loss::Normed => -alpha_contribution,
        Loss::Improved => 0.5 + 0.5 * alpha_norm - alpha_contribution,
    };
    let mut total_norm = alpha_norm;
    let mut curve = Vec::with_capacity(candidates.len());
    let mut norms = Vec::with_capacity(candidates.len());
    for c in &candidates {
        total_norm += c.terms.norm2;
        let target = match loss {
            Loss::Original => {
                target_sum += c.terms.contribution();
                1.0 - target_sum
            }
            Loss::Normed => {
                target_sum += c.terms.contribution();
                1.0 - target_sum / total_norm
            }
            Loss::Improved => {
                target_sum += 0.5 * c.terms.norm2 - c.terms.contribution();
                target_sum
            }
        };
        curve.push((c.threshold, 1.0 - target));
        norms.push(total_norm);
    }

    let values: Vec<f64> = curve.iter().map(|&(_, v)| v).collect();
    let smoothed = moving_average(&values, config.smoothing_window());
    let budget = state.n().saturating_sub(alphas.len());
    let (cutoff, threshold) = match pick(&values, &smoothed, config.cutoff()) {
        Some(k) => {
            let cutoff = k.min(budget);
            debug!(peak = k, cutoff, budget, threshold = candidates[k].threshold, "cutoff");
            (cutoff, Some(candidates[k].threshold))
        }
        None => {
            warn!("no detail coefficients, keeping the scaling expansion");
            (0, None)
        }
    };
    let running_norm = if cutoff == 0 {
        alpha_norm
    } else {
        norms[cutoff - 1]
    };

    let kept = alphas
        .into_iter()
        .chain(candidates[..cutoff].iter().map(|c| c.slot));
    let density = Density::new(
        Arc::clone(wave),
        &state.collect(kept),
        format!("WDE-CV({loss},{ordering},{name})"),
    )?;

    Ok(CvSelection {
        curve,
        smoothed,
        cutoff,
        threshold,
        running_norm,
        density,
    })
}

/// Curve position chosen by the cutoff strategy.
fn pick(values: &[f64], smoothed: &[f64], cutoff: Cutoff) -> Option<usize> {
    match cutoff {
        Cutoff::MaxSmoothed => argmax(smoothed),
        Cutoff::ClosestToOne => {
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if values.is_empty() {
                return None;
            }
            let level = (max - 0.001).min(1.0);
            Some(values.iter().position(|&v| v > level).unwrap_or(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_max_smoothed() {
        let values = [0.1, 0.5, 0.2, 0.9, 0.3];
        assert_eq!(pick(&values, &values, Cutoff::MaxSmoothed), Some(3));
        assert_eq!(pick(&[], &[], Cutoff::MaxSmoothed), None);
    }

    #[test]
    fn pick_closest_to_one() {
        // max 0.9995 → level 0.9985
        let values = [0.5, 0.9, 0.999, 0.9995, 0.2];
        assert_eq!(pick(&values, &values, Cutoff::ClosestToOne), Some(2));
        // values above one are capped at level 1
        let values = [0.5, 1.2, 1.5];
        assert_eq!(pick(&values, &values, Cutoff::ClosestToOne), Some(1));
        assert_eq!(pick(&[], &[], Cutoff::ClosestToOne), None);
    }

    #[test]
    fn rank_threshold_per_ordering() {
        let t = Terms {
            term1: 0.4,
            term2: 0.1,
            term3: 0.05,
            norm2: 0.2,
        };
        assert!((rank_threshold(Loss::Original, CoeffOrdering::QTerm, 0.3, 0, &t) - 0.35).abs() < 1e-15);
        assert!((rank_threshold(Loss::Improved, CoeffOrdering::QTerm, 0.3, 0, &t) - 0.25).abs() < 1e-15);
        assert!(
            (rank_threshold(Loss::Normed, CoeffOrdering::Traditional, -0.3, 3, &t) - 0.15).abs()
                < 1e-15
        );
    }
}
