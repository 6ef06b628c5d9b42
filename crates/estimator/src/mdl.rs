//! Minimum-description-length style truncation.

use std::sync::Arc;

use tracing::debug;
use wde_wavelet::TensorWavelet;

use crate::density::Density;
use crate::error::WdeError;
use crate::state::FitState;

/// Contributions below this magnitude end the selection.
pub const MDL_TOLERANCE: f64 = 1e-5;

/// Outcome of [`WaveletDensityEstimator::mdlfit`](crate::WaveletDensityEstimator::mdlfit).
#[derive(Debug, Clone)]
pub struct MdlSelection {
    kept: usize,
    considered: usize,
    density: Density,
}

impl MdlSelection {
    /// Number of coefficients in the density.
    pub fn kept(&self) -> usize {
        self.kept
    }

    /// Number of non-zero coefficients ranked.
    pub fn considered(&self) -> usize {
        self.considered
    }

    pub fn density(&self) -> &Density {
        &self.density
    }
}

/// Ranks every non-zero coefficient by its leave-one-out contribution and
/// keeps them up to and including the first one below [`MDL_TOLERANCE`].
#[tracing::instrument(skip_all, fields(n = state.n()))]
pub(crate) fn calc_pdf_mdl(
    wave: &Arc<TensorWavelet>,
    state: &FitState,
    name: &str,
) -> Result<MdlSelection, WdeError> {
    let slots = state.nonzero_slots();
    let terms = state.terms(&slots);
    let mut ranked: Vec<_> = slots
        .into_iter()
        .zip(terms.iter().map(|t| t.contribution()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let considered = ranked.len();
    let kept = ranked
        .iter()
        .position(|&(_, contribution)| contribution.abs() < MDL_TOLERANCE)
        .map_or(considered, |pos| pos + 1);
    debug!(considered, kept, "truncated by contribution");

    let density = Density::new(
        Arc::clone(wave),
        &state.collect(ranked[..kept].iter().map(|&(s, _)| s)),
        format!("WDE-MDL({name})"),
    )?;
    Ok(MdlSelection {
        kept,
        considered,
        density,
    })
}
