//! Stateful estimator: caches the lattice per dataset and dispatches the
//! fitting strategies.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use wde_wavelet::TensorWavelet;

use crate::config::{CoeffOrdering, CvConfig, LevelMode, Loss, WdeConfig};
use crate::cv::{CvSelection, calc_pdf_cv};
use crate::density::Density;
use crate::error::WdeError;
use crate::key::CoeffMap;
use crate::level::{LevelSelection, best_j};
use crate::mdl::{MdlSelection, calc_pdf_mdl};
use crate::samples::Samples;
use crate::state::{FitState, ball_stats};
use crate::threshold::{ThresholdSelection, best_c};

/// Coefficients with fewer supporting samples than this trigger a warning.
const MIN_SUPPORT_WARNING: usize = 10;

/// Strategy that produced the current density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// Full lattice at `j0 .. j0 + delta_j`.
    Fit,
    CrossValidated { loss: Loss, ordering: CoeffOrdering },
    Mdl,
    /// Best scaling-only level.
    Level { level: u32 },
    /// Hard threshold keeping `count` detail coefficients.
    HardThreshold { count: usize },
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMethod::Fit => write!(f, "fit"),
            FitMethod::CrossValidated { loss, ordering } => write!(f, "cv({loss},{ordering})"),
            FitMethod::Mdl => write!(f, "mdl"),
            FitMethod::Level { level } => write!(f, "level(j={level})"),
            FitMethod::HardThreshold { count } => write!(f, "threshold(c={count})"),
        }
    }
}

/// Metadata of the last fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitInfo {
    pub method: FitMethod,
    pub name: String,
    pub dim: usize,
    pub n: usize,
    pub nparams: usize,
    pub norm_const: f64,
    pub min_num: Option<usize>,
    pub elapsed: Duration,
}

/// Square-root wavelet density estimator.
///
/// Ball statistics and the coefficient lattice are computed once per
/// dataset and reused while the sample fingerprint is unchanged.
///
/// # Example
///
/// ```
/// use wde_estimator::{CoeffOrdering, Loss, Samples, WaveSpec, WaveletDensityEstimator, WdeConfig};
///
/// let xs: Vec<f64> = (0..120).map(|i| (0.3 + i as f64 * 0.618_034).fract()).collect();
/// let samples = Samples::new(xs, 1).unwrap();
/// let config = WdeConfig::new(vec![WaveSpec::new("db2", 1)]).with_delta_j(2);
/// let mut wde = WaveletDensityEstimator::new(config).unwrap();
///
/// wde.cvfit(&samples, Loss::Improved, CoeffOrdering::QTerm).unwrap();
/// assert!(wde.pdf(&[0.5]).unwrap() >= 0.0);
/// assert_eq!(wde.info().unwrap().n, 120);
/// ```
#[derive(Debug)]
pub struct WaveletDensityEstimator {
    config: WdeConfig,
    wave: Arc<TensorWavelet>,
    state: Option<FitState>,
    density: Option<Density>,
    info: Option<FitInfo>,
}

impl WaveletDensityEstimator {
    /// Validates the configuration and builds the tensor wavelet.
    ///
    /// # Errors
    ///
    /// [`WdeError::InvalidConfiguration`] or a wrapped wavelet error for
    /// unknown or unsupported names.
    pub fn new(config: WdeConfig) -> Result<Self, WdeError> {
        config.validate()?;
        let wave = Arc::new(TensorWavelet::new(&config.names())?);
        Ok(Self {
            config,
            wave,
            state: None,
            density: None,
            info: None,
        })
    }

    pub fn config(&self) -> &WdeConfig {
        &self.config
    }

    pub fn wavelet(&self) -> &TensorWavelet {
        &self.wave
    }

    /// Density of the last fit.
    pub fn density(&self) -> Option<&Density> {
        self.density.as_ref()
    }

    /// Metadata of the last fit.
    pub fn info(&self) -> Option<&FitInfo> {
        self.info.as_ref()
    }

    /// Full coefficient lattice of the cached dataset.
    pub fn coefficients(&self) -> Option<CoeffMap> {
        self.state.as_ref().map(FitState::coeff_map)
    }

    /// Leave-one-out coefficients of the whole lattice with sample `i`
    /// removed, scaled by `ω(n−1,k)`.
    ///
    /// # Errors
    ///
    /// A wrapped [`wde_knn::KnnError::IndexOutOfRange`] when `i` is not a
    /// sample index.
    pub fn coefficients_no_i(&mut self, samples: &Samples, i: usize) -> Result<CoeffMap, WdeError> {
        self.ensure_state(samples)?;
        self.cached_state()?.coeff_map_no_i(i)
    }

    /// Drops the cached lattice so the next fit recomputes it.
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    /// Fits with every coefficient of the lattice.
    #[tracing::instrument(skip_all, fields(n = samples.n(), dim = samples.dim()))]
    pub fn fit(&mut self, samples: &Samples) -> Result<&Density, WdeError> {
        let t0 = Instant::now();
        self.ensure_state(samples)?;
        let state = self.cached_state()?;
        let density = Density::new(
            Arc::clone(&self.wave),
            &state.coeff_map(),
            format!("WDE({})", self.base_name()),
        )?;
        Ok(self.finish(FitMethod::Fit, samples.n(), density, t0))
    }

    /// Recomputes the lattice and fits, ignoring the cache.
    pub fn refit(&mut self, samples: &Samples) -> Result<&Density, WdeError> {
        self.invalidate();
        self.fit(samples)
    }

    /// Fits by cross-validated subset selection with default smoothing.
    pub fn cvfit(
        &mut self,
        samples: &Samples,
        loss: Loss,
        ordering: CoeffOrdering,
    ) -> Result<&Density, WdeError> {
        self.cvfit_with(samples, &CvConfig::new(loss, ordering))?;
        self.density.as_ref().ok_or_else(not_fitted)
    }

    /// Fits by cross-validated subset selection and returns the risk curve.
    ///
    /// # Errors
    ///
    /// [`WdeError::InvalidConfiguration`] for an invalid loss and ordering
    /// pair or a zero `delta_j`, before any computation.
    #[tracing::instrument(skip_all, fields(n = samples.n(), loss = %cv.loss(), ordering = %cv.ordering()))]
    pub fn cvfit_with(&mut self, samples: &Samples, cv: &CvConfig) -> Result<CvSelection, WdeError> {
        cv.validate()?;
        self.require_detail_levels("cross-validated selection")?;
        let t0 = Instant::now();
        let name = self.base_name();
        self.ensure_state(samples)?;
        let state = self.cached_state()?;
        let selection = calc_pdf_cv(&self.wave, state, cv, &name)?;
        let method = FitMethod::CrossValidated {
            loss: cv.loss(),
            ordering: cv.ordering(),
        };
        self.finish(method, samples.n(), selection.density().clone(), t0);
        Ok(selection)
    }

    /// Fits by truncating the contribution-ranked coefficients.
    #[tracing::instrument(skip_all, fields(n = samples.n()))]
    pub fn mdlfit(&mut self, samples: &Samples) -> Result<MdlSelection, WdeError> {
        let t0 = Instant::now();
        let name = self.base_name();
        self.ensure_state(samples)?;
        let state = self.cached_state()?;
        let selection = calc_pdf_mdl(&self.wave, state, &name)?;
        self.finish(FitMethod::Mdl, samples.n(), selection.density().clone(), t0);
        Ok(selection)
    }

    /// Searches the best scaling-only level and keeps its density.
    ///
    /// Needs only the ball statistics: a cached lattice for the same
    /// samples is reused, otherwise no detail blocks are built.
    #[tracing::instrument(skip_all, fields(n = samples.n(), mode = %mode))]
    pub fn best_j(&mut self, samples: &Samples, mode: LevelMode) -> Result<LevelSelection, WdeError> {
        let t0 = Instant::now();
        let name = self.base_name();
        let j0s = self.config.j0s();
        let fingerprint = samples.fingerprint();
        let computed;
        let (balls, bounds) = match self
            .state
            .as_ref()
            .filter(|state| state.fingerprint() == fingerprint)
        {
            Some(state) => (state.balls(), state.bounds()),
            None => {
                computed = (
                    ball_stats(&self.wave, self.config.k(), samples)?,
                    samples.bounds(),
                );
                let (minx, maxx) = &computed.1;
                (&computed.0, (minx.as_slice(), maxx.as_slice()))
            }
        };
        let selection = best_j(&self.wave, samples, balls, bounds, &j0s, mode, &name)?;
        let method = FitMethod::Level {
            level: selection.best_level(),
        };
        self.finish(method, samples.n(), selection.best_density().clone(), t0);
        Ok(selection)
    }

    /// Builds the hard-threshold curve over the detail coefficients.
    ///
    /// # Errors
    ///
    /// [`WdeError::InvalidConfiguration`] when `delta_j` is zero.
    #[tracing::instrument(skip_all, fields(n = samples.n()))]
    pub fn best_c(&mut self, samples: &Samples) -> Result<ThresholdSelection, WdeError> {
        self.require_detail_levels("hard thresholding")?;
        let t0 = Instant::now();
        let name = self.base_name();
        self.ensure_state(samples)?;
        let state = self.cached_state()?;
        let selection = best_c(&self.wave, state, &name)?;
        let method = FitMethod::HardThreshold {
            count: selection.count(),
        };
        self.finish(method, samples.n(), selection.density().clone(), t0);
        Ok(selection)
    }

    /// Evaluates the last fitted density.
    ///
    /// # Errors
    ///
    /// [`WdeError::InvalidConfiguration`] before the first fit,
    /// [`WdeError::DimensionMismatch`] for a point of the wrong length.
    pub fn pdf(&self, point: &[f64]) -> Result<f64, WdeError> {
        self.density.as_ref().ok_or_else(not_fitted)?.eval(point)
    }

    /// Reuses the cached lattice when the fingerprint matches.
    fn ensure_state(&mut self, samples: &Samples) -> Result<(), WdeError> {
        let fingerprint = samples.fingerprint();
        if self
            .state
            .as_ref()
            .is_some_and(|state| state.fingerprint() == fingerprint)
        {
            debug!(fingerprint, "reusing coefficient lattice");
            return Ok(());
        }
        self.state = None;
        self.state = Some(FitState::build(&self.wave, &self.config, samples)?);
        Ok(())
    }

    /// Fails unless `delta_j` is positive.
    fn require_detail_levels(&self, what: &str) -> Result<(), WdeError> {
        if self.config.delta_j() == 0 {
            return Err(WdeError::InvalidConfiguration(format!(
                "{what} needs delta_j > 0"
            )));
        }
        Ok(())
    }

    fn cached_state(&self) -> Result<&FitState, WdeError> {
        self.state.as_ref().ok_or_else(not_fitted)
    }

    fn finish(&mut self, method: FitMethod, n: usize, density: Density, t0: Instant) -> &Density {
        let info = FitInfo {
            method,
            name: density.name().to_string(),
            dim: density.dim(),
            n,
            nparams: density.nparams(),
            norm_const: density.norm_const(),
            min_num: density.min_num(),
            elapsed: t0.elapsed(),
        };
        info!(
            method = %info.method,
            name = %info.name,
            n = info.n,
            dim = info.dim,
            nparams = info.nparams,
            elapsed_ms = info.elapsed.as_millis() as u64,
            "fitted density"
        );
        if let Some(min_num) = info.min_num.filter(|&m| m < MIN_SUPPORT_WARNING) {
            warn!(min_num, "coefficients supported by few samples");
        }
        self.info = Some(info);
        self.density.insert(density)
    }

    /// `db2,j0=2,k=1,delta_j=0`; multiple axes give `db2+sym3,j0=[2,1],...`.
    fn base_name(&self) -> String {
        let j0s = self.config.j0s();
        let j0 = match j0s.as_slice() {
            [j] => j.to_string(),
            many => format!(
                "[{}]",
                many.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
            ),
        };
        format!(
            "{},j0={j0},k={},delta_j={}",
            self.wave.name(),
            self.config.k(),
            self.config.delta_j()
        )
    }
}

fn not_fitted() -> WdeError {
    WdeError::InvalidConfiguration("estimator has not been fitted".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveSpec;

    fn weyl(n: usize) -> Samples {
        let g = (5f64.sqrt() - 1.0) / 2.0;
        Samples::new((0..n).map(|i| (0.1 + i as f64 * g).fract()).collect(), 1).unwrap()
    }

    #[test]
    fn base_name_lists_axes() {
        let wde = WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 2)])).unwrap();
        assert_eq!(wde.base_name(), format!("{},j0=2,k=1,delta_j=0", wde.wavelet().name()));

        let two = WdeConfig::new(vec![WaveSpec::new("db2", 2), WaveSpec::new("db3", 1)]).with_k(2);
        let wde = WaveletDensityEstimator::new(two).unwrap();
        assert!(wde.base_name().ends_with(",j0=[2,1],k=2,delta_j=0"));
    }

    #[test]
    fn pdf_before_fit() {
        let wde = WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 1)])).unwrap();
        assert!(matches!(
            wde.pdf(&[0.5]).unwrap_err(),
            WdeError::InvalidConfiguration(_)
        ));
        assert!(wde.info().is_none());
    }

    #[test]
    fn state_cached_by_fingerprint() {
        let mut wde = WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 1)])).unwrap();
        let samples = weyl(60);
        wde.fit(&samples).unwrap();
        let first = wde.state.as_ref().unwrap().fingerprint();
        wde.fit(&samples).unwrap();
        assert_eq!(wde.state.as_ref().unwrap().fingerprint(), first);

        wde.fit(&weyl(61)).unwrap();
        assert_ne!(wde.state.as_ref().unwrap().fingerprint(), first);
        assert_eq!(wde.info().unwrap().n, 61);

        wde.invalidate();
        assert!(wde.state.is_none());
        assert!(wde.density().is_some());
    }

    #[test]
    fn level_search_skips_the_detail_lattice() {
        let config = WdeConfig::new(vec![WaveSpec::new("db2", 0)]).with_delta_j(2);
        let mut wde = WaveletDensityEstimator::new(config).unwrap();
        let samples = weyl(80);

        let fresh = wde.best_j(&samples, LevelMode::Normed).unwrap();
        assert!(wde.state.is_none());
        assert!(wde.density().is_some());

        wde.fit(&samples).unwrap();
        let cached = wde.best_j(&samples, LevelMode::Normed).unwrap();
        assert_eq!(wde.state.as_ref().unwrap().fingerprint(), samples.fingerprint());
        assert_eq!(fresh.best_level(), cached.best_level());
        for (a, b) in fresh.levels().iter().zip(cached.levels()) {
            assert_eq!(a.score(), b.score());
        }

        assert!(matches!(
            wde.best_j(&Samples::new(vec![0.1, 0.2, 0.3, 0.4], 2).unwrap(), LevelMode::Normed)
                .unwrap_err(),
            WdeError::DimensionMismatch {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn method_display() {
        assert_eq!(FitMethod::Fit.to_string(), "fit");
        assert_eq!(
            FitMethod::CrossValidated {
                loss: Loss::Improved,
                ordering: CoeffOrdering::QTerm
            }
            .to_string(),
            "cv(improved,qterm)"
        );
        assert_eq!(FitMethod::Level { level: 3 }.to_string(), "level(j=3)");
        assert_eq!(FitMethod::HardThreshold { count: 4 }.to_string(), "threshold(c=4)");
    }
}
