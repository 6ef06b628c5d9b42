//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use wde_estimator::{CoeffOrdering, CvConfig, Cutoff, LevelMode, Loss, WaveSpec, WdeConfig};

use crate::config::{DataToml, EstimatorToml, LevelsToml, SelectionToml};
use crate::synthetic::SampleDistribution;

/// Coefficient selection applied by the `fit` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    /// Every coefficient of the lattice.
    Fit,
    /// Cross-validated subset selection.
    Cv(CvConfig),
    /// Contribution-ranked truncation.
    Mdl,
    /// Hard threshold on the detail coefficients.
    Threshold,
}

/// Parses a synthetic distribution name.
pub fn parse_distribution(s: &str) -> Result<SampleDistribution> {
    match s.to_lowercase().as_str() {
        "uniform" => Ok(SampleDistribution::Uniform),
        "normal" => Ok(SampleDistribution::Normal),
        "mixture" => Ok(SampleDistribution::Mixture),
        other => bail!("unknown distribution: {other:?}"),
    }
}

/// Builds a [`WdeConfig`] from the TOML estimator configuration.
pub fn build_wde_config(estimator: &EstimatorToml) -> Result<WdeConfig> {
    if estimator.waves.is_empty() {
        bail!("[estimator].waves must list at least one wavelet");
    }
    let waves = estimator
        .waves
        .iter()
        .map(|w| WaveSpec::new(&w.name, w.j0))
        .collect();
    let cfg = WdeConfig::new(waves)
        .with_k(estimator.k)
        .with_delta_j(estimator.delta_j);
    cfg.validate().context("invalid [estimator] configuration")?;
    Ok(cfg)
}

/// Builds the selection [`Method`] from the TOML selection configuration.
pub fn build_method(selection: &SelectionToml) -> Result<Method> {
    match selection.method.to_lowercase().as_str() {
        "fit" => Ok(Method::Fit),
        "cv" => Ok(Method::Cv(build_cv_config(selection)?)),
        "mdl" => Ok(Method::Mdl),
        "threshold" => Ok(Method::Threshold),
        other => bail!("unknown selection method: {other:?}"),
    }
}

/// Builds a [`CvConfig`] from the TOML selection configuration.
pub fn build_cv_config(selection: &SelectionToml) -> Result<CvConfig> {
    let loss: Loss = selection.loss.parse()?;
    let ordering: CoeffOrdering = selection.ordering.parse()?;
    let cutoff: Cutoff = selection.cutoff.parse()?;
    let cfg = CvConfig::new(loss, ordering)
        .with_cutoff(cutoff)
        .with_smoothing_window(selection.smoothing_window);
    cfg.validate().context("invalid [selection] configuration")?;
    Ok(cfg)
}

/// Parses the level search mode.
pub fn build_level_mode(levels: &LevelsToml) -> Result<LevelMode> {
    Ok(levels.mode.parse()?)
}

/// Validates the TOML data configuration.
pub fn build_data(data: &DataToml) -> Result<(SampleDistribution, usize, usize)> {
    let distribution = parse_distribution(&data.distribution)?;
    if data.dim == 0 {
        bail!("[data].dim must be >= 1");
    }
    if data.n < 3 {
        bail!("[data].n must be >= 3, got {}", data.n);
    }
    Ok((distribution, data.n, data.dim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WaveToml, WdeToml};

    #[test]
    fn defaults_convert() {
        let cfg: WdeToml = toml::from_str("").unwrap();
        let wde = build_wde_config(&cfg.estimator).unwrap();
        assert_eq!(wde.dim(), 1);
        assert_eq!(wde.j0s(), vec![2]);
        assert_eq!(build_method(&cfg.selection).unwrap(), Method::Fit);
        assert_eq!(build_level_mode(&cfg.levels).unwrap(), LevelMode::Normed);
        assert_eq!(
            build_data(&cfg.data).unwrap(),
            (SampleDistribution::Normal, 200, 1)
        );
    }

    #[test]
    fn cv_method() {
        let selection = SelectionToml {
            method: "CV".to_string(),
            loss: "original".to_string(),
            ordering: "traditional".to_string(),
            cutoff: "closest-to-one".to_string(),
            smoothing_window: 3,
        };
        let Method::Cv(cv) = build_method(&selection).unwrap() else {
            panic!("expected cv method");
        };
        assert_eq!(cv.loss(), Loss::Original);
        assert_eq!(cv.ordering(), CoeffOrdering::Traditional);
        assert_eq!(cv.cutoff(), Cutoff::ClosestToOne);
        assert_eq!(cv.smoothing_window(), 3);
    }

    #[test]
    fn conversion_errors() {
        let mut selection = SelectionToml::default();
        selection.method = "cv".to_string();
        selection.loss = "normed".to_string();
        assert!(build_method(&selection).is_err());

        selection.loss = "squared".to_string();
        assert!(build_cv_config(&selection).is_err());

        selection.loss = "improved".to_string();
        selection.smoothing_window = 4;
        assert!(build_cv_config(&selection).is_err());

        selection.method = "bayes".to_string();
        assert!(build_method(&selection).is_err());

        let estimator = EstimatorToml {
            waves: vec![],
            k: 1,
            delta_j: 0,
        };
        assert!(build_wde_config(&estimator).is_err());

        let estimator = EstimatorToml {
            waves: vec![WaveToml {
                name: "db2".to_string(),
                j0: 1,
            }],
            k: 0,
            delta_j: 0,
        };
        assert!(build_wde_config(&estimator).is_err());

        assert!(parse_distribution("cauchy").is_err());
        assert!(build_level_mode(&LevelsToml { mode: "max".to_string() }).is_err());
        assert!(
            build_data(&DataToml {
                distribution: "uniform".to_string(),
                n: 100,
                dim: 0,
            })
            .is_err()
        );
    }
}
