//! JSON summaries written by the subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use wde_estimator::{Density, FitInfo, LevelSelection, Samples};
use wde_stats::{mean, sd, trapezoid};

/// Summary of a `fit` run.
#[derive(Debug, Serialize)]
pub struct FitSummary {
    pub method: String,
    pub name: String,
    pub n: usize,
    pub dim: usize,
    pub nparams: usize,
    pub norm_const: f64,
    pub min_num: Option<usize>,
    pub elapsed_ms: f64,
    /// Per-axis sample mean.
    pub sample_mean: Vec<f64>,
    /// Per-axis sample standard deviation.
    pub sample_sd: Vec<f64>,
    /// Grid integral over the padded sample box; `None` above two axes.
    pub integral: Option<f64>,
    /// Number of detail coefficients kept by cv or threshold selection.
    pub kept_details: Option<usize>,
}

impl FitSummary {
    pub fn new(
        info: &FitInfo,
        samples: &Samples,
        integral: Option<f64>,
        kept_details: Option<usize>,
    ) -> Self {
        let columns: Vec<Vec<f64>> = (0..samples.dim()).map(|a| samples.column(a)).collect();
        Self {
            method: info.method.to_string(),
            name: info.name.clone(),
            n: info.n,
            dim: info.dim,
            nparams: info.nparams,
            norm_const: info.norm_const,
            min_num: info.min_num,
            elapsed_ms: info.elapsed.as_secs_f64() * 1e3,
            sample_mean: columns.iter().map(|c| mean(c)).collect(),
            sample_sd: columns.iter().map(|c| sd(c)).collect(),
            integral,
            kept_details,
        }
    }
}

/// Summary of a `levels` run.
#[derive(Debug, Serialize)]
pub struct LevelsSummary {
    pub mode: String,
    pub best_level: u32,
    pub levels: Vec<LevelEntry>,
}

#[derive(Debug, Serialize)]
pub struct LevelEntry {
    pub level: u32,
    pub score: f64,
    pub is_best: bool,
    pub nparams: usize,
    pub elapsed_ms: f64,
}

impl LevelsSummary {
    pub fn new(selection: &LevelSelection) -> Self {
        Self {
            mode: selection.mode().to_string(),
            best_level: selection.best_level(),
            levels: selection
                .levels()
                .iter()
                .map(|l| LevelEntry {
                    level: l.level(),
                    score: l.score(),
                    is_best: l.is_best(),
                    nparams: l.density().nparams(),
                    elapsed_ms: l.elapsed().as_secs_f64() * 1e3,
                })
                .collect(),
        }
    }
}

/// Trapezoid integral of the density on a `grid`-point lattice over the
/// sample box padded by a quarter of its width on each side.
pub fn grid_integral(density: &Density, samples: &Samples, grid: usize) -> Result<Option<f64>> {
    if grid < 2 || samples.dim() > 2 {
        return Ok(None);
    }
    let (minx, maxx) = samples.bounds();
    let axes: Vec<(f64, f64)> = minx
        .iter()
        .zip(&maxx)
        .map(|(&lo, &hi)| {
            let pad = 0.25 * (hi - lo).max(1e-3);
            let start = lo - pad;
            (start, (hi + pad - start) / (grid - 1) as f64)
        })
        .collect();
    let at = |axis: usize, i: usize| axes[axis].0 + i as f64 * axes[axis].1;

    let integral = match axes.len() {
        1 => {
            let points: Vec<f64> = (0..grid).map(|i| at(0, i)).collect();
            trapezoid(&density.eval_many(&points)?, axes[0].1)
        }
        _ => {
            let points: Vec<f64> = (0..grid)
                .flat_map(|i| (0..grid).flat_map(move |j| [at(0, i), at(1, j)]))
                .collect();
            let values = density.eval_many(&points)?;
            let rows: Vec<f64> = values
                .chunks_exact(grid)
                .map(|row| trapezoid(row, axes[1].1))
                .collect();
            trapezoid(&rows, axes[0].1)
        }
    };
    Ok(Some(integral))
}

/// Writes `value` as pretty JSON to `path`, or to stdout when unset.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize summary")?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write summary: {}", path.display()))?;
            info!(path = %path.display(), "summary written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wde_estimator::{WaveSpec, WaveletDensityEstimator, WdeConfig};

    #[test]
    fn grid_integral_of_uniform_fit() {
        let g = (5f64.sqrt() - 1.0) / 2.0;
        let xs: Vec<f64> = (0..200).map(|i| (0.5 + i as f64 * g).fract()).collect();
        let samples = Samples::new(xs, 1).unwrap();
        let mut wde =
            WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 2)])).unwrap();
        let density = wde.fit(&samples).unwrap();

        // The padded box [-0.25, 1.25] misses part of the boundary functions.
        let integral = grid_integral(density, &samples, 1501).unwrap().unwrap();
        assert!(integral > 0.8 && integral < 1.0 + 1e-3, "integral = {integral}");

        let mut summary = FitSummary::new(wde.info().unwrap(), &samples, Some(integral), None);
        summary.elapsed_ms = 0.0;
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["method"], "fit");
        assert_eq!(json["n"], 200);
        let mean = json["sample_mean"][0].as_f64().unwrap();
        assert!((mean - 0.5).abs() < 0.02, "mean = {mean}");
        assert_abs_diff_eq!(json["integral"].as_f64().unwrap(), integral);
    }

    #[test]
    fn grid_integral_skips_high_dimensions() {
        let xs: Vec<f64> = (0..30).map(|i| (i as f64 * 0.618_034).fract()).collect();
        let line = Samples::new(xs, 1).unwrap();
        let mut wde =
            WaveletDensityEstimator::new(WdeConfig::new(vec![WaveSpec::new("db2", 1)])).unwrap();
        let density = wde.fit(&line).unwrap();

        let cube = Samples::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 3).unwrap();
        assert_eq!(grid_integral(density, &cube, 10).unwrap(), None);
        assert_eq!(grid_integral(density, &line, 1).unwrap(), None);
    }
}
