use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WdeToml {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wavelet basis and neighbor order.
    #[serde(default)]
    pub estimator: EstimatorToml,

    /// Coefficient selection for `fit`.
    #[serde(default)]
    pub selection: SelectionToml,

    /// Level search for `levels`.
    #[serde(default)]
    pub levels: LevelsToml,

    /// Synthetic sample generation.
    #[serde(default)]
    pub data: DataToml,

    /// Summary output.
    #[serde(default)]
    pub report: ReportToml,
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<WdeToml> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorToml {
    #[serde(default = "default_waves")]
    pub waves: Vec<WaveToml>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub delta_j: u32,
}

impl Default for EstimatorToml {
    fn default() -> Self {
        Self {
            waves: default_waves(),
            k: default_k(),
            delta_j: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveToml {
    pub name: String,
    #[serde(default = "default_j0")]
    pub j0: u32,
}

fn default_waves() -> Vec<WaveToml> {
    vec![WaveToml {
        name: "db2".to_string(),
        j0: default_j0(),
    }]
}
fn default_j0() -> u32 {
    2
}
fn default_k() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionToml {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_loss")]
    pub loss: String,
    #[serde(default = "default_ordering")]
    pub ordering: String,
    #[serde(default = "default_cutoff")]
    pub cutoff: String,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
}

impl Default for SelectionToml {
    fn default() -> Self {
        Self {
            method: default_method(),
            loss: default_loss(),
            ordering: default_ordering(),
            cutoff: default_cutoff(),
            smoothing_window: default_smoothing_window(),
        }
    }
}

fn default_method() -> String {
    "fit".to_string()
}
fn default_loss() -> String {
    "improved".to_string()
}
fn default_ordering() -> String {
    "qterm".to_string()
}
fn default_cutoff() -> String {
    "max-smoothed".to_string()
}
fn default_smoothing_window() -> usize {
    5
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelsToml {
    #[serde(default = "default_level_mode")]
    pub mode: String,
}

impl Default for LevelsToml {
    fn default() -> Self {
        Self {
            mode: default_level_mode(),
        }
    }
}

fn default_level_mode() -> String {
    "normed".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataToml {
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default = "default_n")]
    pub n: usize,
    #[serde(default = "default_dim")]
    pub dim: usize,
}

impl Default for DataToml {
    fn default() -> Self {
        Self {
            distribution: default_distribution(),
            n: default_n(),
            dim: default_dim(),
        }
    }
}

fn default_distribution() -> String {
    "normal".to_string()
}
fn default_n() -> usize {
    200
}
fn default_dim() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportToml {
    /// Grid points per axis for the summary integral.
    #[serde(default = "default_grid")]
    pub grid: usize,
    pub output: Option<PathBuf>,
}

impl Default for ReportToml {
    fn default() -> Self {
        Self {
            grid: default_grid(),
            output: None,
        }
    }
}

fn default_grid() -> usize {
    200
}
