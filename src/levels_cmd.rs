//! Levels command: score the scaling-only resolution levels.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use wde_estimator::WaveletDensityEstimator;

use crate::cli::RunArgs;
use crate::config;
use crate::convert;
use crate::report::{self, LevelsSummary};
use crate::synthetic;

/// Run the level search.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("levels").entered();
    let config = config::load(&args.config)?;

    let wde_cfg = convert::build_wde_config(&config.estimator)?;
    let mode = convert::build_level_mode(&config.levels)?;
    let (distribution, n, dim) = convert::build_data(&config.data)?;

    let mut rng = match args.seed.or(config.seed) {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let samples = synthetic::draw(distribution, n, dim, &mut rng)?;

    let mut wde = WaveletDensityEstimator::new(wde_cfg).context("failed to build estimator")?;
    let selection = wde.best_j(&samples, mode).context("level search failed")?;
    info!(
        best_level = selection.best_level(),
        score = selection.best().score(),
        "level search complete"
    );

    let output = args.output.or(config.report.output);
    report::write_json(&LevelsSummary::new(&selection), output.as_deref())
}
