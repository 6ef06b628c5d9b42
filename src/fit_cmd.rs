//! Fit command: draw samples and fit a density with the configured method.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use wde_estimator::{Density, WaveletDensityEstimator};

use crate::cli::RunArgs;
use crate::config;
use crate::convert::{self, Method};
use crate::report::{self, FitSummary};
use crate::synthetic;

/// Run the fit pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("fit").entered();
    let config = config::load(&args.config)?;

    let wde_cfg = convert::build_wde_config(&config.estimator)?;
    let method = convert::build_method(&config.selection)?;
    let (distribution, n, dim) = convert::build_data(&config.data)?;

    let mut rng = match args.seed.or(config.seed) {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let samples = synthetic::draw(distribution, n, dim, &mut rng)?;
    info!(?distribution, n, dim, "drew samples");

    let mut wde = WaveletDensityEstimator::new(wde_cfg).context("failed to build estimator")?;
    let (density, kept_details): (Density, Option<usize>) = match &method {
        Method::Fit => (wde.fit(&samples)?.clone(), None),
        Method::Cv(cv) => {
            let selection = wde.cvfit_with(&samples, cv).context("cross-validation failed")?;
            info!(
                cutoff = selection.cutoff(),
                candidates = selection.curve().len(),
                "cross-validated cutoff"
            );
            (selection.density().clone(), Some(selection.cutoff()))
        }
        Method::Mdl => {
            let selection = wde.mdlfit(&samples).context("MDL selection failed")?;
            (selection.density().clone(), None)
        }
        Method::Threshold => {
            let selection = wde.best_c(&samples).context("hard thresholding failed")?;
            (selection.density().clone(), Some(selection.count()))
        }
    };

    let integral = report::grid_integral(&density, &samples, config.report.grid)?;
    if let Some(integral) = integral {
        info!(integral, "grid integral");
    }
    let fit_info = wde
        .info()
        .context("estimator reported no fit metadata")?;
    let summary = FitSummary::new(fit_info, &samples, integral, kept_details);
    let output = args.output.or(config.report.output);
    report::write_json(&summary, output.as_deref())
}
