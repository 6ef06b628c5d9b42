use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Square-root wavelet density estimator.
#[derive(Parser)]
#[command(
    name = "wde",
    version,
    about = "Square-root wavelet density estimation on synthetic samples"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Draw samples and fit a density with the configured selection method.
    Fit(RunArgs),
    /// Draw samples and score the scaling-only resolution levels.
    Levels(RunArgs),
}

/// Arguments shared by `fit` and `levels`.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "wde.toml")]
    pub config: PathBuf,

    /// Override the JSON summary path from config (stdout if unset).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
