mod cli;
mod config;
mod convert;
mod fit_cmd;
mod levels_cmd;
mod logging;
mod report;
mod synthetic;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Fit(args) => fit_cmd::run(args),
        Command::Levels(args) => levels_cmd::run(args),
    }
}
