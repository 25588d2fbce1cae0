//! Command implementations

mod analyze;
mod classify;
mod config;
mod model;
mod predict;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Analyze(args) => analyze::execute(args, &config, output),
        Commands::Indices(args) => analyze::execute_indices(args, &config, output),
        Commands::Classify(args) => classify::execute(args, output),
        Commands::Predict(args) => predict::execute(args, &config, output),
        Commands::Model => model::execute(&config, output),
        Commands::Config => config::execute(&config, output),
    }
}
