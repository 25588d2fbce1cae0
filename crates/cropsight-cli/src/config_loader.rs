//! Configuration loading utilities for CLI commands

use crate::cli::Cli;
use anyhow::{Context, Result};
use cropsight_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "cropsight.toml";

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match &cli.config {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                config = config
                    .load_from_file(default_path)
                    .context("Failed to load cropsight.toml")?;
            }
        }
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides(cli));
    Ok(config)
}

fn overrides(cli: &Cli) -> CliConfigOverrides {
    CliConfigOverrides {
        model_path: cli.model.clone(),
        scaler_path: cli.scaler.clone(),
        reflectance_scale: cli.reflectance_scale,
    }
}

/// Resolve a path relative to the working directory for display
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| PathBuf::from(path))
        .display()
        .to_string()
}
