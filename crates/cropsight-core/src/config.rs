use crate::error::{CropsightError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw Sentinel-2 L2A digital numbers are reflectance scaled by this factor
pub const DEFAULT_REFLECTANCE_SCALE: f64 = 10_000.0;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for CropSight
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub model_path: ConfigValue<PathBuf>,
    pub scaler_path: ConfigValue<PathBuf>,
    pub reflectance_scale: ConfigValue<f64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            model_path: ConfigValue::new(
                PathBuf::from("model/crop_health_model.json"),
                ConfigSource::Default,
            ),
            scaler_path: ConfigValue::new(PathBuf::from("model/scaler.json"), ConfigSource::Default),
            reflectance_scale: ConfigValue::new(DEFAULT_REFLECTANCE_SCALE, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CropsightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CropsightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(model_path) = file_config.model_path {
            self.model_path.update(model_path, ConfigSource::File);
        }

        if let Some(scaler_path) = file_config.scaler_path {
            self.scaler_path.update(scaler_path, ConfigSource::File);
        }

        if let Some(scale) = file_config.reflectance_scale {
            self.reflectance_scale.update(parse_reflectance_scale(scale)?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CROPSIGHT_MODEL_PATH
        if let Ok(path) = env::var("CROPSIGHT_MODEL_PATH") {
            self.model_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // CROPSIGHT_SCALER_PATH
        if let Ok(path) = env::var("CROPSIGHT_SCALER_PATH") {
            self.scaler_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // CROPSIGHT_REFLECTANCE_SCALE
        if let Ok(scale_str) = env::var("CROPSIGHT_REFLECTANCE_SCALE") {
            match scale_str.parse::<f64>().ok().and_then(|v| parse_reflectance_scale(v).ok()) {
                Some(scale) => self.reflectance_scale.update(scale, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CROPSIGHT_REFLECTANCE_SCALE value '{}': expected a positive number",
                    scale_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(model_path) = overrides.model_path {
            self.model_path.update(model_path, ConfigSource::Cli);
        }

        if let Some(scaler_path) = overrides.scaler_path {
            self.scaler_path.update(scaler_path, ConfigSource::Cli);
        }

        if let Some(scale) = overrides.reflectance_scale {
            match parse_reflectance_scale(scale) {
                Ok(scale) => self.reflectance_scale.update(scale, ConfigSource::Cli),
                Err(e) => tracing::warn!("Ignoring CLI reflectance scale: {}", e),
            }
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "model_path".to_string(),
            (self.model_path.value.display().to_string(), self.model_path.source),
        );

        map.insert(
            "scaler_path".to_string(),
            (self.scaler_path.value.display().to_string(), self.scaler_path.source),
        );

        map.insert(
            "reflectance_scale".to_string(),
            (self.reflectance_scale.value.to_string(), self.reflectance_scale.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    model_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
    reflectance_scale: Option<f64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub model_path: Option<PathBuf>,
    pub scaler_path: Option<PathBuf>,
    pub reflectance_scale: Option<f64>,
}

/// Validate a reflectance scale factor
pub fn parse_reflectance_scale(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CropsightError::ConfigInvalid {
            key: "reflectance_scale".to_string(),
            reason: format!("Scale must be a positive finite number, got {}", value),
        })
    }
}
