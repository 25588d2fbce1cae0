//! Model command implementation

use crate::config_loader::display_path;
use crate::output::OutputWriter;
use crate::output_types::ModelOutput;
use anyhow::{Context, Result};
use cropsight_analysis::ModelContext;
use cropsight_core::config::LayeredConfig;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let context = ModelContext::from_config(config).context("Failed to load model artifacts")?;
    let summary = context.summary();

    let result = ModelOutput {
        model_path: display_path(&config.model_path.value),
        scaler_path: display_path(&config.scaler_path.value),
        classifier: summary.classifier,
        feature_names: summary.feature_names,
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.success("Model artifacts are valid");
        output.kv("Model", &result.model_path);
        output.kv("Scaler", &result.scaler_path);
        output.kv("Classifier", &result.classifier);
        output.kv("Features", result.feature_names.join(", "));
    }

    Ok(())
}
