//! Predict command implementation

use super::analyze::print_health;
use crate::cli::PredictArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use cropsight_analysis::{predict_crop_health, ModelContext};
use cropsight_core::config::LayeredConfig;
use cropsight_core::models::IndexSet;

pub fn execute(args: PredictArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let models = ModelContext::from_config(config).context("Failed to load model artifacts")?;

    // The health model only reads NDVI, SAVI, NDWI and MSI
    let indices = IndexSet {
        ndvi: args.ndvi,
        savi: args.savi,
        evi: 0.0,
        ndwi: args.ndwi,
        msi: args.msi,
        red: 0.0,
        green: 0.0,
        nir: 0.0,
    };

    let field_data = args.field.field_data();
    let prediction =
        predict_crop_health(&models, &indices, args.field.crop.as_deref(), field_data.as_ref());

    if output.is_json() {
        output.result(&prediction)?;
    } else {
        print_health(&prediction, output);
    }

    Ok(())
}
