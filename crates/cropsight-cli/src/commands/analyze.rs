//! Analyze and indices command implementations

use crate::cli::{AnalyzeArgs, BandArgs};
use crate::output::OutputWriter;
use crate::output_types::{IndexRow, InputRow};
use anyhow::{Context, Result};
use cropsight_analysis::{FieldAnalyzer, ModelContext};
use cropsight_core::config::LayeredConfig;
use cropsight_core::models::{
    BandId, BandSource, BandSources, FieldAssessment, FieldRequest, HealthPrediction,
};
use cropsight_geo::load_polygon;
use cropsight_raster::GeoTiffReader;
use std::sync::Arc;

pub fn execute(args: AnalyzeArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let models = ModelContext::from_config(config).context("Failed to load model artifacts")?;
    let analyzer = analyzer(config, models)?;

    let mut request = build_request(&args.bands)?;
    request.crop_type = args.field.crop.clone();
    request.field_data = args.field.field_data();

    let assessment = analyzer.analyze(&request).context("Field analysis failed")?;

    if output.is_json() {
        output.result(&assessment)?;
    } else {
        print_assessment(&assessment, output);
    }

    Ok(())
}

pub fn execute_indices(args: BandArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let request = build_request(&args)?;

    // Indices need no model, only the band reader
    let reader = GeoTiffReader::new();
    let indices = cropsight_analysis::indices::compute_indices_with_scale(
        &reader,
        &request.bands,
        &request.polygon,
        config.reflectance_scale.value,
    )
    .context("Index calculation failed")?
    .rounded(4);

    if output.is_json() {
        output.result(indices)?;
    } else {
        output.section("Spectral Indices");
        output.table(IndexRow::rows(&indices));
    }

    Ok(())
}

fn analyzer(config: &LayeredConfig, models: ModelContext) -> Result<FieldAnalyzer> {
    let analyzer = FieldAnalyzer::new(Arc::new(GeoTiffReader::new()), Arc::new(models))
        .with_reflectance_scale(config.reflectance_scale.value)?;
    Ok(analyzer)
}

fn build_request(args: &BandArgs) -> Result<FieldRequest> {
    let polygon = load_polygon(&args.polygon)
        .with_context(|| format!("Failed to load field polygon from {}", args.polygon.display()))?;

    let bands = BandSources::new()
        .with(BandId::Blue, BandSource::new(&args.blue))
        .with(BandId::Green, BandSource::new(&args.green))
        .with(BandId::Red, BandSource::new(&args.red))
        .with(BandId::NearInfrared, BandSource::new(&args.nir))
        .with(BandId::ShortWaveInfrared, BandSource::new(&args.swir));

    Ok(FieldRequest { polygon, bands, crop_type: None, field_data: None })
}

fn print_assessment(assessment: &FieldAssessment, output: &OutputWriter) {
    output.section("Spectral Indices");
    output.table(IndexRow::rows(&assessment.indices));

    output.section("Zone");
    output.kv("Zone", assessment.zone_type);
    output.kv("Status", &assessment.health_status);

    print_health(&assessment.crop_health, output);
}

pub(super) fn print_health(health: &HealthPrediction, output: &OutputWriter) {
    output.section("Crop Health");
    output.kv("Prediction", health.prediction);
    output.kv("Confidence", format!("{:.3}", health.confidence));
    output.kv("Healthy probability", format!("{:.3}", health.healthy_prob));
    output.kv("Unhealthy probability", format!("{:.3}", health.unhealthy_prob));
    output.table(InputRow::rows(&health.estimated_inputs));
}
