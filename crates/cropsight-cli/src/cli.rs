use clap::{Args, Parser, Subcommand};
use cropsight_core::models::FieldData;
use std::path::PathBuf;

/// CropSight - Per-field crop assessment from satellite reflectance
#[derive(Parser, Debug)]
#[command(name = "cropsight")]
#[command(about = "Per-field crop assessment from satellite reflectance", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./cropsight.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Crop health model artifact (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Feature scaler artifact (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub scaler: Option<PathBuf>,

    /// Divisor turning raw band values into reflectance
    #[arg(long, global = true, value_name = "SCALE", value_parser = parse_positive)]
    pub reflectance_scale: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full assessment for one field
    Analyze(AnalyzeArgs),

    /// Compute the spectral index set for one field
    Indices(BandArgs),

    /// Classify a zone from index values
    Classify(ClassifyArgs),

    /// Predict crop health from index values
    Predict(PredictArgs),

    /// Load and validate the model artifacts
    Model,

    /// Show the resolved configuration and where each value came from
    Config,
}

/// Field boundary and band sources
#[derive(Args, Debug)]
pub struct BandArgs {
    /// Field boundary as GeoJSON (Polygon geometry, Feature or FeatureCollection)
    #[arg(long, value_name = "FILE")]
    pub polygon: PathBuf,

    /// Blue band (B02) path or URL
    #[arg(long, value_name = "SRC")]
    pub blue: String,

    /// Green band (B03) path or URL
    #[arg(long, value_name = "SRC")]
    pub green: String,

    /// Red band (B04) path or URL
    #[arg(long, value_name = "SRC")]
    pub red: String,

    /// Near-infrared band (B08) path or URL
    #[arg(long, value_name = "SRC")]
    pub nir: String,

    /// Short-wave infrared band (B11) path or URL
    #[arg(long, value_name = "SRC")]
    pub swir: String,
}

/// Crop and on-site measurements
#[derive(Args, Debug)]
pub struct FieldArgs {
    /// Crop type (maize, rice or wheat; defaults to wheat)
    #[arg(long)]
    pub crop: Option<String>,

    /// Air temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Relative humidity in %
    #[arg(long)]
    pub humidity: Option<f64>,

    /// Volumetric soil moisture (0-1)
    #[arg(long)]
    pub soil_moisture: Option<f64>,

    /// Soil pH
    #[arg(long)]
    pub soil_ph: Option<f64>,

    /// Rainfall in mm
    #[arg(long)]
    pub rainfall: Option<f64>,
}

impl FieldArgs {
    /// Measurements as field data, `None` when nothing was supplied
    pub fn field_data(&self) -> Option<FieldData> {
        let data = FieldData {
            temperature: self.temperature,
            humidity: self.humidity,
            soil_moisture: self.soil_moisture,
            soil_ph: self.soil_ph,
            rainfall: self.rainfall,
        };
        (data != FieldData::default()).then_some(data)
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub bands: BandArgs,

    #[command(flatten)]
    pub field: FieldArgs,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub ndvi: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub evi: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub ndwi: f64,

    /// Moisture stress index (defaults to 1.0)
    #[arg(long, allow_hyphen_values = true)]
    pub msi: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub green: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub nir: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub red: f64,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub ndvi: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub savi: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub ndwi: f64,

    /// Moisture stress index (defaults to 1.0)
    #[arg(long, allow_hyphen_values = true)]
    pub msi: Option<f64>,

    #[command(flatten)]
    pub field: FieldArgs,
}

fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    cropsight_core::config::parse_reflectance_scale(value).map_err(|e| e.to_string())
}
