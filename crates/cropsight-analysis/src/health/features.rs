//! Feature estimation for the crop health model

use cropsight_core::models::{CropType, FeatureVector, IndexSet, ResolvedFieldData};

/// Saturation vapour pressure (Tetens) scaled by the humidity deficit, in kPa
pub fn vapor_pressure_deficit(temperature: f64, humidity: f64) -> f64 {
    let es = 0.6108 * (17.27 * temperature / (temperature + 237.3)).exp();
    (es * (1.0 - humidity / 100.0)).max(0.0)
}

/// Stress score in 0..=100; higher MSI and lower NDWI mean more stress
pub fn crop_stress_indicator(msi: f64, ndwi: f64) -> u32 {
    let raw = (msi - 0.5) * 30.0 + (1.0 - ndwi) * 20.0;
    raw.clamp(0.0, 100.0).trunc() as u32
}

pub fn chlorophyll_content(ndvi: f64) -> f64 {
    (ndvi * 1.8).max(0.0)
}

pub fn leaf_area_index(ndvi: f64) -> f64 {
    (ndvi * 5.5).max(0.0)
}

/// Assemble the 14 model features in training order
pub fn build_feature_vector(
    indices: &IndexSet,
    crop: &CropType,
    field: &ResolvedFieldData,
) -> FeatureVector {
    let msi = indices.msi_or_default();
    let (crop_maize, crop_rice, crop_wheat) = crop.one_hot();

    FeatureVector {
        ndvi: indices.ndvi,
        savi: indices.savi,
        chlorophyll_content: chlorophyll_content(indices.ndvi),
        leaf_area_index: leaf_area_index(indices.ndvi),
        temperature: field.temperature,
        humidity: field.humidity,
        vapor_pressure_deficit: vapor_pressure_deficit(field.temperature, field.humidity),
        soil_moisture: field.soil_moisture,
        soil_ph: field.soil_ph,
        rainfall: field.rainfall,
        crop_stress_indicator: crop_stress_indicator(msi, indices.ndwi) as f64,
        crop_maize,
        crop_rice,
        crop_wheat,
    }
}
