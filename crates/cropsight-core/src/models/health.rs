//! Crop-health inputs, feature vector and prediction result.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const FEATURE_COUNT: usize = 14;

/// Feature names in the order the scaler and classifier were trained on
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "NDVI",
    "SAVI",
    "Chlorophyll_Content",
    "Leaf_Area_Index",
    "Temperature",
    "Humidity",
    "Vapor_Pressure_Deficit",
    "Soil_Moisture",
    "Soil_pH",
    "Rainfall",
    "Crop_Stress_Indicator",
    "Crop_Maize",
    "Crop_Rice",
    "Crop_Wheat",
];

/// Crop type as used by the one-hot encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropType {
    Maize,
    Rice,
    Wheat,
    /// A supplied name that matches none of the trained crops
    Unrecognized(String),
}

impl CropType {
    /// Resolve a crop name case-insensitively; absent or empty names mean wheat
    pub fn resolve(name: Option<&str>) -> Self {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => return CropType::Wheat,
        };

        match name.to_lowercase().as_str() {
            "maize" => CropType::Maize,
            "rice" => CropType::Rice,
            "wheat" => CropType::Wheat,
            _ => CropType::Unrecognized(name.to_string()),
        }
    }

    /// (is_maize, is_rice, is_wheat)
    pub fn one_hot(&self) -> (f64, f64, f64) {
        match self {
            CropType::Maize => (1.0, 0.0, 0.0),
            CropType::Rice => (0.0, 1.0, 0.0),
            CropType::Wheat => (0.0, 0.0, 1.0),
            CropType::Unrecognized(_) => (0.0, 0.0, 0.0),
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropType::Maize => f.write_str("maize"),
            CropType::Rice => f.write_str("rice"),
            CropType::Wheat => f.write_str("wheat"),
            CropType::Unrecognized(name) => write!(f, "{} (unrecognized)", name),
        }
    }
}

/// Optional agro-meteorological measurements supplied with a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub soil_ph: Option<f64>,
    pub rainfall: Option<f64>,
}

impl FieldData {
    /// Fill gaps with the built-in defaults; non-finite values count as gaps
    pub fn resolve(&self) -> ResolvedFieldData {
        let defaults = ResolvedFieldData::default();
        let pick = |value: Option<f64>, default: f64| match value {
            Some(v) if v.is_finite() => v,
            Some(v) => {
                tracing::warn!("Ignoring non-finite field measurement {}, using {}", v, default);
                default
            }
            None => default,
        };

        ResolvedFieldData {
            temperature: pick(self.temperature, defaults.temperature),
            humidity: pick(self.humidity, defaults.humidity),
            soil_moisture: pick(self.soil_moisture, defaults.soil_moisture),
            soil_ph: pick(self.soil_ph, defaults.soil_ph),
            rainfall: pick(self.rainfall, defaults.rainfall),
        }
    }
}

/// Field measurements with every value present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFieldData {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    pub soil_moisture: f64,
    pub soil_ph: f64,
    /// Rainfall in mm
    pub rainfall: f64,
}

impl Default for ResolvedFieldData {
    fn default() -> Self {
        Self {
            temperature: 28.0,
            humidity: 65.0,
            soil_moisture: 0.35,
            soil_ph: 6.5,
            rainfall: 30.0,
        }
    }
}

/// Classifier input, one field per training column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub ndvi: f64,
    pub savi: f64,
    pub chlorophyll_content: f64,
    pub leaf_area_index: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub vapor_pressure_deficit: f64,
    pub soil_moisture: f64,
    pub soil_ph: f64,
    pub rainfall: f64,
    pub crop_stress_indicator: f64,
    pub crop_maize: f64,
    pub crop_rice: f64,
    pub crop_wheat: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ndvi,
            self.savi,
            self.chlorophyll_content,
            self.leaf_area_index,
            self.temperature,
            self.humidity,
            self.vapor_pressure_deficit,
            self.soil_moisture,
            self.soil_ph,
            self.rainfall,
            self.crop_stress_indicator,
            self.crop_maize,
            self.crop_rice,
            self.crop_wheat,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Healthy,
    Unhealthy,
}

impl HealthLabel {
    /// Class 1 is healthy, every other class unhealthy
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            HealthLabel::Healthy
        } else {
            HealthLabel::Unhealthy
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthLabel::Healthy => f.write_str("Healthy"),
            HealthLabel::Unhealthy => f.write_str("Unhealthy"),
        }
    }
}

/// Values estimated from the indices, reported for explainability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimatedInputs {
    pub savi: f64,
    pub chlorophyll_content: f64,
    pub leaf_area_index: f64,
    pub crop_stress_indicator: u32,
    pub vpd: f64,
}

/// Crop-health classification for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthPrediction {
    pub prediction: HealthLabel,
    pub confidence: f64,
    pub healthy_prob: f64,
    pub unhealthy_prob: f64,
    pub estimated_inputs: EstimatedInputs,
    #[serde(skip)]
    pub features: FeatureVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_type_is_case_insensitive() {
        for name in ["MAIZE", "Maize", "maize"] {
            assert_eq!(CropType::resolve(Some(name)), CropType::Maize);
        }
        assert_eq!(CropType::resolve(Some("RiCe")).one_hot(), (0.0, 1.0, 0.0));
    }

    #[test]
    fn test_absent_crop_type_defaults_to_wheat() {
        assert_eq!(CropType::resolve(None), CropType::Wheat);
        assert_eq!(CropType::resolve(Some("")), CropType::Wheat);
    }

    #[test]
    fn test_unrecognized_crop_type_encodes_all_zero() {
        let crop = CropType::resolve(Some("sorghum"));
        assert_eq!(crop, CropType::Unrecognized("sorghum".to_string()));
        assert_eq!(crop.one_hot(), (0.0, 0.0, 0.0));
        // Whitespace is not trimmed
        assert_eq!(CropType::resolve(Some(" wheat")).one_hot(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_field_data_defaults() {
        let resolved = FieldData::default().resolve();
        assert_eq!(resolved, ResolvedFieldData::default());
        assert_eq!(resolved.temperature, 28.0);
        assert_eq!(resolved.rainfall, 30.0);
    }

    #[test]
    fn test_supplied_field_data_used_verbatim() {
        let data = FieldData {
            temperature: Some(31.5),
            humidity: Some(40.0),
            soil_moisture: Some(0.1),
            soil_ph: Some(7.2),
            rainfall: Some(0.0),
        };
        let resolved = data.resolve();
        assert_eq!(resolved.temperature, 31.5);
        assert_eq!(resolved.humidity, 40.0);
        assert_eq!(resolved.soil_moisture, 0.1);
        assert_eq!(resolved.soil_ph, 7.2);
        assert_eq!(resolved.rainfall, 0.0);
    }

    #[test]
    fn test_non_finite_field_data_degrades_to_default() {
        let data = FieldData { humidity: Some(f64::NAN), ..Default::default() };
        assert_eq!(data.resolve().humidity, 65.0);
    }

    #[test]
    fn test_field_data_from_partial_json() {
        let data: FieldData = serde_json::from_str(r#"{"temperature": 22.0}"#).unwrap();
        assert_eq!(data.temperature, Some(22.0));
        assert_eq!(data.humidity, None);
    }
}
