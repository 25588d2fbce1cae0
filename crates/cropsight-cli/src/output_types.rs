use cropsight_core::models::{EstimatedInputs, IndexSet, Zone, ZoneStatus};
use serde::Serialize;
use tabled::Tabled;

/// Output for classify command
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub zone_type: Zone,
    pub health_status: &'static str,
}

impl From<ZoneStatus> for ClassifyOutput {
    fn from(status: ZoneStatus) -> Self {
        Self { zone_type: status.zone(), health_status: status.description() }
    }
}

/// Output for model command
#[derive(Debug, Serialize)]
pub struct ModelOutput {
    pub model_path: String,
    pub scaler_path: String,
    pub classifier: String,
    pub feature_names: Vec<&'static str>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

#[derive(Tabled)]
pub struct IndexRow {
    #[tabled(rename = "Index")]
    pub index: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl IndexRow {
    pub fn rows(indices: &IndexSet) -> Vec<Self> {
        indices
            .entries()
            .into_iter()
            .map(|(name, value)| IndexRow {
                index: name.as_str(),
                value: value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "n/a".to_string()),
            })
            .collect()
    }
}

#[derive(Tabled)]
pub struct InputRow {
    #[tabled(rename = "Estimated input")]
    pub name: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl InputRow {
    pub fn rows(inputs: &EstimatedInputs) -> Vec<Self> {
        vec![
            InputRow { name: "SAVI", value: format!("{:.4}", inputs.savi) },
            InputRow {
                name: "Chlorophyll content",
                value: format!("{:.4}", inputs.chlorophyll_content),
            },
            InputRow { name: "Leaf area index", value: format!("{:.4}", inputs.leaf_area_index) },
            InputRow {
                name: "Crop stress indicator",
                value: inputs.crop_stress_indicator.to_string(),
            },
            InputRow { name: "VPD (kPa)", value: format!("{:.4}", inputs.vpd) },
        ]
    }
}

#[derive(Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
