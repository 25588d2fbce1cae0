//! Request and aggregate result of a whole field analysis.

use crate::models::band::BandSources;
use crate::models::health::{FieldData, HealthPrediction};
use crate::models::indices::IndexSet;
use crate::models::polygon::RegionPolygon;
use crate::models::zone::{Zone, ZoneStatus};
use serde::{Deserialize, Serialize};

/// Everything the pipeline needs for one field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRequest {
    pub polygon: RegionPolygon,
    pub bands: BandSources,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub field_data: Option<FieldData>,
}

/// Aggregate result handed to downstream consumers
#[derive(Debug, Clone, Serialize)]
pub struct FieldAssessment {
    /// Indices rounded to 4 decimals
    pub indices: IndexSet,
    pub zone_type: Zone,
    pub health_status: String,
    pub crop_health: HealthPrediction,
}

impl FieldAssessment {
    pub fn new(indices: &IndexSet, status: ZoneStatus, crop_health: HealthPrediction) -> Self {
        Self {
            indices: indices.rounded(4),
            zone_type: status.zone(),
            health_status: status.description().to_string(),
            crop_health,
        }
    }
}
