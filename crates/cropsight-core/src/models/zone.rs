//! Zone labels and status descriptions produced by the zone classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse land-cover zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "Bare soil")]
    BareSoil,
    Vegetation,
}

impl Zone {
    pub fn label(&self) -> &'static str {
        match self {
            Zone::BareSoil => "Bare soil",
            Zone::Vegetation => "Vegetation",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field status; each variant belongs to exactly one [`Zone`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneStatus {
    ExposedSoil,
    Sparse,
    SparseHighWaterStress,
    SparseMoistureDeficiency,
    EarlyGrowth,
    ModerateSevereWaterStress,
    ModerateMoistureStress,
    ModerateSoilBackground,
    ModerateStable,
    DenseEmergingWaterStress,
    HealthyDecliningMoisture,
    HealthyDense,
}

impl ZoneStatus {
    pub const ALL: [ZoneStatus; 12] = [
        ZoneStatus::ExposedSoil,
        ZoneStatus::Sparse,
        ZoneStatus::SparseHighWaterStress,
        ZoneStatus::SparseMoistureDeficiency,
        ZoneStatus::EarlyGrowth,
        ZoneStatus::ModerateSevereWaterStress,
        ZoneStatus::ModerateMoistureStress,
        ZoneStatus::ModerateSoilBackground,
        ZoneStatus::ModerateStable,
        ZoneStatus::DenseEmergingWaterStress,
        ZoneStatus::HealthyDecliningMoisture,
        ZoneStatus::HealthyDense,
    ];

    pub fn zone(&self) -> Zone {
        match self {
            ZoneStatus::ExposedSoil => Zone::BareSoil,
            _ => Zone::Vegetation,
        }
    }

    /// Human-readable status string
    pub fn description(&self) -> &'static str {
        match self {
            ZoneStatus::ExposedSoil => "Exposed soil or recently harvested field",
            ZoneStatus::Sparse => "Sparse vegetation",
            ZoneStatus::SparseHighWaterStress => "Sparse vegetation with high water stress",
            ZoneStatus::SparseMoistureDeficiency => "Sparse vegetation with moisture deficiency",
            ZoneStatus::EarlyGrowth => "Early growth stage or sparse vegetation",
            ZoneStatus::ModerateSevereWaterStress => {
                "Moderate vegetation with severe water stress"
            }
            ZoneStatus::ModerateMoistureStress => "Moderate vegetation with moisture stress",
            ZoneStatus::ModerateSoilBackground => {
                "Moderate vegetation with soil background influence"
            }
            ZoneStatus::ModerateStable => "Moderate and stable vegetation health",
            ZoneStatus::DenseEmergingWaterStress => "Dense vegetation under emerging water stress",
            ZoneStatus::HealthyDecliningMoisture => "Healthy canopy with declining moisture",
            ZoneStatus::HealthyDense => "Healthy and dense vegetation",
        }
    }

    /// (zone label, status) pair as reported downstream
    pub fn as_pair(&self) -> (&'static str, &'static str) {
        (self.zone().label(), self.description())
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.zone(), self.description())
    }
}
