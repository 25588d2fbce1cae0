//! Rule-based zone classification
//!
//! The rules form an ordered list evaluated top to bottom; the first match
//! decides the [`ZoneStatus`]. Inputs that compare false everywhere (NaN)
//! fall through to the final rule, so the classifier is total.

use cropsight_core::models::{IndexSet, ZoneStatus};

/// Index values the rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneInputs {
    pub ndvi: f64,
    pub evi: f64,
    pub ndwi: f64,
    pub msi: f64,
    pub green: f64,
    pub nir: f64,
    pub red: f64,
}

struct ZoneRule {
    status: ZoneStatus,
    matches: fn(&ZoneInputs) -> bool,
}

const SPARSE_NDVI: f64 = 0.35;
const MODERATE_NDVI: f64 = 0.55;

static RULES: &[ZoneRule] = &[
    ZoneRule {
        status: ZoneStatus::ExposedSoil,
        matches: |z| z.evi < 0.4 && z.green < 0.1 && z.red < 0.1,
    },
    ZoneRule { status: ZoneStatus::Sparse, matches: |z| z.ndvi < SPARSE_NDVI && z.msi > 1.5 },
    // Same condition as the rule above, so it never fires
    ZoneRule {
        status: ZoneStatus::SparseHighWaterStress,
        matches: |z| z.ndvi < SPARSE_NDVI && z.msi > 1.5,
    },
    ZoneRule {
        status: ZoneStatus::SparseMoistureDeficiency,
        matches: |z| z.ndvi < SPARSE_NDVI && z.ndwi < -0.2,
    },
    ZoneRule { status: ZoneStatus::EarlyGrowth, matches: |z| z.ndvi < SPARSE_NDVI },
    ZoneRule {
        status: ZoneStatus::ModerateSevereWaterStress,
        matches: |z| z.ndvi < MODERATE_NDVI && z.msi > 1.8,
    },
    ZoneRule {
        status: ZoneStatus::ModerateMoistureStress,
        matches: |z| z.ndvi < MODERATE_NDVI && z.ndwi < -0.2,
    },
    ZoneRule {
        status: ZoneStatus::ModerateSoilBackground,
        matches: |z| z.ndvi < MODERATE_NDVI && z.evi < z.ndvi,
    },
    ZoneRule { status: ZoneStatus::ModerateStable, matches: |z| z.ndvi < MODERATE_NDVI },
    ZoneRule { status: ZoneStatus::DenseEmergingWaterStress, matches: |z| z.msi > 1.5 },
    ZoneRule { status: ZoneStatus::HealthyDecliningMoisture, matches: |z| z.ndwi < -0.1 },
    ZoneRule { status: ZoneStatus::HealthyDense, matches: |_| true },
];

impl ZoneInputs {
    pub fn classify(&self) -> ZoneStatus {
        RULES
            .iter()
            .find(|rule| (rule.matches)(self))
            .map(|rule| rule.status)
            .unwrap_or(ZoneStatus::HealthyDense)
    }
}

/// Classify a field from its index values.
///
/// `msi` must already be substituted with the default when missing.
pub fn classify_zone(
    ndvi: f64,
    evi: f64,
    ndwi: f64,
    msi: f64,
    green: f64,
    nir: f64,
    red: f64,
) -> ZoneStatus {
    ZoneInputs { ndvi, evi, ndwi, msi, green, nir, red }.classify()
}

/// Classify an [`IndexSet`], substituting the default MSI when missing
pub fn classify_indices(indices: &IndexSet) -> ZoneStatus {
    let status = classify_zone(
        indices.ndvi,
        indices.evi,
        indices.ndwi,
        indices.msi_or_default(),
        indices.green,
        indices.nir,
        indices.red,
    );
    tracing::debug!("Zone classified as {}", status);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropsight_core::models::Zone;
    use proptest::prelude::*;

    #[test]
    fn test_healthy_dense_canopy() {
        let status = classify_zone(0.6, 0.5, -0.05, 1.2, 0.15, 0.3, 0.1);
        assert_eq!(status.as_pair(), ("Vegetation", "Healthy and dense vegetation"));
    }

    #[test]
    fn test_bare_soil_wins_regardless_of_ndvi() {
        for ndvi in [-0.5, 0.0, 0.3, 0.7, 0.95] {
            let status = classify_zone(ndvi, 0.2, 0.0, 1.0, 0.05, 0.3, 0.05);
            assert_eq!(status, ZoneStatus::ExposedSoil);
            assert_eq!(status.zone(), Zone::BareSoil);
        }
    }

    #[test]
    fn test_sparse_rules_in_order() {
        assert_eq!(classify_zone(0.2, 0.5, 0.0, 1.6, 0.2, 0.3, 0.2), ZoneStatus::Sparse);
        assert_eq!(
            classify_zone(0.2, 0.5, -0.3, 1.0, 0.2, 0.3, 0.2),
            ZoneStatus::SparseMoistureDeficiency
        );
        assert_eq!(classify_zone(0.2, 0.5, 0.0, 1.0, 0.2, 0.3, 0.2), ZoneStatus::EarlyGrowth);
    }

    #[test]
    fn test_high_water_stress_rule_is_shadowed() {
        let status = classify_zone(0.1, 0.5, -0.5, 5.0, 0.2, 0.3, 0.2);
        assert_eq!(status, ZoneStatus::Sparse);
    }

    #[test]
    fn test_moderate_rules_in_order() {
        assert_eq!(
            classify_zone(0.45, 0.5, 0.0, 1.9, 0.2, 0.3, 0.2),
            ZoneStatus::ModerateSevereWaterStress
        );
        assert_eq!(
            classify_zone(0.45, 0.5, -0.25, 1.0, 0.2, 0.3, 0.2),
            ZoneStatus::ModerateMoistureStress
        );
        assert_eq!(
            classify_zone(0.45, 0.4, 0.0, 1.0, 0.2, 0.3, 0.2),
            ZoneStatus::ModerateSoilBackground
        );
        assert_eq!(classify_zone(0.45, 0.5, 0.0, 1.0, 0.2, 0.3, 0.2), ZoneStatus::ModerateStable);
    }

    #[test]
    fn test_dense_rules_in_order() {
        assert_eq!(
            classify_zone(0.7, 0.6, 0.0, 1.6, 0.2, 0.4, 0.1),
            ZoneStatus::DenseEmergingWaterStress
        );
        assert_eq!(
            classify_zone(0.7, 0.6, -0.15, 1.0, 0.2, 0.4, 0.1),
            ZoneStatus::HealthyDecliningMoisture
        );
    }

    #[test]
    fn test_missing_msi_uses_default() {
        let indices = IndexSet {
            ndvi: 0.7,
            savi: 0.5,
            evi: 0.6,
            ndwi: 0.0,
            msi: None,
            red: 0.1,
            green: 0.2,
            nir: 0.4,
        };
        assert_eq!(classify_indices(&indices), ZoneStatus::HealthyDense);
    }

    #[test]
    fn test_nan_inputs_fall_through() {
        let status = classify_zone(f64::NAN, f64::NAN, f64::NAN, f64::NAN, 0.2, 0.3, 0.2);
        assert_eq!(status, ZoneStatus::HealthyDense);
    }

    proptest! {
        #[test]
        fn prop_classification_is_total_and_deterministic(
            ndvi in -1.0f64..1.0,
            evi in -2.0f64..2.0,
            ndwi in -1.0f64..1.0,
            msi in 0.0f64..5.0,
            green in 0.0f64..1.0,
            nir in 0.0f64..1.0,
            red in 0.0f64..1.0,
        ) {
            let first = classify_zone(ndvi, evi, ndwi, msi, green, nir, red);
            let second = classify_zone(ndvi, evi, ndwi, msi, green, nir, red);
            prop_assert_eq!(first, second);
            prop_assert!(ZoneStatus::ALL.contains(&first));
            prop_assert_ne!(first, ZoneStatus::SparseHighWaterStress);
        }

        #[test]
        fn prop_bare_soil_conditions_always_win(
            ndvi in -1.0f64..1.0,
            evi in -2.0f64..0.4,
            ndwi in -1.0f64..1.0,
            msi in 0.0f64..5.0,
            green in 0.0f64..0.1,
            red in 0.0f64..0.1,
        ) {
            let status = classify_zone(ndvi, evi, ndwi, msi, green, 0.3, red);
            prop_assert_eq!(status.zone(), Zone::BareSoil);
        }
    }
}
