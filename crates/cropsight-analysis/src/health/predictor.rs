//! Crop health prediction against a shared, immutable model context

use super::artifacts::{ClassifierArtifact, StandardScaler};
use super::features::build_feature_vector;
use cropsight_core::config::LayeredConfig;
use cropsight_core::error::Result;
use cropsight_core::models::indices::round_to;
use cropsight_core::models::{
    CropType, EstimatedInputs, FieldData, HealthLabel, HealthPrediction, IndexSet, FEATURE_COUNT,
    FEATURE_NAMES,
};
use serde::Serialize;
use std::path::Path;

/// Maps raw features into the space the classifier was trained in
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT];

    /// Reject parameters that `transform` cannot apply to a full feature row
    fn check_schema(&self) -> Result<()> {
        Ok(())
    }
}

/// Binary classifier over scaled features
pub trait HealthClassifier: Send + Sync {
    /// `[unhealthy, healthy]` probabilities
    fn predict_proba(&self, scaled: &[f64; FEATURE_COUNT]) -> [f64; 2];

    /// Reject parameters that `predict_proba` cannot evaluate
    fn check_schema(&self) -> Result<()> {
        Ok(())
    }

    /// Short human-readable description
    fn describe(&self) -> String {
        "health classifier".to_string()
    }
}

/// Loaded model artifacts, built once and shared read-only
pub struct ModelContext {
    scaler: Box<dyn FeatureScaler>,
    classifier: Box<dyn HealthClassifier>,
}

/// What `ModelContext` is running, for display
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub classifier: String,
    pub feature_names: Vec<&'static str>,
}

impl ModelContext {
    /// Build a context, checking both parts against the feature schema so
    /// that prediction cannot fail later
    pub fn new(
        scaler: impl FeatureScaler + 'static,
        classifier: impl HealthClassifier + 'static,
    ) -> Result<Self> {
        scaler.check_schema()?;
        classifier.check_schema()?;
        Ok(Self { scaler: Box::new(scaler), classifier: Box::new(classifier) })
    }

    /// Load and validate both JSON artifacts
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self> {
        let scaler = StandardScaler::load(scaler_path)?;
        let classifier = ClassifierArtifact::load(model_path)?;
        Self::new(scaler, classifier)
    }

    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Self::load(&config.model_path.value, &config.scaler_path.value)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            classifier: self.classifier.describe(),
            feature_names: FEATURE_NAMES.to_vec(),
        }
    }
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext").field("classifier", &self.classifier.describe()).finish()
    }
}

/// Predict the health of a field.
///
/// Missing field measurements fall back to defaults and a missing MSI to
/// 1.0, so this never fails once the context has been loaded.
pub fn predict_crop_health(
    context: &ModelContext,
    index_set: &IndexSet,
    crop_type: Option<&str>,
    field_data: Option<&FieldData>,
) -> HealthPrediction {
    let crop = CropType::resolve(crop_type);
    if let CropType::Unrecognized(name) = &crop {
        tracing::warn!("Unrecognized crop type '{}', encoding as no known crop", name);
    }
    let field = field_data.cloned().unwrap_or_default().resolve();

    let features = build_feature_vector(index_set, &crop, &field);
    let scaled = context.scaler.transform(&features.to_array());
    let [unhealthy, healthy] = context.classifier.predict_proba(&scaled);

    // Ties go to the first class
    let class = if healthy > unhealthy { 1 } else { 0 };
    let prediction = HealthLabel::from_class(class);

    tracing::info!(
        "Crop health for {}: {} (healthy {:.3}, unhealthy {:.3})",
        crop,
        prediction,
        healthy,
        unhealthy
    );

    HealthPrediction {
        prediction,
        confidence: round_to(healthy.max(unhealthy), 3),
        healthy_prob: round_to(healthy, 3),
        unhealthy_prob: round_to(unhealthy, 3),
        estimated_inputs: EstimatedInputs {
            savi: round_to(features.savi, 4),
            chlorophyll_content: round_to(features.chlorophyll_content, 4),
            leaf_area_index: round_to(features.leaf_area_index, 4),
            crop_stress_indicator: features.crop_stress_indicator as u32,
            vpd: round_to(features.vapor_pressure_deficit, 4),
        },
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::artifacts::tests::{identity_scaler, ndvi_stump};
    use crate::health::artifacts::ClassifierModel;
    use cropsight_core::error::CropsightError;
    use std::sync::{Arc, Mutex};

    /// Records the scaled rows it sees and answers with fixed probabilities
    struct RecordingClassifier {
        proba: [f64; 2],
        seen: Arc<Mutex<Vec<[f64; FEATURE_COUNT]>>>,
    }

    impl HealthClassifier for RecordingClassifier {
        fn predict_proba(&self, scaled: &[f64; FEATURE_COUNT]) -> [f64; 2] {
            self.seen.lock().unwrap().push(*scaled);
            self.proba
        }
    }

    fn recording(proba: [f64; 2]) -> (ModelContext, Arc<Mutex<Vec<[f64; FEATURE_COUNT]>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let classifier = RecordingClassifier { proba, seen: Arc::clone(&seen) };
        (ModelContext::new(identity_scaler(), classifier).unwrap(), seen)
    }

    fn indices(ndvi: f64) -> IndexSet {
        IndexSet {
            ndvi,
            savi: 0.45,
            evi: 0.5,
            ndwi: -0.05,
            msi: Some(1.2),
            red: 0.1,
            green: 0.15,
            nir: 0.3,
        }
    }

    #[test]
    fn test_rice_with_empty_field_data() {
        let (context, seen) = recording([0.3, 0.7]);
        let prediction =
            predict_crop_health(&context, &indices(0.6), Some("Rice"), Some(&FieldData::default()));

        let row = seen.lock().unwrap()[0];
        assert_eq!(row[4], 28.0);
        assert_eq!(&row[11..], &[0.0, 1.0, 0.0]);
        assert_eq!(prediction.features.crop_rice, 1.0);
        assert_eq!(prediction.prediction, HealthLabel::Healthy);
    }

    #[test]
    fn test_absent_crop_is_wheat_and_unknown_crop_is_all_zero() {
        let (context, seen) = recording([0.5, 0.5]);
        predict_crop_health(&context, &indices(0.6), None, None);
        predict_crop_health(&context, &indices(0.6), Some("sorghum"), None);

        let rows = seen.lock().unwrap();
        assert_eq!(&rows[0][11..], &[0.0, 0.0, 1.0]);
        assert_eq!(&rows[1][11..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_supplied_field_data_replaces_defaults() {
        let (context, seen) = recording([0.5, 0.5]);
        let field = FieldData {
            temperature: Some(18.0),
            humidity: Some(80.0),
            soil_moisture: Some(0.2),
            soil_ph: Some(5.8),
            rainfall: Some(12.0),
        };
        predict_crop_health(&context, &indices(0.6), Some("maize"), Some(&field));

        let row = seen.lock().unwrap()[0];
        assert_eq!(row[4], 18.0);
        assert_eq!(row[5], 80.0);
        assert_eq!(row[7], 0.2);
        assert_eq!(row[8], 5.8);
        assert_eq!(row[9], 12.0);
        assert_eq!(&row[11..], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_probabilities_and_confidence_are_rounded() {
        let (context, _) = recording([0.1234, 0.8766]);
        let prediction = predict_crop_health(&context, &indices(0.6), None, None);

        assert_eq!(prediction.confidence, 0.877);
        assert_eq!(prediction.healthy_prob, 0.877);
        assert_eq!(prediction.unhealthy_prob, 0.123);
        assert_eq!(prediction.estimated_inputs.savi, 0.45);
        assert_eq!(prediction.estimated_inputs.leaf_area_index, 3.3);
    }

    #[test]
    fn test_tie_is_unhealthy() {
        let (context, _) = recording([0.5, 0.5]);
        let prediction = predict_crop_health(&context, &indices(0.6), None, None);
        assert_eq!(prediction.prediction, HealthLabel::Unhealthy);
        assert_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn test_stump_model_end_to_end() {
        let context = Arc::new(ModelContext::new(identity_scaler(), ndvi_stump()).unwrap());

        let healthy = predict_crop_health(&context, &indices(0.7), None, None);
        assert_eq!(healthy.prediction, HealthLabel::Healthy);
        assert_eq!(healthy.confidence, 0.8);

        let unhealthy = predict_crop_health(&context, &indices(0.2), None, None);
        assert_eq!(unhealthy.prediction, HealthLabel::Unhealthy);
        assert_eq!(unhealthy.unhealthy_prob, 0.9);
        assert_eq!(context.summary().classifier, "random forest (1 trees)");
    }

    #[test]
    fn test_context_is_shareable_across_threads() {
        let context = Arc::new(ModelContext::new(identity_scaler(), ndvi_stump()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let context = Arc::clone(&context);
                std::thread::spawn(move || {
                    predict_crop_health(&context, &indices(0.1 * i as f64 + 0.3), None, None)
                        .prediction
                })
            })
            .collect();

        let labels: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(labels[0], HealthLabel::Unhealthy);
        assert_eq!(labels[3], HealthLabel::Healthy);
    }

    #[test]
    fn test_short_scaler_is_rejected_when_building_context() {
        let mut scaler = identity_scaler();
        scaler.scale.truncate(FEATURE_COUNT - 1);

        let result = ModelContext::new(scaler, ndvi_stump());
        assert!(matches!(result, Err(CropsightError::FeatureSchemaMismatch { .. })));
    }

    #[test]
    fn test_broken_tree_is_rejected_when_building_context() {
        let mut classifier = ndvi_stump();
        if let ClassifierModel::RandomForest { trees } = &mut classifier.model {
            trees[0].children_right[0] = 7;
            trees[0].feature[0] = 20;
        }

        let result = ModelContext::new(identity_scaler(), classifier);
        assert!(matches!(result, Err(CropsightError::FeatureSchemaMismatch { .. })));
    }
}
