//! Crop health inference from index values and field measurements

pub mod artifacts;
pub mod features;
pub mod predictor;

pub use artifacts::{ClassifierArtifact, ClassifierModel, DecisionTree, StandardScaler};
pub use features::{build_feature_vector, crop_stress_indicator, vapor_pressure_deficit};
pub use predictor::{
    predict_crop_health, FeatureScaler, HealthClassifier, ModelContext, ModelSummary,
};
