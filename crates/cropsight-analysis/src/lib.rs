//! CropSight Analysis - Spectral indices, zone classification, and crop health
//!
//! The stages here consume aligned band rasters and turn them into the
//! per-field assessment. [`FieldAnalyzer`] runs all of them in order.

pub mod health;
pub mod indices;
pub mod pipeline;
pub mod zone;

pub use health::{
    build_feature_vector, predict_crop_health, ClassifierArtifact, FeatureScaler,
    HealthClassifier, ModelContext, StandardScaler,
};
pub use indices::{compute_indices, IndexCalculator};
pub use pipeline::FieldAnalyzer;
pub use zone::{classify_indices, classify_zone};
