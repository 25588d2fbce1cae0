use crate::health::{predict_crop_health, ModelContext};
use crate::indices::compute_indices_with_scale;
use crate::zone::classify_indices;
use cropsight_core::config::{parse_reflectance_scale, DEFAULT_REFLECTANCE_SCALE};
use cropsight_core::error::Result;
use cropsight_core::models::{FieldAssessment, FieldRequest, IndexSet, ZoneStatus};
use cropsight_core::ports::BandReader;
use std::sync::Arc;

/// Field analysis pipeline: alignment, indices, zone, and crop health
pub struct FieldAnalyzer {
    reader: Arc<dyn BandReader>,
    models: Arc<ModelContext>,
    reflectance_scale: f64,
}

impl FieldAnalyzer {
    /// Create a new analyzer
    pub fn new(reader: Arc<dyn BandReader>, models: Arc<ModelContext>) -> Self {
        Self { reader, models, reflectance_scale: DEFAULT_REFLECTANCE_SCALE }
    }

    pub fn with_reflectance_scale(mut self, scale: f64) -> Result<Self> {
        self.reflectance_scale = parse_reflectance_scale(scale)?;
        Ok(self)
    }

    pub fn models(&self) -> &ModelContext {
        &self.models
    }

    /// Run the whole pipeline for one field
    pub fn analyze(&self, request: &FieldRequest) -> Result<FieldAssessment> {
        // Stage 1-2: alignment and index calculation
        let indices = self.indices(request)?;

        // Stage 3: zone rules
        let status = self.classify(&indices);

        // Stage 4: crop health
        let health = predict_crop_health(
            &self.models,
            &indices,
            request.crop_type.as_deref(),
            request.field_data.as_ref(),
        );

        tracing::info!(
            "Field assessment: {} / {} / {}",
            status.zone(),
            status.description(),
            health.prediction
        );

        Ok(FieldAssessment::new(&indices, status, health))
    }

    /// Index set only, without zone or health
    pub fn indices(&self, request: &FieldRequest) -> Result<IndexSet> {
        compute_indices_with_scale(
            self.reader.as_ref(),
            &request.bands,
            &request.polygon,
            self.reflectance_scale,
        )
    }

    fn classify(&self, indices: &IndexSet) -> ZoneStatus {
        if indices.msi.is_none() {
            tracing::warn!("MSI undefined for this field, classifying with the default");
        }
        classify_indices(indices)
    }
}
