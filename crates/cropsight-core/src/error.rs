//! Error types for CropSight

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CropsightError {
    // Input errors
    #[error("Invalid field polygon: {reason}")]
    InvalidPolygon { reason: String },

    #[error("Missing band source for {band}")]
    MissingBand { band: String },

    #[error("Band {band} has no pixels inside the field polygon")]
    EmptyClip { band: String },

    #[error("Raster shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    // Data-unavailable errors
    #[error("Band {band} could not be read from {source_handle}: {reason}")]
    BandUnavailable {
        band: String,
        source_handle: String,
        reason: String,
    },

    #[error("Unsupported raster in {source_handle}: {reason}")]
    RasterFormat { source_handle: String, reason: String },

    #[error("Projection from {from} to {to} failed: {reason}")]
    Projection { from: String, to: String, reason: String },

    // Model errors
    #[error("Model artifact {path} could not be loaded: {reason}")]
    ModelArtifact { path: PathBuf, reason: String },

    #[error("Feature schema mismatch in {artifact}: {reason}")]
    FeatureSchemaMismatch { artifact: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CropsightError>;
