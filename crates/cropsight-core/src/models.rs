pub mod assessment;
pub mod band;
pub mod health;
pub mod indices;
pub mod polygon;
pub mod raster;
pub mod zone;

pub use assessment::{FieldAssessment, FieldRequest};
pub use band::{BandId, BandSource, BandSources};
pub use health::{
    CropType, EstimatedInputs, FeatureVector, FieldData, HealthLabel, HealthPrediction,
    ResolvedFieldData, FEATURE_COUNT, FEATURE_NAMES,
};
pub use indices::{IndexName, IndexSet, DEFAULT_MSI};
pub use polygon::RegionPolygon;
pub use raster::{AlignedRaster, Crs, GeoTransform, PixelWindow};
pub use zone::{Zone, ZoneStatus};
