//! CropSight Raster - Band reading, clipping, resampling, and alignment
//!
//! Every band of a request is clipped to the field polygon in its own CRS and
//! then resampled onto the near-infrared band's grid.

pub mod align;
pub mod clip;
pub mod geotiff;
pub mod memory;
pub mod resample;

pub use align::{AlignedBands, BandAligner};
pub use clip::{clip_to_polygon, ClipMask, ClippedBand};
pub use geotiff::{GeoTiffDataset, GeoTiffReader};
pub use memory::{MemoryBandReader, MemoryRaster};
pub use resample::resample_bilinear;
