//! Port trait definitions
//!
//! Raster adapters implement these to hand band data to the aligner.

use crate::error::Result;
use crate::models::{BandId, BandSource, Crs, GeoTransform, PixelWindow};
use ndarray::Array2;

/// An opened single-band raster
pub trait BandDataset {
    /// Native coordinate reference system
    fn crs(&self) -> Crs;

    /// Affine transform of the full raster
    fn transform(&self) -> GeoTransform;

    /// (rows, cols) of the full raster
    fn dimensions(&self) -> (usize, usize);

    /// Raw value marking missing data, if declared
    fn nodata(&self) -> Option<f64>;

    /// Read raw (unscaled) values of a window that lies inside the raster
    fn read_window(&mut self, window: &PixelWindow) -> Result<Array2<f32>>;
}

/// Port for opening band sources
pub trait BandReader: Send + Sync {
    fn open(&self, band: BandId, source: &BandSource) -> Result<Box<dyn BandDataset>>;
}
