//! In-memory band reader for development and testing.
//!
//! Rasters are registered under a handle string and served as if they had
//! been opened from disk.

use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{BandId, BandSource, Crs, GeoTransform, PixelWindow};
use cropsight_core::ports::{BandDataset, BandReader};
use ndarray::{s, Array2};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A raw single-band raster held in memory
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    pub data: Array2<f32>,
    pub transform: GeoTransform,
    pub crs: Crs,
    pub nodata: Option<f64>,
}

impl MemoryRaster {
    pub fn new(data: Array2<f32>, transform: GeoTransform, crs: Crs) -> Self {
        Self { data, transform, crs, nodata: None }
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }
}

/// In-memory implementation of BandReader
#[derive(Debug, Clone, Default)]
pub struct MemoryBandReader {
    rasters: HashMap<String, MemoryRaster>,
    opened: Arc<RwLock<Vec<BandId>>>,
}

impl MemoryBandReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raster under a source handle
    pub fn with_raster(mut self, handle: impl Into<String>, raster: MemoryRaster) -> Self {
        self.rasters.insert(handle.into(), raster);
        self
    }

    /// Bands opened so far, in order
    pub fn opened(&self) -> Vec<BandId> {
        self.opened.read().map(|log| log.clone()).unwrap_or_default()
    }
}

impl BandReader for MemoryBandReader {
    fn open(&self, band: BandId, source: &BandSource) -> Result<Box<dyn BandDataset>> {
        let raster = self.rasters.get(source.as_str()).cloned().ok_or_else(|| {
            CropsightError::BandUnavailable {
                band: band.to_string(),
                source_handle: source.to_string(),
                reason: "No raster registered for this handle".to_string(),
            }
        })?;

        if let Ok(mut log) = self.opened.write() {
            log.push(band);
        }

        Ok(Box::new(MemoryDataset { raster, band, handle: source.to_string() }))
    }
}

struct MemoryDataset {
    raster: MemoryRaster,
    band: BandId,
    handle: String,
}

impl BandDataset for MemoryDataset {
    fn crs(&self) -> Crs {
        self.raster.crs
    }

    fn transform(&self) -> GeoTransform {
        self.raster.transform
    }

    fn dimensions(&self) -> (usize, usize) {
        self.raster.data.dim()
    }

    fn nodata(&self) -> Option<f64> {
        self.raster.nodata
    }

    fn read_window(&mut self, window: &PixelWindow) -> Result<Array2<f32>> {
        let (rows, cols) = self.raster.data.dim();
        if window.col_off + window.width > cols || window.row_off + window.height > rows {
            return Err(CropsightError::BandUnavailable {
                band: self.band.to_string(),
                source_handle: self.handle.clone(),
                reason: format!("Window {:?} exceeds raster bounds", window),
            });
        }

        Ok(self
            .raster
            .data
            .slice(s![
                window.row_off..window.row_off + window.height,
                window.col_off..window.col_off + window.width
            ])
            .to_owned())
    }
}
