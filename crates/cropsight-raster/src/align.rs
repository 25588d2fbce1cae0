//! Band alignment onto the near-infrared reference grid

use crate::clip::{clip_to_polygon, ClipMask, ClippedBand};
use crate::resample::resample_bilinear;
use cropsight_core::config::{parse_reflectance_scale, DEFAULT_REFLECTANCE_SCALE};
use cropsight_core::error::Result;
use cropsight_core::models::{
    AlignedRaster, BandId, BandSources, Crs, GeoTransform, RegionPolygon,
};
use cropsight_core::ports::BandReader;
use cropsight_geo::project_polygon;
use ndarray::Array2;

/// The five bands of one request, all on the same grid
#[derive(Debug, Clone)]
pub struct AlignedBands {
    pub nir: AlignedRaster,
    pub blue: AlignedRaster,
    pub green: AlignedRaster,
    pub red: AlignedRaster,
    pub swir: AlignedRaster,
}

impl AlignedBands {
    pub fn get(&self, band: BandId) -> &AlignedRaster {
        match band {
            BandId::NearInfrared => &self.nir,
            BandId::Blue => &self.blue,
            BandId::Green => &self.green,
            BandId::Red => &self.red,
            BandId::ShortWaveInfrared => &self.swir,
        }
    }

    /// Reference grid shape (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.nir.shape()
    }
}

/// Loads, clips and resamples bands through a [`BandReader`]
pub struct BandAligner<'a> {
    reader: &'a dyn BandReader,
    reflectance_scale: f64,
}

impl<'a> BandAligner<'a> {
    pub fn new(reader: &'a dyn BandReader) -> Self {
        Self { reader, reflectance_scale: DEFAULT_REFLECTANCE_SCALE }
    }

    /// Override the divisor turning raw values into reflectance
    pub fn with_reflectance_scale(mut self, scale: f64) -> Result<Self> {
        self.reflectance_scale = parse_reflectance_scale(scale)?;
        Ok(self)
    }

    /// Align all five bands to the near-infrared grid clipped to `polygon`
    pub fn align(&self, sources: &BandSources, polygon: &RegionPolygon) -> Result<AlignedBands> {
        sources.ensure_complete()?;

        let reference =
            self.clip_band(BandId::NearInfrared, sources, polygon, ClipMask::PixelCentre)?;
        let shape = reference.shape();
        let transform = reference.transform;
        let crs = reference.crs;
        tracing::info!(
            "Reference grid from {}: {}x{} pixels in {}",
            BandId::NearInfrared,
            shape.1,
            shape.0,
            crs
        );

        let align_band = |band: BandId| -> Result<AlignedRaster> {
            let clipped = self.clip_band(band, sources, polygon, ClipMask::AllTouched)?;
            let data = resample_bilinear(&clipped, &transform, &crs, shape)?;
            tracing::debug!(
                "Aligned {} ({} valid of {} pixels)",
                band,
                data.iter().filter(|v| v.is_finite()).count(),
                data.len()
            );
            Ok(self.to_reflectance(data, transform, crs))
        };

        Ok(AlignedBands {
            blue: align_band(BandId::Blue)?,
            green: align_band(BandId::Green)?,
            red: align_band(BandId::Red)?,
            swir: align_band(BandId::ShortWaveInfrared)?,
            nir: self.to_reflectance(reference.data, transform, crs),
        })
    }

    fn clip_band(
        &self,
        band: BandId,
        sources: &BandSources,
        polygon: &RegionPolygon,
        mask: ClipMask,
    ) -> Result<ClippedBand> {
        let source = sources.get(band)?;
        let mut dataset = self.reader.open(band, source)?;
        let projected = project_polygon(polygon, &dataset.crs())?;
        clip_to_polygon(dataset.as_mut(), band, &projected, mask)
    }

    fn to_reflectance(
        &self,
        mut data: Array2<f32>,
        transform: GeoTransform,
        crs: Crs,
    ) -> AlignedRaster {
        let scale = self.reflectance_scale as f32;
        data.mapv_inplace(|v| v / scale);
        AlignedRaster::new(data, transform, crs)
    }
}
