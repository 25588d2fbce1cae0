//! Spectral index calculation over aligned bands
//!
//! Every index is evaluated per pixel and averaged over the pixels where the
//! result is finite. NaN pixels (outside the field or nodata) drop out
//! naturally.

use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{BandId, BandSources, IndexName, IndexSet, RegionPolygon};
use cropsight_core::ports::BandReader;
use cropsight_raster::{AlignedBands, BandAligner};
use ndarray::{Array2, Zip};

/// MSI is only defined where the canopy reflects enough NIR and SWIR
const MSI_MIN_NIR: f64 = 0.1;
const MSI_MIN_SWIR: f64 = 0.01;

/// Running mean over finite values
#[derive(Debug, Default, Clone, Copy)]
struct FiniteMean {
    sum: f64,
    count: usize,
}

impl FiniteMean {
    fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

pub fn ndvi(nir: f64, red: f64) -> f64 {
    (nir - red) / (nir + red + 1e-6)
}

pub fn savi(nir: f64, red: f64) -> f64 {
    1.5 * (nir - red) / (nir + red + 0.5)
}

pub fn evi(nir: f64, red: f64, blue: f64) -> f64 {
    2.5 * (nir - red) / (nir + 6.0 * red - 7.5 * blue + 1.0)
}

pub fn ndwi(green: f64, nir: f64) -> f64 {
    (green - nir) / (green + nir + 1e-6)
}

/// Moisture stress index, `None` where the pixel is too dark to be meaningful
pub fn msi(swir: f64, nir: f64) -> Option<f64> {
    (nir > MSI_MIN_NIR && swir > MSI_MIN_SWIR).then(|| swir / nir)
}

/// Reduces aligned band rasters to a field-level [`IndexSet`]
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexCalculator;

impl IndexCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, bands: &AlignedBands) -> Result<IndexSet> {
        self.calculate_arrays(
            &bands.blue.data,
            &bands.green.data,
            &bands.red.data,
            &bands.nir.data,
            &bands.swir.data,
        )
    }

    /// Compute indices from reflectance grids that share one shape
    pub fn calculate_arrays(
        &self,
        blue: &Array2<f32>,
        green: &Array2<f32>,
        red: &Array2<f32>,
        nir: &Array2<f32>,
        swir: &Array2<f32>,
    ) -> Result<IndexSet> {
        let expected = nir.dim();
        for grid in [blue, green, red, swir] {
            if grid.dim() != expected {
                return Err(CropsightError::ShapeMismatch { expected, found: grid.dim() });
            }
        }

        let mut acc = [FiniteMean::default(); 8];
        let slot = |name: IndexName| name as usize;

        Zip::from(blue).and(green).and(red).and(nir).and(swir).for_each(|&b, &g, &r, &n, &s| {
            let (b, g, r, n, s) = (b as f64, g as f64, r as f64, n as f64, s as f64);

            acc[slot(IndexName::Ndvi)].push(ndvi(n, r));
            acc[slot(IndexName::Savi)].push(savi(n, r));
            acc[slot(IndexName::Evi)].push(evi(n, r, b));
            acc[slot(IndexName::Ndwi)].push(ndwi(g, n));
            if let Some(value) = msi(s, n) {
                acc[slot(IndexName::Msi)].push(value);
            }
            acc[slot(IndexName::Red)].push(r);
            acc[slot(IndexName::Green)].push(g);
            acc[slot(IndexName::Nir)].push(n);
        });

        let required = |name: IndexName| {
            acc[slot(name)].mean().ok_or_else(|| CropsightError::EmptyClip {
                band: format!("{} (no valid pixels)", name),
            })
        };

        let indices = IndexSet {
            ndvi: required(IndexName::Ndvi)?,
            savi: required(IndexName::Savi)?,
            evi: required(IndexName::Evi)?,
            ndwi: required(IndexName::Ndwi)?,
            msi: acc[slot(IndexName::Msi)].mean(),
            red: required(IndexName::Red)?,
            green: required(IndexName::Green)?,
            nir: required(IndexName::Nir)?,
        };

        tracing::debug!(
            "Indices over {} valid pixels: NDVI={:.4} NDWI={:.4} MSI={:?}",
            acc[slot(IndexName::Ndvi)].count,
            indices.ndvi,
            indices.ndwi,
            indices.msi
        );

        Ok(indices)
    }
}

/// Align the five bands of a scene to the field and compute its index set
pub fn compute_indices(
    reader: &dyn BandReader,
    band_sources: &BandSources,
    polygon: &RegionPolygon,
) -> Result<IndexSet> {
    compute_indices_with_scale(
        reader,
        band_sources,
        polygon,
        cropsight_core::config::DEFAULT_REFLECTANCE_SCALE,
    )
}

/// [`compute_indices`] with a custom raw-to-reflectance divisor
pub fn compute_indices_with_scale(
    reader: &dyn BandReader,
    band_sources: &BandSources,
    polygon: &RegionPolygon,
    reflectance_scale: f64,
) -> Result<IndexSet> {
    tracing::info!(
        "Computing indices for {} band sources (reference {})",
        band_sources.len(),
        BandId::NearInfrared
    );

    let aligned = BandAligner::new(reader)
        .with_reflectance_scale(reflectance_scale)?
        .align(band_sources, polygon)?;

    IndexCalculator::new().calculate(&aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn grid(value: f32) -> Array2<f32> {
        Array2::from_elem((2, 2), value)
    }

    #[test]
    fn test_uniform_field_indices() {
        let set = IndexCalculator::new()
            .calculate_arrays(&grid(0.04), &grid(0.08), &grid(0.05), &grid(0.4), &grid(0.2))
            .unwrap();

        assert!((set.ndvi - 0.35 / 0.450001).abs() < 1e-6);
        assert!((set.savi - 1.5 * 0.35 / 0.95).abs() < 1e-6);
        assert!((set.evi - 2.5 * 0.35 / (0.4 + 0.3 - 0.3 + 1.0)).abs() < 1e-6);
        assert!((set.msi.unwrap() - 0.5).abs() < 1e-6);
        assert!((set.nir - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_nan_pixels_are_ignored() {
        let nir = array![[0.4, f32::NAN], [0.4, 0.4]];
        let red = array![[0.1, 0.1], [f32::NAN, 0.1]];

        let set = IndexCalculator::new()
            .calculate_arrays(&grid(0.05), &grid(0.1), &red, &nir, &grid(0.2))
            .unwrap();

        assert!((set.ndvi - 0.3 / 0.500001).abs() < 1e-6);
        assert!((set.red - 0.1).abs() < 1e-6);
        assert!((set.nir - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_msi_missing_when_no_pixel_qualifies() {
        // NIR too dark everywhere
        let set = IndexCalculator::new()
            .calculate_arrays(&grid(0.02), &grid(0.03), &grid(0.05), &grid(0.08), &grid(0.2))
            .unwrap();

        assert_eq!(set.msi, None);
        assert_eq!(set.entries().len(), 8);
        assert_eq!(set.entries().iter().filter(|(_, v)| v.is_none()).count(), 1);
    }

    #[test]
    fn test_msi_only_uses_qualifying_pixels() {
        let nir = array![[0.5, 0.05], [0.5, 0.5]];
        let swir = array![[0.25, 0.3], [0.005, 0.25]];

        let set = IndexCalculator::new()
            .calculate_arrays(&grid(0.05), &grid(0.1), &grid(0.1), &nir, &swir)
            .unwrap();

        assert!((set.msi.unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let result = IndexCalculator::new().calculate_arrays(
            &grid(0.1),
            &Array2::from_elem((3, 2), 0.1),
            &grid(0.1),
            &grid(0.3),
            &grid(0.2),
        );

        assert!(matches!(
            result,
            Err(CropsightError::ShapeMismatch { expected: (2, 2), found: (3, 2) })
        ));
    }

    #[test]
    fn test_all_invalid_pixels_fail() {
        let nan = grid(f32::NAN);
        let result = IndexCalculator::new().calculate_arrays(&nan, &nan, &nan, &nan, &nan);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_normalized_differences_are_bounded(
            nir in 0.0f64..=1.0,
            red in 0.0f64..=1.0,
            green in 0.0f64..=1.0,
        ) {
            let v = ndvi(nir, red);
            let w = ndwi(green, nir);
            prop_assert!((-1.0..=1.0).contains(&v));
            prop_assert!((-1.0..=1.0).contains(&w));
        }

        #[test]
        fn prop_field_means_are_bounded(
            pixels in prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0), 1..16)
        ) {
            let n = pixels.len();
            let nir = Array2::from_shape_fn((1, n), |(_, i)| pixels[i].0);
            let red = Array2::from_shape_fn((1, n), |(_, i)| pixels[i].1);
            let green = Array2::from_shape_fn((1, n), |(_, i)| pixels[i].2);
            let other = Array2::from_elem((1, n), 0.05f32);

            let set = IndexCalculator::new()
                .calculate_arrays(&other, &green, &red, &nir, &other)
                .unwrap();

            prop_assert!((-1.0..=1.0).contains(&set.ndvi));
            prop_assert!((-1.0..=1.0).contains(&set.ndwi));
        }
    }
}
