//! Mask-and-crop of a band to a polygon in the band's own CRS

use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{BandId, Crs, GeoTransform, PixelWindow};
use cropsight_core::ports::BandDataset;
use cropsight_geo::bounding_box;
use geo::{Contains, Intersects, LineString, Point, Polygon};
use ndarray::Array2;

/// A band cropped to the polygon's pixel window; masked pixels are NaN
#[derive(Debug, Clone)]
pub struct ClippedBand {
    pub data: Array2<f32>,
    pub transform: GeoTransform,
    pub crs: Crs,
}

impl ClippedBand {
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }
}

/// Which pixels of the window stay valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMask {
    /// Pixel centre inside the polygon; fixes the reference grid
    PixelCentre,
    /// Pixel footprint intersects the polygon; keeps coarse bands that are
    /// only resampled from
    AllTouched,
}

impl ClipMask {
    fn keeps(
        self,
        transform: &GeoTransform,
        col: usize,
        row: usize,
        polygon: &Polygon<f64>,
    ) -> bool {
        let (x, y) = transform.pixel_center(col, row);
        if polygon.contains(&Point::new(x, y)) {
            return true;
        }
        match self {
            ClipMask::PixelCentre => false,
            ClipMask::AllTouched => pixel_footprint(transform, col, row).intersects(polygon),
        }
    }
}

fn pixel_footprint(transform: &GeoTransform, col: usize, row: usize) -> Polygon<f64> {
    let (c, r) = (col as f64, row as f64);
    let corners = [(c, r), (c + 1.0, r), (c + 1.0, r + 1.0), (c, r + 1.0), (c, r)];
    let ring: Vec<(f64, f64)> = corners.iter().map(|&(c, r)| transform.apply(c, r)).collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Clip a dataset to a polygon already projected into the dataset's CRS.
///
/// The window is the polygon's bounding box snapped outward to whole pixels
/// and intersected with the raster extent. Pixels rejected by `mask`, or
/// whose value equals the nodata value, become NaN.
pub fn clip_to_polygon(
    dataset: &mut dyn BandDataset,
    band: BandId,
    polygon: &Polygon<f64>,
    mask: ClipMask,
) -> Result<ClippedBand> {
    let transform = dataset.transform();
    let crs = dataset.crs();
    let (rows, cols) = dataset.dimensions();

    let window = polygon_window(&transform, rows, cols, polygon)
        .ok_or_else(|| CropsightError::EmptyClip { band: band.to_string() })?;

    tracing::debug!("Clipping {} to window {:?} of {}x{} raster", band, window, cols, rows);

    let mut data = dataset.read_window(&window)?;
    let window_transform = transform.shifted(window.col_off, window.row_off);
    let nodata = dataset.nodata();

    for ((row, col), value) in data.indexed_iter_mut() {
        let is_nodata = match nodata {
            Some(nd) if nd.is_nan() => value.is_nan(),
            Some(nd) => (*value as f64) == nd || *value == nd as f32,
            None => false,
        };
        if is_nodata || !mask.keeps(&window_transform, col, row, polygon) {
            *value = f32::NAN;
        }
    }

    let clipped = ClippedBand { data, transform: window_transform, crs };
    if clipped.valid_count() == 0 {
        return Err(CropsightError::EmptyClip { band: band.to_string() });
    }

    Ok(clipped)
}

/// Pixel window covering the polygon's extent, or None if it misses the raster
fn polygon_window(
    transform: &GeoTransform,
    rows: usize,
    cols: usize,
    polygon: &Polygon<f64>,
) -> Option<PixelWindow> {
    let bbox = bounding_box(polygon)?;

    // All four corners so rotated grids are covered
    let corners = [
        transform.inverse(bbox.min_x, bbox.min_y),
        transform.inverse(bbox.min_x, bbox.max_y),
        transform.inverse(bbox.max_x, bbox.min_y),
        transform.inverse(bbox.max_x, bbox.max_y),
    ];

    if corners.iter().any(|(c, r)| !c.is_finite() || !r.is_finite()) {
        return None;
    }

    let min_col = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor();
    let max_col = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil();
    let min_row = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor();
    let max_row = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil();

    let col_start = min_col.max(0.0);
    let col_end = max_col.min(cols as f64);
    let row_start = min_row.max(0.0);
    let row_end = max_row.min(rows as f64);

    if col_end <= col_start || row_end <= row_start {
        return None;
    }

    let window = PixelWindow::new(
        col_start as usize,
        row_start as usize,
        (col_end - col_start) as usize,
        (row_end - row_start) as usize,
    );

    (!window.is_empty()).then_some(window)
}
