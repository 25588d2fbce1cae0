//! Bilinear resampling of a clipped band onto a reference grid

use crate::clip::ClippedBand;
use cropsight_core::error::Result;
use cropsight_core::models::{Crs, GeoTransform};
use cropsight_geo::CrsTransformer;
use ndarray::Array2;

/// Resample `src` onto the grid described by `dst_transform`, `dst_crs` and
/// `dst_shape` (rows, cols).
///
/// Each destination pixel centre is located in the source grid (through a CRS
/// transformation when the grids differ). The four surrounding source pixels
/// are weighted bilinearly; neighbours that are NaN or outside the source grid
/// are dropped and the remaining weights renormalised. A destination pixel
/// with no usable neighbour is NaN.
pub fn resample_bilinear(
    src: &ClippedBand,
    dst_transform: &GeoTransform,
    dst_crs: &Crs,
    dst_shape: (usize, usize),
) -> Result<Array2<f32>> {
    if src.crs == *dst_crs && src.transform == *dst_transform && src.shape() == dst_shape {
        return Ok(src.data.clone());
    }

    let transformer = CrsTransformer::new(*dst_crs, src.crs)?;
    let (rows, cols) = dst_shape;
    let mut out = Array2::from_elem(dst_shape, f32::NAN);

    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = dst_transform.pixel_center(col, row);
            let (sx, sy) = transformer.convert(x, y)?;
            let (fc, fr) = src.transform.inverse(sx, sy);
            out[[row, col]] = sample(&src.data, fc, fr);
        }
    }

    tracing::debug!(
        "Resampled {:?} grid in {} onto {:?} grid in {}",
        src.shape(),
        src.crs,
        dst_shape,
        dst_crs
    );

    Ok(out)
}

/// Bilinear sample at fractional pixel position (fc, fr), where (0, 0) is the
/// top-left corner of the grid
fn sample(data: &Array2<f32>, fc: f64, fr: f64) -> f32 {
    let (rows, cols) = data.dim();

    // Continuous coordinates relative to pixel centres
    let u = fc - 0.5;
    let v = fr - 0.5;

    if !u.is_finite()
        || !v.is_finite()
        || u < -0.5
        || v < -0.5
        || u > cols as f64 - 0.5
        || v > rows as f64 - 0.5
    {
        return f32::NAN;
    }

    let c0 = u.floor();
    let r0 = v.floor();
    let du = u - c0;
    let dv = v - r0;

    let neighbours = [
        (r0, c0, (1.0 - du) * (1.0 - dv)),
        (r0, c0 + 1.0, du * (1.0 - dv)),
        (r0 + 1.0, c0, (1.0 - du) * dv),
        (r0 + 1.0, c0 + 1.0, du * dv),
    ];

    let mut weighted = 0.0f64;
    let mut total = 0.0f64;

    for (r, c, w) in neighbours {
        if w <= 0.0 || r < 0.0 || c < 0.0 || r >= rows as f64 || c >= cols as f64 {
            continue;
        }
        let value = data[[r as usize, c as usize]];
        if value.is_finite() {
            weighted += w * value as f64;
            total += w;
        }
    }

    if total > 1e-12 {
        (weighted / total) as f32
    } else {
        f32::NAN
    }
}
