//! CRS transformation of field polygons and points

use crate::models::to_geo_polygon;
use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::{Crs, RegionPolygon};
use geo::{Coord, LineString, Polygon};
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Point transformer between two CRS; identity when they match
pub struct CrsTransformer {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl CrsTransformer {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        if crs_match(&from, &to) {
            return Ok(Self { from, to, proj: None });
        }

        // new_known_crs normalises axis order to (x/lon, y/lat)
        let proj = Proj::new_known_crs(&from.proj_id(), &to.proj_id(), None).map_err(|e| {
            CropsightError::Projection {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("Failed to create projection: {}", e),
            }
        })?;

        Ok(Self { from, to, proj: Some(proj) })
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    /// Transform one (x, y) coordinate
    pub fn convert(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match &self.proj {
            None => Ok((x, y)),
            Some(proj) => proj.convert((x, y)).map_err(|e| CropsightError::Projection {
                from: self.from.to_string(),
                to: self.to.to_string(),
                reason: format!("Projection failed for ({}, {}): {}", x, y, e),
            }),
        }
    }
}

/// Project a geographic field polygon into a band's native CRS
pub fn project_polygon(polygon: &RegionPolygon, to_crs: &Crs) -> Result<Polygon<f64>> {
    let transformer = CrsTransformer::new(Crs::wgs84(), *to_crs)?;

    if transformer.is_identity() {
        return Ok(to_geo_polygon(polygon));
    }

    let coords: Result<Vec<Coord<f64>>> = polygon
        .closed_ring()
        .iter()
        .map(|v| transformer.convert(v[0], v[1]).map(|(x, y)| Coord { x, y }))
        .collect();

    let projected = Polygon::new(LineString::new(coords?), vec![]);
    tracing::debug!(
        "Projected field polygon ({} vertices) into {}",
        polygon.vertices().len(),
        to_crs
    );

    Ok(projected)
}
