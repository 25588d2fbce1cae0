//! Reading field boundaries from GeoJSON

use cropsight_core::error::{CropsightError, Result};
use cropsight_core::models::RegionPolygon;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Load a field polygon from a GeoJSON file
pub fn load_polygon(path: &Path) -> Result<RegionPolygon> {
    let content = fs::read_to_string(path)?;
    parse_polygon(&content)
}

/// Parse a field polygon.
///
/// Accepts a Polygon geometry, a Feature, or a FeatureCollection (first
/// polygonal feature wins), as well as bare coordinate arrays in either
/// ring (`[[lon, lat], ...]`) or polygon (`[[[lon, lat], ...]]`) form.
/// Only the exterior ring is used.
pub fn parse_polygon(content: &str) -> Result<RegionPolygon> {
    if let Ok(rings) = serde_json::from_str::<Vec<Vec<[f64; 2]>>>(content) {
        let exterior = rings.into_iter().next().ok_or_else(|| CropsightError::InvalidPolygon {
            reason: "Coordinate array has no rings".to_string(),
        })?;
        return RegionPolygon::new(exterior);
    }

    if let Ok(ring) = serde_json::from_str::<Vec<[f64; 2]>>(content) {
        return RegionPolygon::new(ring);
    }

    let geojson: GeoJson = content.parse().map_err(|e| CropsightError::InvalidPolygon {
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    let geometry = match &geojson {
        GeoJson::Geometry(geom) => Some(geom),
        GeoJson::Feature(feature) => feature.geometry.as_ref(),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .find(|g| matches!(g.value, Value::Polygon(_) | Value::MultiPolygon(_))),
    };

    let geometry = geometry.ok_or_else(|| CropsightError::InvalidPolygon {
        reason: "GeoJSON contains no polygon geometry".to_string(),
    })?;

    polygon_from_geometry(geometry)
}

fn polygon_from_geometry(geometry: &Geometry) -> Result<RegionPolygon> {
    let exterior = match &geometry.value {
        Value::Polygon(rings) => rings.first(),
        Value::MultiPolygon(polygons) => {
            if polygons.len() > 1 {
                tracing::warn!(
                    "MultiPolygon has {} parts, using the first as the field boundary",
                    polygons.len()
                );
            }
            polygons.first().and_then(|rings| rings.first())
        }
        _ => {
            return Err(CropsightError::InvalidPolygon {
                reason: "Geometry is not a Polygon or MultiPolygon".to_string(),
            })
        }
    };

    let exterior = exterior.ok_or_else(|| CropsightError::InvalidPolygon {
        reason: "Polygon has no exterior ring".to_string(),
    })?;

    let vertices: Result<Vec<[f64; 2]>> = exterior
        .iter()
        .map(|position| match (position.first(), position.get(1)) {
            (Some(&x), Some(&y)) => Ok([x, y]),
            _ => Err(CropsightError::InvalidPolygon {
                reason: "Position has fewer than two coordinates".to_string(),
            }),
        })
        .collect();

    RegionPolygon::new(vertices?)
}
