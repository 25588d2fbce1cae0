//! Conversions between [`RegionPolygon`] and the `geo` crate.

use cropsight_core::models::RegionPolygon;
use geo::{BoundingRect, Coord, LineString, Polygon};

/// Axis-aligned extent in CRS units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Convert a field polygon to a `geo` polygon without transforming coordinates
pub fn to_geo_polygon(polygon: &RegionPolygon) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> =
        polygon.closed_ring().iter().map(|v| Coord { x: v[0], y: v[1] }).collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Extent of a polygon's exterior ring
pub fn bounding_box(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    polygon.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}
