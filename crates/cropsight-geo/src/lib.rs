//! CropSight Geo - Field polygons, CRS transformations, and GeoJSON input
//!
//! This crate turns user-supplied boundaries into `geo` polygons and
//! projects them into each band's native coordinate system.

pub mod geojson_input;
pub mod models;
pub mod transform;

pub use geojson_input::{load_polygon, parse_polygon};
pub use models::{bounding_box, to_geo_polygon, BoundingBox};
pub use transform::{crs_match, project_polygon, CrsTransformer};
