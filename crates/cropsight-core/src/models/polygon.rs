//! Field boundary in geographic coordinates.

use crate::error::{CropsightError, Result};
use serde::{Deserialize, Serialize};

/// Field boundary as (longitude, latitude) vertices in EPSG:4326.
///
/// The ring is stored open: a closing vertex equal to the first one is
/// dropped on construction and re-added by consumers that need a closed ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct RegionPolygon {
    vertices: Vec<[f64; 2]>,
}

impl RegionPolygon {
    /// Build a polygon, rejecting non-finite coordinates and rings with fewer
    /// than three distinct vertices
    pub fn new(mut vertices: Vec<[f64; 2]>) -> Result<Self> {
        if let Some((i, v)) =
            vertices.iter().enumerate().find(|(_, v)| !v[0].is_finite() || !v[1].is_finite())
        {
            return Err(CropsightError::InvalidPolygon {
                reason: format!("Vertex {} has non-finite coordinates ({}, {})", i, v[0], v[1]),
            });
        }

        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        let mut distinct: Vec<[f64; 2]> = Vec::with_capacity(vertices.len());
        for v in &vertices {
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }

        if distinct.len() < 3 {
            return Err(CropsightError::InvalidPolygon {
                reason: format!(
                    "Polygon needs at least 3 distinct vertices, found {}",
                    distinct.len()
                ),
            });
        }

        Ok(Self { vertices })
    }

    /// Vertices without the closing point
    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// Vertices with the first point repeated at the end
    pub fn closed_ring(&self) -> Vec<[f64; 2]> {
        let mut ring = self.vertices.clone();
        ring.push(self.vertices[0]);
        ring
    }
}

impl TryFrom<Vec<[f64; 2]>> for RegionPolygon {
    type Error = CropsightError;

    fn try_from(vertices: Vec<[f64; 2]>) -> Result<Self> {
        Self::new(vertices)
    }
}

impl From<RegionPolygon> for Vec<[f64; 2]> {
    fn from(polygon: RegionPolygon) -> Self {
        polygon.closed_ring()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_vertex_is_dropped() {
        let polygon =
            RegionPolygon::new(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap();
        assert_eq!(polygon.vertices().len(), 3);
        assert_eq!(polygon.closed_ring().len(), 4);
    }

    #[test]
    fn test_rejects_degenerate_rings() {
        assert!(RegionPolygon::new(vec![[0.0, 0.0], [1.0, 1.0]]).is_err());
        assert!(RegionPolygon::new(vec![[0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.0, 0.0]]).is_err());
        assert!(RegionPolygon::new(vec![]).is_err());
    }

    #[test]
    fn test_rejects_non_finite_vertices() {
        let result = RegionPolygon::new(vec![[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0]]);
        assert!(matches!(result, Err(CropsightError::InvalidPolygon { .. })));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: std::result::Result<RegionPolygon, _> =
            serde_json::from_str("[[0,0],[2,0],[2,2],[0,2],[0,0]]");
        assert!(ok.is_ok());

        let bad: std::result::Result<RegionPolygon, _> = serde_json::from_str("[[0,0],[2,0]]");
        assert!(bad.is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_closed_ring_repeats_first_vertex(
            points in proptest::collection::vec((-180i32..180, -90i32..90), 3..12)
        ) {
            let vertices: Vec<[f64; 2]> =
                points.iter().map(|&(x, y)| [f64::from(x), f64::from(y)]).collect();
            if let Ok(polygon) = RegionPolygon::new(vertices.clone()) {
                let ring = polygon.closed_ring();
                proptest::prop_assert_eq!(ring.first(), ring.last());
                proptest::prop_assert_eq!(ring.len(), polygon.vertices().len() + 1);
                proptest::prop_assert!(polygon.vertices().len() >= vertices.len() - 1);
            }
        }
    }
}
