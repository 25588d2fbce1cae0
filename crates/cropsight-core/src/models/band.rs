//! Spectral band identifiers and their sources.

use crate::error::{CropsightError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The five Sentinel-2 bands the pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandId {
    Blue,
    Green,
    Red,
    NearInfrared,
    ShortWaveInfrared,
}

impl BandId {
    /// All bands, near-infrared first since it defines the reference grid
    pub const ALL: [BandId; 5] = [
        BandId::NearInfrared,
        BandId::Blue,
        BandId::Green,
        BandId::Red,
        BandId::ShortWaveInfrared,
    ];

    /// Sentinel-2 L2A asset key
    pub fn asset_key(&self) -> &'static str {
        match self {
            BandId::Blue => "B02",
            BandId::Green => "B03",
            BandId::Red => "B04",
            BandId::NearInfrared => "B08",
            BandId::ShortWaveInfrared => "B11",
        }
    }

    /// Parse a band from its name or Sentinel-2 asset key
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blue" | "b02" => Ok(BandId::Blue),
            "green" | "b03" => Ok(BandId::Green),
            "red" | "b04" => Ok(BandId::Red),
            "nir" | "near_infrared" | "b08" => Ok(BandId::NearInfrared),
            "swir" | "short_wave_infrared" | "b11" => Ok(BandId::ShortWaveInfrared),
            _ => Err(CropsightError::ConfigInvalid {
                key: "band".to_string(),
                reason: format!("Unknown band '{}'. Use blue, green, red, nir or swir", s),
            }),
        }
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BandId::Blue => "blue",
            BandId::Green => "green",
            BandId::Red => "red",
            BandId::NearInfrared => "nir",
            BandId::ShortWaveInfrared => "swir",
        };
        write!(f, "{} ({})", name, self.asset_key())
    }
}

/// Opaque handle to one band's raster: a local path or an http(s) URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSource(pub String);

impl BandSource {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the handle should be fetched over HTTP
    pub fn is_remote(&self) -> bool {
        let lower = self.0.to_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

impl fmt::Display for BandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Band sources for one scene, keyed by band
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandSources {
    sources: BTreeMap<BandId, BandSource>,
}

impl BandSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, band: BandId, source: BandSource) -> Self {
        self.sources.insert(band, source);
        self
    }

    pub fn insert(&mut self, band: BandId, source: BandSource) {
        self.sources.insert(band, source);
    }

    /// Look up a band, failing if the scene does not provide it
    pub fn get(&self, band: BandId) -> Result<&BandSource> {
        self.sources
            .get(&band)
            .ok_or_else(|| CropsightError::MissingBand { band: band.to_string() })
    }

    /// Check that all five bands are present
    pub fn ensure_complete(&self) -> Result<()> {
        for band in BandId::ALL {
            self.get(band)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_band_names_and_asset_keys() {
        assert_eq!(BandId::parse("NIR").unwrap(), BandId::NearInfrared);
        assert_eq!(BandId::parse("b11").unwrap(), BandId::ShortWaveInfrared);
        assert_eq!(BandId::parse("Blue").unwrap(), BandId::Blue);
        assert!(BandId::parse("B12").is_err());
    }

    #[test]
    fn test_remote_detection() {
        assert!(BandSource::new("https://example.com/B08.tif").is_remote());
        assert!(BandSource::new("HTTP://example.com/B08.tif").is_remote());
        assert!(!BandSource::new("/data/B08.tif").is_remote());
    }

    #[test]
    fn test_incomplete_sources_report_missing_band() {
        let sources = BandSources::new()
            .with(BandId::NearInfrared, BandSource::new("nir.tif"))
            .with(BandId::Red, BandSource::new("red.tif"));

        match sources.ensure_complete() {
            Err(CropsightError::MissingBand { band }) => assert!(band.contains("B02")),
            other => panic!("Expected MissingBand, got {:?}", other),
        }
    }
}
