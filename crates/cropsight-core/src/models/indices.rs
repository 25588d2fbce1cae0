//! Per-field spectral index aggregates.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Stand-in for a missing moisture stress index
pub const DEFAULT_MSI: f64 = 1.0;

/// Names of the eight entries of an [`IndexSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexName {
    Ndvi,
    Savi,
    Evi,
    Ndwi,
    Msi,
    Red,
    Green,
    Nir,
}

impl IndexName {
    pub const ALL: [IndexName; 8] = [
        IndexName::Ndvi,
        IndexName::Savi,
        IndexName::Evi,
        IndexName::Ndwi,
        IndexName::Msi,
        IndexName::Red,
        IndexName::Green,
        IndexName::Nir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexName::Ndvi => "NDVI",
            IndexName::Savi => "SAVI",
            IndexName::Evi => "EVI",
            IndexName::Ndwi => "NDWI",
            IndexName::Msi => "MSI",
            IndexName::Red => "RED",
            IndexName::Green => "GREEN",
            IndexName::Nir => "NIR",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spatial means of the vegetation indices and raw reflectances over a field.
///
/// MSI is `None` when no pixel passed its validity mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSet {
    pub ndvi: f64,
    pub savi: f64,
    pub evi: f64,
    pub ndwi: f64,
    pub msi: Option<f64>,
    pub red: f64,
    pub green: f64,
    pub nir: f64,
}

impl IndexSet {
    /// MSI with the missing value replaced by [`DEFAULT_MSI`]
    pub fn msi_or_default(&self) -> f64 {
        self.msi.unwrap_or(DEFAULT_MSI)
    }

    pub fn get(&self, name: IndexName) -> Option<f64> {
        match name {
            IndexName::Ndvi => Some(self.ndvi),
            IndexName::Savi => Some(self.savi),
            IndexName::Evi => Some(self.evi),
            IndexName::Ndwi => Some(self.ndwi),
            IndexName::Msi => self.msi,
            IndexName::Red => Some(self.red),
            IndexName::Green => Some(self.green),
            IndexName::Nir => Some(self.nir),
        }
    }

    /// All eight entries in canonical order
    pub fn entries(&self) -> [(IndexName, Option<f64>); 8] {
        IndexName::ALL.map(|name| (name, self.get(name)))
    }

    /// Copy with every value rounded to `decimals` places
    pub fn rounded(&self, decimals: u32) -> Self {
        let r = |v: f64| round_to(v, decimals);
        Self {
            ndvi: r(self.ndvi),
            savi: r(self.savi),
            evi: r(self.evi),
            ndwi: r(self.ndwi),
            msi: self.msi.map(r),
            red: r(self.red),
            green: r(self.green),
            nir: r(self.nir),
        }
    }
}

impl Serialize for IndexSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(IndexName::ALL.len()))?;
        for (name, value) in self.entries() {
            map.serialize_entry(name.as_str(), &value)?;
        }
        map.end()
    }
}

/// Round half away from zero to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
