//! CropSight Core - Domain models, configuration, and port definitions
//!
//! This crate contains the domain types shared by every stage of the field
//! assessment pipeline, together with the reader ports that raster adapters
//! implement.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{CropsightError, Result};
