//! # glaciermap core
//!
//! Core types and I/O for the glaciermap surface classifier.
//!
//! This crate provides:
//! - `Raster<T>`: single-band grid type
//! - `RasterCube`: co-registered bands keyed by `BandId`, with geographic corners
//! - `SurfaceClass`: the glacier surface categories in tie-break priority order
//! - `SpectralTable` / `ClassMembership`: field spectra and their class labels
//! - Readers for band TIFFs, spectral CSV tables and membership JSON

pub mod class;
pub mod error;
pub mod io;
pub mod raster;
pub mod spectral;

pub use class::SurfaceClass;
pub use error::{Error, Result};
pub use raster::{BandId, GeoCorners, LonLat, Raster, RasterCube, RasterElement};
pub use spectral::{ClassMembership, SpectralTable, DEFAULT_BASE_WAVELENGTH};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::class::SurfaceClass;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{BandId, GeoCorners, LonLat, Raster, RasterCube, RasterElement};
    pub use crate::spectral::{ClassMembership, SpectralTable};
}
