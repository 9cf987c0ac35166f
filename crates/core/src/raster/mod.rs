//! Raster data structures

mod cube;
mod element;
mod grid;

pub use cube::{BandId, GeoCorners, LonLat, RasterCube};
pub use element::RasterElement;
pub use grid::Raster;
