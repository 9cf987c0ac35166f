//! Glacier surface classification from multispectral imagery
//!
//! - **bands**: Wavelength intervals per mission band
//! - **training**: Class centroids from field reflectance spectra
//! - **classify**: Nearest-centroid labelling of a raster cube
//! - **axis**: Geographic tick values for map labelling

mod axis;
mod bands;
mod centroid;
mod classify;
mod training;

pub use axis::{axis_ticks, AxisTicks, TickLabels, DEFAULT_TICK_DECIMALS};
pub use bands::{BandDefinition, BandDefinitionTable, Mission};
pub use centroid::{Centroid, CentroidSet, ReflectanceScale};
pub use classify::{
    check_bands, check_scale_consistency, classify, classify_pixel, classify_with_cancel,
    euclidean_distance, ClassificationMap, ClassifyParams, Histogram, PixelOutcome,
};
pub use training::{band_rows, build_centroids, build_centroids_with};
