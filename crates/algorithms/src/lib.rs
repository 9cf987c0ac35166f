//! # glaciermap algorithms
//!
//! Supervised glacier surface classification.
//!
//! Field spectra are reduced to one centroid per surface class and band
//! ([`surface::build_centroids`]); every pixel of a co-registered band cube
//! is then assigned to the nearest centroid ([`surface::classify`]).

pub mod surface;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::surface::{
        axis_ticks, build_centroids, classify, classify_with_cancel, AxisTicks,
        BandDefinitionTable, CentroidSet, ClassificationMap, ClassifyParams, Histogram,
        Mission, ReflectanceScale,
    };
    pub use glaciermap_colormap::{ClassPalette, Rgb};
    pub use glaciermap_core::prelude::*;
    pub use glaciermap_parallel::{CancelFlag, ProcessingMode};
}
