//! Error types for glaciermap

use thiserror::Error;

/// Main error type for glaciermap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Parse error in {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Raster input is empty")]
    EmptyRaster,

    #[error("No centroids supplied")]
    NoCentroids,

    #[error("Band set mismatch: centroids have {centroid:?}, raster has {raster:?}")]
    BandMismatch { centroid: Vec<u8>, raster: Vec<u8> },

    #[error("Class {class} has no training samples")]
    EmptyClass { class: String },

    #[error("Band {band} has an empty wavelength interval [{min_nm}, {max_nm})")]
    EmptyBandInterval { band: u8, min_nm: u32, max_nm: u32 },

    #[error("Band {band} interval [{min_nm}, {max_nm}) lies outside the spectral table ({first_nm}..{end_nm} nm)")]
    BandOutOfRange {
        band: u8,
        min_nm: u32,
        max_nm: u32,
        first_nm: u32,
        end_nm: u32,
    },

    #[error("Sample '{sample}' of class {class} is not a column of the spectral table")]
    UnknownSample { class: String, sample: String },

    #[error("Centroid for class {class}, band {band} is not finite ({value})")]
    NonFiniteCentroid { class: String, band: u8, value: f64 },

    #[error("Raster and centroid scales disagree: raster max {raster_max} outside scaled centroids {centroid_min}..{centroid_max} widened by {max_ratio}")]
    ScaleMismatch {
        raster_max: f64,
        centroid_min: f64,
        centroid_max: f64,
        max_ratio: f64,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error reports an inconsistent classifier setup rather
    /// than an I/O or runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyRaster
                | Error::NoCentroids
                | Error::BandMismatch { .. }
                | Error::EmptyClass { .. }
                | Error::EmptyBandInterval { .. }
                | Error::BandOutOfRange { .. }
                | Error::UnknownSample { .. }
                | Error::NonFiniteCentroid { .. }
                | Error::ScaleMismatch { .. }
                | Error::InvalidParameter { .. }
        )
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Parse {
            source_name: "csv".into(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse {
            source_name: "json".into(),
            message: e.to_string(),
        }
    }
}

/// Result type alias for glaciermap operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_kinds() {
        assert!(Error::EmptyRaster.is_configuration());
        assert!(Error::BandMismatch { centroid: vec![1, 2, 3], raster: vec![1, 2] }.is_configuration());
        assert!(!Error::Cancelled.is_configuration());
        assert!(!Error::Other("x".into()).is_configuration());
    }

    #[test]
    fn band_mismatch_message() {
        let e = Error::BandMismatch { centroid: vec![1, 2, 3], raster: vec![1, 2] };
        assert_eq!(
            e.to_string(),
            "Band set mismatch: centroids have [1, 2, 3], raster has [1, 2]"
        );
    }
}
