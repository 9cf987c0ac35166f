//! Multi-band raster cube

use crate::error::{Error, Result};
use crate::raster::Raster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sensor band identifier.
///
/// Numbering is mission-specific: band 5 of one mission is unrelated to
/// band 5 of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandId(pub u8);

impl BandId {
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

impl From<u8> for BandId {
    fn from(v: u8) -> Self {
        BandId(v)
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Upper-left and lower-right corners of a raster footprint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCorners {
    pub upper_left: LonLat,
    pub lower_right: LonLat,
}

impl GeoCorners {
    pub const fn new(upper_left: LonLat, lower_right: LonLat) -> Self {
        Self {
            upper_left,
            lower_right,
        }
    }
}

/// A stack of co-registered band rasters keyed by band id.
///
/// All bands share one shape and the cube always holds at least one band
/// with at least one pixel. Iteration is in ascending band-id order, which
/// is the fixed band order used for pixel vectors.
#[derive(Debug, Clone)]
pub struct RasterCube {
    bands: BTreeMap<BandId, Raster<f64>>,
    corners: GeoCorners,
    shape: (usize, usize),
}

impl RasterCube {
    /// Build a cube, checking that it is non-empty and that every band has
    /// the same shape.
    pub fn new(bands: BTreeMap<BandId, Raster<f64>>, corners: GeoCorners) -> Result<Self> {
        let Some(first) = bands.values().next() else {
            return Err(Error::EmptyRaster);
        };
        let shape = first.shape();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(Error::EmptyRaster);
        }
        for band in bands.values() {
            let (ar, ac) = band.shape();
            if (ar, ac) != shape {
                return Err(Error::SizeMismatch {
                    er: shape.0,
                    ec: shape.1,
                    ar,
                    ac,
                });
            }
        }
        Ok(Self {
            bands,
            corners,
            shape,
        })
    }

    /// Dimensions shared by all bands as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band ids in ascending order
    pub fn band_ids(&self) -> Vec<BandId> {
        self.bands.keys().copied().collect()
    }

    pub fn band(&self, id: BandId) -> Option<&Raster<f64>> {
        self.bands.get(&id)
    }

    /// Iterate over (band id, raster) in ascending band order
    pub fn iter(&self) -> impl Iterator<Item = (BandId, &Raster<f64>)> {
        self.bands.iter().map(|(id, r)| (*id, r))
    }

    pub fn corners(&self) -> GeoCorners {
        self.corners
    }

    /// Read the pixel vector at (row, col) into `out`, in ascending band order.
    ///
    /// `out` must have length [`band_count`](Self::band_count).
    pub fn pixel_into(&self, row: usize, col: usize, out: &mut [f64]) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        for (slot, band) in out.iter_mut().zip(self.bands.values()) {
            *slot = band.data()[[row, col]];
        }
        Ok(())
    }
}
