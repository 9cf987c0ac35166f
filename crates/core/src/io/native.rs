//! Native TIFF band reading
//!
//! Uses the `tiff` crate to decode one band per file and assembles band
//! files into a [`RasterCube`].

use crate::error::{Error, Result};
use crate::raster::{BandId, GeoCorners, Raster, RasterCube, RasterElement};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};

/// Options for assembling a raster cube from band files
#[derive(Debug, Clone)]
pub struct ReadBandsOptions {
    /// Stretch each band linearly to [0, 1] using its own min/max
    pub normalize: bool,
    /// Geographic footprint of the bands
    pub corners: GeoCorners,
}

impl Default for ReadBandsOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            corners: GeoCorners::default(),
        }
    }
}

/// Read a single-band TIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_tiff(file)
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(T::fill_value()))
        .collect()
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_tiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Multi-sample (e.g. RGB) images decode to more values than pixels
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    Raster::from_vec(data, rows, cols)
}

/// Stretch a band linearly so its finite values span [0, 1].
///
/// A constant band maps to all zeros. Non-finite cells are kept as NaN.
pub fn normalize_min_max(band: &Raster<f64>) -> Raster<f64> {
    let Some((min, max)) = band.value_range() else {
        return band.map_to_f64(|_| f64::NAN);
    };
    let range = max - min;
    band.map_to_f64(|v| {
        if !v.is_finite() {
            f64::NAN
        } else if range > 0.0 {
            (v - min) / range
        } else {
            0.0
        }
    })
}

/// Extract the band number from a band file stem.
///
/// Accepts plain numbers (`4`), sensor labels (`B04`, `B8A`, `b10`) and
/// labels embedded in product names (`T32TMS_20200720T102031_B03_20m`).
/// The last matching token wins.
pub fn parse_band_id(stem: &str) -> Option<BandId> {
    stem.rsplit(['_', '-', '.', ' ']).find_map(parse_band_token)
}

fn parse_band_token(token: &str) -> Option<BandId> {
    let upper = token.to_ascii_uppercase();
    let body = upper.strip_prefix('B').unwrap_or(&upper);
    let digits = body.strip_suffix('A').unwrap_or(body);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // A bare token must not carry a suffix: "8A" only makes sense as "B8A"
    if body.len() != digits.len() && !upper.starts_with('B') {
        return None;
    }
    match digits.parse::<u8>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(BandId(n)),
    }
}

/// Build a raster cube from a directory holding one TIFF per band.
///
/// Files whose stem does not name a band are skipped. Two files naming
/// the same band are rejected.
pub fn read_band_directory<P: AsRef<Path>>(dir: P, options: &ReadBandsOptions) -> Result<RasterCube> {
    let mut entries: Vec<_> = std::fs::read_dir(dir.as_ref())?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        })
        .collect();
    entries.sort();

    let mut bands = BTreeMap::new();
    for path in entries {
        let Some(band) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(parse_band_id)
        else {
            continue;
        };
        let raster: Raster<f64> = read_geotiff(&path)?;
        let raster = if options.normalize {
            normalize_min_max(&raster)
        } else {
            raster
        };
        if bands.insert(band, raster).is_some() {
            return Err(Error::InvalidParameter {
                name: "band_directory",
                value: path.display().to_string(),
                reason: format!("band {} appears more than once", band.get()),
            });
        }
    }

    RasterCube::new(bands, options.corners)
}
