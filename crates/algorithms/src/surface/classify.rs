//! Nearest-centroid surface classification
//!
//! Each pixel vector (one value per band, ascending band id) is compared
//! against every scaled class centroid by Euclidean distance and takes the
//! closest class. Pixels equal to the background sentinel in every band,
//! and pixels with a non-finite band value, are left unclassified.
//!
//! Pixels are independent, so the raster is split into tiles that are
//! classified under the configured [`ProcessingMode`]. Each tile keeps its
//! own histogram; tiles are merged in a fixed order, so the output does not
//! depend on the thread count.

use super::centroid::{CentroidSet, ReflectanceScale};
use super::bands::Mission;
use glaciermap_colormap::{labels_to_rgb, ClassPalette, Rgb};
use glaciermap_core::raster::{Raster, RasterCube};
use glaciermap_core::{Error, Result, SurfaceClass};
use glaciermap_parallel::{CancelFlag, ProcessingMode, Tile, TiledProcessor};
use ndarray::{s, Array2, ArrayView2};
use serde::Serialize;
use std::collections::BTreeMap;

/// Parameters for [`classify`]
#[derive(Debug, Clone)]
pub struct ClassifyParams {
    /// Multiplier applied to every centroid before comparison
    pub scale: ReflectanceScale,
    /// Value marking pixels outside the valid footprint (all bands equal)
    pub background: f64,
    /// Largest tolerated ratio between raster and scaled centroid magnitudes.
    /// `None` disables the check.
    pub max_scale_ratio: Option<f64>,
    /// Tile edge length in pixels
    pub tile_size: usize,
    /// Execution strategy
    pub mode: ProcessingMode,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            scale: ReflectanceScale::UNIT,
            background: 0.0,
            max_scale_ratio: Some(10.0),
            tile_size: 256,
            mode: ProcessingMode::Parallel,
        }
    }
}

impl ClassifyParams {
    /// Defaults with the mission's reflectance scale
    pub fn for_mission(mission: Mission) -> Self {
        Self {
            scale: ReflectanceScale::for_mission(mission),
            ..Self::default()
        }
    }
}

/// Pixel count per class
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Histogram {
    counts: BTreeMap<SurfaceClass, u64>,
}

impl Histogram {
    /// Histogram with a zero entry for every class
    pub fn new<I: IntoIterator<Item = SurfaceClass>>(classes: I) -> Self {
        Self {
            counts: classes.into_iter().map(|c| (c, 0)).collect(),
        }
    }

    fn increment(&mut self, class: SurfaceClass) {
        *self.counts.entry(class).or_insert(0) += 1;
    }

    fn merge(&mut self, other: &Histogram) {
        for (class, n) in &other.counts {
            *self.counts.entry(*class).or_insert(0) += n;
        }
    }

    /// Count for a class (0 if the class was not part of the run)
    pub fn get(&self, class: SurfaceClass) -> u64 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    /// Sum over all classes
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Classes in priority order with their counts
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceClass, u64)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// Result of classifying a raster cube
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationMap {
    labels: Raster<u8>,
    rgb: Vec<u8>,
    histogram: Histogram,
    background_pixels: u64,
    invalid_pixels: u64,
}

impl ClassificationMap {
    /// Class label grid: 0 for unclassified pixels, otherwise [`SurfaceClass::code`]
    pub fn labels(&self) -> &Raster<u8> {
        &self.labels
    }

    /// RGB buffer, `rows * cols * 3` bytes in row-major order
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn shape(&self) -> (usize, usize) {
        self.labels.shape()
    }

    /// Pixels matching the background sentinel in every band
    pub fn background_pixels(&self) -> u64 {
        self.background_pixels
    }

    /// Pixels skipped because a band value was NaN or infinite
    pub fn invalid_pixels(&self) -> u64 {
        self.invalid_pixels
    }

    /// All unclassified pixels
    pub fn nodata_pixels(&self) -> u64 {
        self.background_pixels + self.invalid_pixels
    }

    /// Class at (row, col), `None` for unclassified pixels
    pub fn class_at(&self, row: usize, col: usize) -> Result<Option<SurfaceClass>> {
        Ok(SurfaceClass::from_code(self.labels.get(row, col)?))
    }

    /// Color at (row, col)
    pub fn color_at(&self, row: usize, col: usize) -> Result<Rgb> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return Err(Error::IndexOutOfBounds { row, col, rows, cols });
        }
        let i = (row * cols + col) * 3;
        Ok(Rgb::new(self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]))
    }

    /// Render the labels with another palette
    pub fn recolor(&self, palette: &ClassPalette) -> Vec<u8> {
        labels_to_rgb(&self.labels, palette)
    }
}

/// Outcome for a single pixel vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOutcome {
    /// Every band equals the background sentinel
    Background,
    /// At least one band value is NaN or infinite
    Invalid,
    /// Nearest class
    Class(SurfaceClass),
}

/// Classify one pixel vector against scaled centroids given in priority order.
///
/// Ties keep the earlier class.
pub fn classify_pixel(
    pixel: &[f64],
    targets: &[(SurfaceClass, Vec<f64>)],
    background: f64,
) -> PixelOutcome {
    if pixel.iter().all(|&v| v == background) {
        return PixelOutcome::Background;
    }
    if pixel.iter().any(|v| !v.is_finite()) {
        return PixelOutcome::Invalid;
    }

    let mut best: Option<(SurfaceClass, f64)> = None;
    for (class, target) in targets {
        let d2 = squared_distance(pixel, target);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((*class, d2)),
        }
    }
    match best {
        Some((class, _)) => PixelOutcome::Class(class),
        None => PixelOutcome::Invalid,
    }
}

/// Euclidean distance between two vectors of equal length
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Classify every pixel of `cube` against `centroids`.
///
/// Fails before touching any pixel when the parameters are invalid, the
/// band sets of cube and centroids differ, or the raster and scaled
/// centroid magnitudes are inconsistent.
pub fn classify(
    cube: &RasterCube,
    centroids: &CentroidSet,
    params: &ClassifyParams,
    palette: &ClassPalette,
) -> Result<ClassificationMap> {
    classify_with_cancel(cube, centroids, params, palette, &CancelFlag::new())
}

/// [`classify`] with cooperative cancellation.
///
/// Once `cancel` is set no further tiles start; partial results are
/// dropped and [`Error::Cancelled`] is returned.
pub fn classify_with_cancel(
    cube: &RasterCube,
    centroids: &CentroidSet,
    params: &ClassifyParams,
    palette: &ClassPalette,
    cancel: &CancelFlag,
) -> Result<ClassificationMap> {
    validate_params(params)?;
    check_bands(cube, centroids)?;
    let targets = centroids.scaled_vectors(params.scale);
    if let Some(max_ratio) = params.max_scale_ratio {
        check_scale_consistency(cube, &targets, params.background, max_ratio)?;
    }

    let (rows, cols) = cube.shape();
    let classes = centroids.classes();

    let processor = TiledProcessor::new(params.tile_size, params.mode);
    let blocks = processor
        .map_tiles(rows, cols, cancel, |tile| {
            classify_tile(tile, cube, &targets, &classes, params.background)
        })
        .map_err(|_| Error::Cancelled)?;

    let mut labels = Array2::<u8>::zeros((rows, cols));
    let mut histogram = Histogram::new(classes.iter().copied());
    let mut background_pixels = 0;
    let mut invalid_pixels = 0;
    for (tile, block) in blocks {
        let block = block?;
        let block_view = ArrayView2::from_shape((tile.rows, tile.cols), &block.labels)
            .map_err(|e| Error::Other(e.to_string()))?;
        labels
            .slice_mut(s![
                tile.row_offset..tile.row_offset + tile.rows,
                tile.col_offset..tile.col_offset + tile.cols
            ])
            .assign(&block_view);
        histogram.merge(&block.histogram);
        background_pixels += block.background;
        invalid_pixels += block.invalid;
    }

    let labels = Raster::from_array(labels);
    let rgb = labels_to_rgb(&labels, palette);
    Ok(ClassificationMap {
        labels,
        rgb,
        histogram,
        background_pixels,
        invalid_pixels,
    })
}

struct TileBlock {
    labels: Vec<u8>,
    histogram: Histogram,
    background: u64,
    invalid: u64,
}

fn classify_tile(
    tile: &Tile,
    cube: &RasterCube,
    targets: &[(SurfaceClass, Vec<f64>)],
    classes: &[SurfaceClass],
    background_value: f64,
) -> Result<TileBlock> {
    let mut block = TileBlock {
        labels: vec![0; tile.len()],
        histogram: Histogram::new(classes.iter().copied()),
        background: 0,
        invalid: 0,
    };
    let mut pixel = vec![0.0; cube.band_count()];

    for local_row in 0..tile.rows {
        for local_col in 0..tile.cols {
            let (row, col) = tile.to_source_coords(local_row, local_col);
            cube.pixel_into(row, col, &mut pixel)?;
            match classify_pixel(&pixel, targets, background_value) {
                PixelOutcome::Background => block.background += 1,
                PixelOutcome::Invalid => block.invalid += 1,
                PixelOutcome::Class(class) => {
                    block.labels[local_row * tile.cols + local_col] = class.code();
                    block.histogram.increment(class);
                }
            }
        }
    }
    Ok(block)
}

fn validate_params(params: &ClassifyParams) -> Result<()> {
    if !params.background.is_finite() {
        return Err(Error::InvalidParameter {
            name: "background",
            value: params.background.to_string(),
            reason: "sentinel must be a finite value".into(),
        });
    }
    if let Some(r) = params.max_scale_ratio {
        if !(r.is_finite() && r >= 1.0) {
            return Err(Error::InvalidParameter {
                name: "max_scale_ratio",
                value: r.to_string(),
                reason: "must be finite and at least 1".into(),
            });
        }
    }
    if params.tile_size == 0 {
        return Err(Error::InvalidParameter {
            name: "tile_size",
            value: "0".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

/// Require the cube and the centroids to cover exactly the same bands
pub fn check_bands(cube: &RasterCube, centroids: &CentroidSet) -> Result<()> {
    let raster = cube.band_ids();
    if raster.as_slice() != centroids.band_ids() {
        return Err(Error::BandMismatch {
            centroid: centroids.band_ids().iter().map(|b| b.get()).collect(),
            raster: raster.iter().map(|b| b.get()).collect(),
        });
    }
    Ok(())
}

/// Compare the largest raster magnitude with the range of scaled centroid
/// magnitudes.
///
/// The raster maximum must lie within `[centroid_min / max_ratio,
/// centroid_max * max_ratio]`, where `centroid_min` is the smallest non-zero
/// centroid magnitude, so scenes holding only dark surfaces still pass.
/// Background-valued and non-finite cells are ignored. Passes trivially
/// when either side has no non-zero value.
pub fn check_scale_consistency(
    cube: &RasterCube,
    targets: &[(SurfaceClass, Vec<f64>)],
    background: f64,
    max_ratio: f64,
) -> Result<()> {
    let raster_max = cube
        .iter()
        .flat_map(|(_, band)| band.data().iter().copied())
        .filter(|v| v.is_finite() && *v != background)
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    let (centroid_min, centroid_max) = targets
        .iter()
        .flat_map(|(_, t)| t.iter().map(|v| v.abs()))
        .filter(|v| *v > 0.0)
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if raster_max == 0.0 || centroid_max == 0.0 {
        return Ok(());
    }
    if raster_max > centroid_max * max_ratio || raster_max < centroid_min / max_ratio {
        return Err(Error::ScaleMismatch {
            raster_max,
            centroid_min,
            centroid_max,
            max_ratio,
        });
    }
    Ok(())
}
