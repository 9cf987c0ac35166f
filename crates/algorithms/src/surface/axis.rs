//! Geographic axis ticks for the classification map
//!
//! Longitudes are spread across the raster width and latitudes across its
//! height, from the upper-left corner to the lower-right one, inclusive at
//! both ends.

use glaciermap_core::GeoCorners;
use serde::Serialize;

/// Decimal places used for tick labels unless told otherwise
pub const DEFAULT_TICK_DECIMALS: u32 = 2;

/// One value per pixel column (longitudes) and per pixel row (latitudes)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTicks {
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
}

/// Subset of ticks to label, as `(pixel_index, value)` pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickLabels {
    pub longitudes: Vec<(usize, f64)>,
    pub latitudes: Vec<(usize, f64)>,
}

impl AxisTicks {
    /// Keep at most `nbins + 1` evenly spaced ticks per axis.
    ///
    /// Both ends are always kept. `nbins == 0` keeps every tick.
    pub fn thinned(&self, nbins: usize) -> TickLabels {
        TickLabels {
            longitudes: thin(&self.longitudes, nbins),
            latitudes: thin(&self.latitudes, nbins),
        }
    }
}

/// Interpolate tick values for a `width × height` raster spanning `corners`
pub fn axis_ticks(corners: GeoCorners, width: usize, height: usize, decimals: u32) -> AxisTicks {
    let ul = corners.upper_left;
    let lr = corners.lower_right;
    AxisTicks {
        longitudes: linspace(ul.lon, lr.lon, width)
            .map(|v| round_to(v, decimals))
            .collect(),
        latitudes: linspace(ul.lat, lr.lat, height)
            .map(|v| round_to(v, decimals))
            .collect(),
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// A single value yields `start`; the last value is exactly `end`.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| {
        if n > 1 && i == n - 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

/// Round half away from zero
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn thin(values: &[f64], nbins: usize) -> Vec<(usize, f64)> {
    let n = values.len();
    if nbins == 0 || n <= nbins + 1 {
        return values.iter().copied().enumerate().collect();
    }
    let mut out: Vec<(usize, f64)> = Vec::with_capacity(nbins + 1);
    for i in 0..=nbins {
        let idx = (i * (n - 1) + nbins / 2) / nbins;
        if out.last().map_or(true, |(last, _)| *last != idx) {
            out.push((idx, values[idx]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glaciermap_core::LonLat;

    fn corners() -> GeoCorners {
        GeoCorners::new(LonLat::new(-50.0, 67.2), LonLat::new(-49.0, 67.0))
    }

    #[test]
    fn inclusive_at_both_ends() {
        let ticks = axis_ticks(corners(), 5, 3, 2);
        assert_eq!(ticks.longitudes, vec![-50.0, -49.75, -49.5, -49.25, -49.0]);
        assert_eq!(ticks.latitudes, vec![67.2, 67.1, 67.0]);
    }

    #[test]
    fn rounding() {
        let ticks = axis_ticks(corners(), 4, 1, 2);
        // -49.666.. and -49.333..
        assert_eq!(ticks.longitudes, vec![-50.0, -49.67, -49.33, -49.0]);
        assert_relative_eq!(round_to(0.125, 2), 0.13);
        assert_relative_eq!(round_to(-2.5, 0), -3.0);
        assert_relative_eq!(round_to(1.23456, 3), 1.235);
    }

    #[test]
    fn degenerate_lengths() {
        let ticks = axis_ticks(corners(), 1, 0, 2);
        assert_eq!(ticks.longitudes, vec![-50.0]);
        assert!(ticks.latitudes.is_empty());
    }

    #[test]
    fn thinning_keeps_ends() {
        let ticks = axis_ticks(corners(), 101, 3, 2);
        let labels = ticks.thinned(4);
        let idx: Vec<usize> = labels.longitudes.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![0, 25, 50, 75, 100]);
        assert_eq!(labels.longitudes[4].1, -49.0);
        // fewer values than bins: unchanged
        assert_eq!(labels.latitudes.len(), 3);
        assert_eq!(ticks.thinned(0).longitudes.len(), 101);
    }

    #[test]
    fn thinning_uneven() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let thinned = thin(&values, 4);
        assert_eq!(thinned.first(), Some(&(0, 0.0)));
        assert_eq!(thinned.last(), Some(&(9, 9.0)));
        assert!(thinned.len() <= 5);
    }
}
