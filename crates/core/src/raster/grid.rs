//! Single-band raster grid

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::{Array2, ArrayView2};

/// One band of imagery, or a label grid, indexed by (row, col).
///
/// Bands of a scene share a shape and are grouped in a
/// [`RasterCube`](crate::RasterCube). Masked cells are stored as NaN in
/// float bands.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Zero-filled grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Grid from row-major values; `data.len()` must equal `rows * cols`.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Array2::from_shape_vec((rows, cols), data)
            .map(Self::from_array)
            .map_err(|e| Error::Other(e.to_string()))
    }

    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        match self.data.get((row, col)) {
            Some(v) => Ok(*v),
            None => Err(self.out_of_bounds(row, col)),
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(self.out_of_bounds(row, col));
        }
        self.data[[row, col]] = value;
        Ok(())
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Smallest and largest finite value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter_map(|v| v.to_f64())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Apply `f` to every cell
    pub fn map_to_f64<F>(&self, f: F) -> Raster<f64>
    where
        F: Fn(T) -> f64,
    {
        Raster::from_array(self.data.mapv(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_access() {
        let mut band: Raster<f64> = Raster::new(4, 6);
        assert_eq!(band.shape(), (4, 6));
        assert_eq!(band.len(), 24);
        band.set(3, 5, 0.42).unwrap();
        assert_eq!(band.get(3, 5).unwrap(), 0.42);
        assert!(matches!(
            band.get(4, 0),
            Err(Error::IndexOutOfBounds { rows: 4, cols: 6, .. })
        ));
        assert!(band.set(0, 6, 1.0).is_err());
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Raster::<f64>::from_vec(vec![1.0; 5], 2, 3).is_err());
        let labels = Raster::<u8>::from_vec(vec![1, 2, 3, 4, 5, 6], 2, 3).unwrap();
        assert_eq!(labels.get(1, 0).unwrap(), 4);
    }

    #[test]
    fn value_range_skips_non_finite() {
        let band = Raster::from_vec(vec![0.0, 2.0, f64::NAN, 7.0, f64::INFINITY, 1.0], 2, 3).unwrap();
        assert_eq!(band.value_range(), Some((0.0, 7.0)));
        assert_eq!(Raster::filled(2, 2, f64::NAN).value_range(), None);
    }

    #[test]
    fn map_keeps_shape() {
        let band = Raster::<u16>::from_vec(vec![0, 5000, 10000], 1, 3).unwrap();
        let scaled = band.map_to_f64(|v| f64::from(v) / 10000.0);
        assert_eq!(scaled.shape(), (1, 3));
        assert_eq!(scaled.get(0, 1).unwrap(), 0.5);
    }
}
