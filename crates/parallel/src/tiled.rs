//! Tiled processing for large rasters

use crate::cancel::{CancelFlag, Cancelled};
use crate::strategy::{ParallelStrategy, ProcessingMode};

/// A rectangular block of a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Row offset in the source raster
    pub row_offset: usize,
    /// Column offset in the source raster
    pub col_offset: usize,
    /// Number of rows in this tile
    pub rows: usize,
    /// Number of columns in this tile
    pub cols: usize,
}

impl Tile {
    pub fn new(row_offset: usize, col_offset: usize, rows: usize, cols: usize) -> Self {
        Self {
            row_offset,
            col_offset,
            rows,
            cols,
        }
    }

    /// Number of cells in the tile
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert tile-local coordinates to source raster coordinates
    pub fn to_source_coords(&self, local_row: usize, local_col: usize) -> (usize, usize) {
        (self.row_offset + local_row, self.col_offset + local_col)
    }
}

/// Iterator over non-overlapping tiles covering a raster in row-major order.
///
/// Edge tiles are clipped to the raster bounds.
pub struct TileIterator {
    total_rows: usize,
    total_cols: usize,
    tile_rows: usize,
    tile_cols: usize,
    current_row: usize,
    current_col: usize,
}

impl TileIterator {
    /// Create a new tile iterator. A tile size of 0 is treated as 1.
    pub fn new(total_rows: usize, total_cols: usize, tile_rows: usize, tile_cols: usize) -> Self {
        Self {
            total_rows,
            total_cols,
            tile_rows: tile_rows.max(1),
            tile_cols: tile_cols.max(1),
            current_row: 0,
            current_col: 0,
        }
    }

    /// Square tiles of `tile_size` cells per side
    pub fn square(total_rows: usize, total_cols: usize, tile_size: usize) -> Self {
        Self::new(total_rows, total_cols, tile_size, tile_size)
    }
}

impl Iterator for TileIterator {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.total_rows || self.total_cols == 0 {
            return None;
        }

        let rows = self.tile_rows.min(self.total_rows - self.current_row);
        let cols = self.tile_cols.min(self.total_cols - self.current_col);
        let tile = Tile::new(self.current_row, self.current_col, rows, cols);

        self.current_col += self.tile_cols;
        if self.current_col >= self.total_cols {
            self.current_col = 0;
            self.current_row += self.tile_rows;
        }

        Some(tile)
    }
}

/// Runs independent per-tile work under a [`ProcessingMode`]
#[derive(Debug, Clone, Copy)]
pub struct TiledProcessor {
    tile_size: usize,
    mode: ProcessingMode,
}

impl TiledProcessor {
    pub fn new(tile_size: usize, mode: ProcessingMode) -> Self {
        Self {
            tile_size: tile_size.max(1),
            mode,
        }
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Apply `f` to every tile of a `rows × cols` raster.
    ///
    /// Results come back in tile order regardless of the mode. The cancel
    /// flag is checked before each tile starts; if it is set at any point,
    /// every result is dropped and `Err(Cancelled)` is returned.
    pub fn map_tiles<R, F>(
        &self,
        rows: usize,
        cols: usize,
        cancel: &CancelFlag,
        f: F,
    ) -> Result<Vec<(Tile, R)>, Cancelled>
    where
        R: Send,
        F: Fn(&Tile) -> R + Sync + Send,
    {
        let tiles: Vec<Tile> = TileIterator::square(rows, cols, self.tile_size).collect();

        let results = self.mode.par_map(tiles, |tile| {
            if cancel.is_cancelled() {
                return None;
            }
            let out = f(&tile);
            Some((tile, out))
        });

        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        results.into_iter().collect::<Option<Vec<_>>>().ok_or(Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_iterator() {
        let tiles: Vec<_> = TileIterator::square(100, 100, 32).collect();
        assert_eq!(tiles.len(), 16);
        assert_eq!(tiles[0], Tile::new(0, 0, 32, 32));
        assert_eq!(tiles[3], Tile::new(0, 96, 32, 4));
        assert_eq!(tiles[15], Tile::new(96, 96, 4, 4));
    }

    #[test]
    fn test_tile_coverage() {
        let rows = 37;
        let cols = 53;
        let mut covered = vec![vec![0u8; cols]; rows];

        for tile in TileIterator::new(rows, cols, 8, 5) {
            for r in 0..tile.rows {
                for c in 0..tile.cols {
                    let (sr, sc) = tile.to_source_coords(r, c);
                    covered[sr][sc] += 1;
                }
            }
        }

        for r in 0..rows {
            for c in 0..cols {
                assert_eq!(covered[r][c], 1, "Cell ({}, {}) covered {} times", r, c, covered[r][c]);
            }
        }
    }

    #[test]
    fn empty_raster_has_no_tiles() {
        assert_eq!(TileIterator::square(0, 10, 4).count(), 0);
        assert_eq!(TileIterator::square(10, 0, 4).count(), 0);
    }

    #[test]
    fn map_tiles_keeps_tile_order() {
        let proc = TiledProcessor::new(4, ProcessingMode::Parallel);
        let out = proc
            .map_tiles(10, 10, &CancelFlag::new(), |t| t.len())
            .unwrap();
        let total: usize = out.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 100);
        let offsets: Vec<_> = out.iter().map(|(t, _)| (t.row_offset, t.col_offset)).collect();
        let expected: Vec<_> = TileIterator::square(10, 10, 4)
            .map(|t| (t.row_offset, t.col_offset))
            .collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn map_tiles_honours_cancel() {
        let cancel = CancelFlag::new();
        let proc = TiledProcessor::new(2, ProcessingMode::Sequential);
        let result = proc.map_tiles(8, 8, &cancel, |t| {
            if t.row_offset == 2 {
                cancel.cancel();
            }
            t.len()
        });
        assert_eq!(result.unwrap_err(), Cancelled);
    }
}
