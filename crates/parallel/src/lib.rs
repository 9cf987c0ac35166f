//! # glaciermap parallel
//!
//! Parallel processing strategies for per-pixel raster work.
//!
//! This crate provides:
//! - `ProcessingMode`: sequential, all-core or fixed-size-pool execution
//! - `TileIterator` / `TiledProcessor`: non-overlapping tiling with
//!   results merged in tile order
//! - `CancelFlag`: cooperative cancellation between tiles

pub mod cancel;
pub mod strategy;
pub mod tiled;

pub use cancel::{CancelFlag, Cancelled};
pub use strategy::{ParallelStrategy, ProcessingMode};
pub use tiled::{Tile, TileIterator, TiledProcessor};
