//! Label-grid-to-RGB rendering.

use crate::palette::ClassPalette;
use glaciermap_core::raster::Raster;

/// Convert a class label grid to an RGB pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 3` in row-major order.
/// Label 0 (no-data) and unknown labels use the palette background.
pub fn labels_to_rgb(labels: &Raster<u8>, palette: &ClassPalette) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(labels.len() * 3);
    for &code in labels.data().iter() {
        rgb.extend_from_slice(&palette.color_for_code(code).to_array());
    }
    rgb
}
