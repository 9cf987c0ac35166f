//! # glaciermap colormap
//!
//! Surface class colors and label-grid rendering.
//!
//! [`ClassPalette`] fixes one color per [`SurfaceClass`](glaciermap_core::SurfaceClass)
//! plus a background color for pixels outside the valid footprint.
//! [`labels_to_rgb`] turns a class label grid into an RGB buffer that an
//! image encoder can consume directly.

mod palette;
mod render;
mod scheme;

pub use palette::ClassPalette;
pub use render::labels_to_rgb;
pub use scheme::Rgb;
