//! Fixed colors for surface classes

use crate::scheme::Rgb;
use glaciermap_core::SurfaceClass;
use serde::{Deserialize, Serialize};

/// Display color per surface class plus a color for no-data pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPalette {
    colors: [Rgb; 6],
    background: Rgb,
}

impl ClassPalette {
    /// Light sky blue ice, white snow, green algae, royal blue water,
    /// black cryoconite and light grey outside the ice area.
    pub const GLACIER: ClassPalette = ClassPalette {
        colors: [
            Rgb::new(135, 206, 250),
            Rgb::new(255, 255, 255),
            Rgb::new(60, 179, 113),
            Rgb::new(0, 100, 0),
            Rgb::new(65, 105, 225),
            Rgb::new(0, 0, 0),
        ],
        background: Rgb::new(211, 211, 211),
    };

    /// Color of a class
    pub fn color(&self, class: SurfaceClass) -> Rgb {
        self.colors[usize::from(class.code() - 1)]
    }

    /// Color used for background and no-data pixels
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Color for a label value: 0 or unknown labels map to the background.
    pub fn color_for_code(&self, code: u8) -> Rgb {
        SurfaceClass::from_code(code).map_or(self.background, |c| self.color(c))
    }

    pub fn with_color(mut self, class: SurfaceClass, color: Rgb) -> Self {
        self.colors[usize::from(class.code() - 1)] = color;
        self
    }

    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = color;
        self
    }
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self::GLACIER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glacier_colors() {
        let p = ClassPalette::default();
        assert_eq!(p.color(SurfaceClass::CleanIce), Rgb::new(135, 206, 250));
        assert_eq!(p.color(SurfaceClass::HighAlgae), Rgb::new(0, 100, 0));
        assert_eq!(p.color(SurfaceClass::Cryoconite), Rgb::new(0, 0, 0));
        assert_eq!(p.background(), Rgb::new(211, 211, 211));
    }

    #[test]
    fn codes_fall_back_to_background() {
        let p = ClassPalette::default();
        assert_eq!(p.color_for_code(0), p.background());
        assert_eq!(p.color_for_code(42), p.background());
        assert_eq!(p.color_for_code(2), Rgb::new(255, 255, 255));
    }

    #[test]
    fn overrides() {
        let p = ClassPalette::default()
            .with_color(SurfaceClass::Water, Rgb::new(1, 2, 3))
            .with_background(Rgb::new(9, 9, 9));
        assert_eq!(p.color(SurfaceClass::Water), Rgb::new(1, 2, 3));
        assert_eq!(p.color_for_code(0), Rgb::new(9, 9, 9));
    }
}
