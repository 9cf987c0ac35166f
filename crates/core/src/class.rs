//! Glacier surface classes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Surface type assigned to a classified pixel.
///
/// The declaration order is the tie-break priority: when two classes are
/// equally close to a pixel, the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceClass {
    CleanIce,
    Snow,
    LowAlgae,
    HighAlgae,
    Water,
    Cryoconite,
}

impl SurfaceClass {
    /// All classes in priority order.
    pub const ALL: [SurfaceClass; 6] = [
        Self::CleanIce,
        Self::Snow,
        Self::LowAlgae,
        Self::HighAlgae,
        Self::Water,
        Self::Cryoconite,
    ];

    /// Label value written to class grids (1..=6). 0 is reserved for no-data.
    pub const fn code(self) -> u8 {
        match self {
            Self::CleanIce => 1,
            Self::Snow => 2,
            Self::LowAlgae => 3,
            Self::HighAlgae => 4,
            Self::Water => 5,
            Self::Cryoconite => 6,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CleanIce => "Clean ice",
            Self::Snow => "Snow",
            Self::LowAlgae => "Low algae",
            Self::HighAlgae => "High algae",
            Self::Water => "Water",
            Self::Cryoconite => "Cryoconite",
        }
    }

    /// Identifier used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CleanIce => "clean_ice",
            Self::Snow => "snow",
            Self::LowAlgae => "low_algae",
            Self::HighAlgae => "high_algae",
            Self::Water => "water",
            Self::Cryoconite => "cryoconite",
        }
    }
}

impl fmt::Display for SurfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SurfaceClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "clean_ice" | "ice" | "ci" => Ok(Self::CleanIce),
            "snow" | "sn" => Ok(Self::Snow),
            "low_algae" | "la" => Ok(Self::LowAlgae),
            "high_algae" | "ha" => Ok(Self::HighAlgae),
            "water" | "wat" => Ok(Self::Water),
            "cryoconite" | "cc" => Ok(Self::Cryoconite),
            _ => Err(Error::InvalidParameter {
                name: "surface_class",
                value: s.to_string(),
                reason: "expected one of clean_ice, snow, low_algae, high_algae, water, cryoconite".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_follows_declaration() {
        let mut shuffled = vec![
            SurfaceClass::Water,
            SurfaceClass::CleanIce,
            SurfaceClass::Cryoconite,
            SurfaceClass::Snow,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                SurfaceClass::CleanIce,
                SurfaceClass::Snow,
                SurfaceClass::Water,
                SurfaceClass::Cryoconite
            ]
        );
    }

    #[test]
    fn codes_round_trip_and_skip_zero() {
        for class in SurfaceClass::ALL {
            assert_ne!(class.code(), 0);
            assert_eq!(SurfaceClass::from_code(class.code()), Some(class));
        }
        assert_eq!(SurfaceClass::from_code(0), None);
    }

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("HA".parse::<SurfaceClass>().unwrap(), SurfaceClass::HighAlgae);
        assert_eq!("clean-ice".parse::<SurfaceClass>().unwrap(), SurfaceClass::CleanIce);
        assert!("rock".parse::<SurfaceClass>().is_err());
    }
}
