//! Per-mission band definitions
//!
//! Each mission numbers its bands independently; a band id is only
//! meaningful together with its [`Mission`].

use glaciermap_core::{BandId, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Satellite sensor platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mission {
    Sentinel2,
    Landsat8,
    Landsat7,
}

impl Mission {
    pub const ALL: [Mission; 3] = [Mission::Sentinel2, Mission::Landsat8, Mission::Landsat7];

    pub fn name(&self) -> &'static str {
        match self {
            Mission::Sentinel2 => "Sentinel-2",
            Mission::Landsat8 => "Landsat 8",
            Mission::Landsat7 => "Landsat 7",
        }
    }

    /// Band definition table of this mission
    pub fn bands(&self) -> BandDefinitionTable {
        BandDefinitionTable::for_mission(*self)
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "sentinel2" | "s2" => Ok(Mission::Sentinel2),
            "landsat8" | "l8" => Ok(Mission::Landsat8),
            "landsat7" | "l7" => Ok(Mission::Landsat7),
            _ => Err(Error::InvalidParameter {
                name: "mission",
                value: s.to_string(),
                reason: "expected sentinel2, landsat8 or landsat7".into(),
            }),
        }
    }
}

/// Half-open wavelength interval `[min_nm, max_nm)` integrated by one band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandDefinition {
    pub band: BandId,
    pub min_nm: u32,
    pub max_nm: u32,
}

impl BandDefinition {
    pub const fn new(band: u8, min_nm: u32, max_nm: u32) -> Self {
        Self {
            band: BandId(band),
            min_nm,
            max_nm,
        }
    }

    /// Interval width in nm; zero for degenerate intervals
    pub fn width(&self) -> u32 {
        self.max_nm.saturating_sub(self.min_nm)
    }
}

// Sentinel-2 MSI. Band 8 stands for the narrow NIR band 8a.
const SENTINEL_2: &[BandDefinition] = &[
    BandDefinition::new(1, 433, 453),
    BandDefinition::new(2, 457, 522),
    BandDefinition::new(3, 542, 578),
    BandDefinition::new(4, 650, 680),
    BandDefinition::new(5, 697, 712),
    BandDefinition::new(6, 732, 747),
    BandDefinition::new(7, 776, 796),
    BandDefinition::new(8, 855, 875),
    BandDefinition::new(9, 935, 955),
    BandDefinition::new(10, 1365, 1385),
    BandDefinition::new(11, 1565, 1655),
    BandDefinition::new(12, 2100, 2280),
];

// Landsat 8 OLI (band 8 is panchromatic, 9 cirrus)
const LANDSAT_8: &[BandDefinition] = &[
    BandDefinition::new(1, 430, 450),
    BandDefinition::new(2, 450, 510),
    BandDefinition::new(3, 530, 590),
    BandDefinition::new(4, 640, 670),
    BandDefinition::new(5, 850, 880),
    BandDefinition::new(6, 1570, 1650),
    BandDefinition::new(7, 2110, 2290),
    BandDefinition::new(8, 500, 680),
    BandDefinition::new(9, 1360, 1380),
];

// Landsat 7 ETM+. Band 6 is thermal and has no reflectance counterpart.
const LANDSAT_7: &[BandDefinition] = &[
    BandDefinition::new(1, 450, 520),
    BandDefinition::new(2, 520, 600),
    BandDefinition::new(3, 630, 690),
    BandDefinition::new(4, 770, 900),
    BandDefinition::new(5, 1550, 1750),
    BandDefinition::new(7, 2064, 2354),
    BandDefinition::new(8, 520, 900),
];

/// Static band table of one mission, sorted by band id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandDefinitionTable {
    mission: Mission,
    bands: &'static [BandDefinition],
}

impl BandDefinitionTable {
    pub fn for_mission(mission: Mission) -> Self {
        let bands = match mission {
            Mission::Sentinel2 => SENTINEL_2,
            Mission::Landsat8 => LANDSAT_8,
            Mission::Landsat7 => LANDSAT_7,
        };
        Self { mission, bands }
    }

    pub fn mission(&self) -> Mission {
        self.mission
    }

    pub fn get(&self, band: BandId) -> Option<&BandDefinition> {
        self.bands.iter().find(|b| b.band == band)
    }

    /// Definitions of `bands`, in the order given.
    ///
    /// Used to train on the bands a scene actually provides. Fails when a
    /// band is not part of this mission.
    pub fn select(&self, bands: &[BandId]) -> Result<Vec<BandDefinition>> {
        bands
            .iter()
            .map(|band| {
                self.get(*band).copied().ok_or_else(|| Error::InvalidParameter {
                    name: "bands",
                    value: band.to_string(),
                    reason: format!("not a {} band", self.mission),
                })
            })
            .collect()
    }

    /// Band ids in ascending order
    pub fn band_ids(&self) -> Vec<BandId> {
        self.bands.iter().map(|b| b.band).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BandDefinition> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
