//! Reflectance centroids
//!
//! A [`CentroidSet`] is built once per mission and read-only afterwards.
//! Construction guarantees that every centroid covers the same bands and
//! holds only finite values, so the classifier never compares against an
//! undefined mean.

use super::bands::Mission;
use glaciermap_core::{BandId, Error, Result, SurfaceClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean reflectance of one surface class per band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub class: SurfaceClass,
    pub values: BTreeMap<BandId, f64>,
}

impl Centroid {
    pub fn new(class: SurfaceClass, values: BTreeMap<BandId, f64>) -> Self {
        Self { class, values }
    }

    pub fn band_ids(&self) -> Vec<BandId> {
        self.values.keys().copied().collect()
    }

    /// Values in ascending band order
    pub fn vector(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }
}

/// Immutable set of class centroids sharing one band set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentroidSet {
    mission: Option<Mission>,
    bands: Vec<BandId>,
    centroids: Vec<Centroid>,
}

impl CentroidSet {
    /// Validate and assemble centroids.
    ///
    /// Centroids are stored in class priority order. Fails when the list is
    /// empty, a class appears twice, band sets differ between centroids, or
    /// any value is not finite.
    pub fn new(mission: Option<Mission>, mut centroids: Vec<Centroid>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(Error::NoCentroids);
        }
        centroids.sort_by_key(|c| c.class);
        if let Some(pair) = centroids.windows(2).find(|w| w[0].class == w[1].class) {
            return Err(Error::InvalidParameter {
                name: "centroids",
                value: pair[0].class.key().to_string(),
                reason: "class appears more than once".into(),
            });
        }

        let bands = centroids[0].band_ids();
        if bands.is_empty() {
            return Err(Error::InvalidParameter {
                name: "centroids",
                value: centroids[0].class.key().to_string(),
                reason: "centroid has no bands".into(),
            });
        }
        for c in &centroids {
            let ids = c.band_ids();
            if ids != bands {
                return Err(Error::InvalidParameter {
                    name: "centroids",
                    value: c.class.key().to_string(),
                    reason: format!("bands {:?} differ from {:?}", ids, bands),
                });
            }
            if let Some((band, value)) = c.values.iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::NonFiniteCentroid {
                    class: c.class.key().to_string(),
                    band: band.get(),
                    value: *value,
                });
            }
        }

        Ok(Self {
            mission,
            bands,
            centroids,
        })
    }

    /// Build from plain vectors over `bands`, mainly for hand-written signatures.
    pub fn from_vectors<I>(mission: Option<Mission>, bands: &[BandId], vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (SurfaceClass, Vec<f64>)>,
    {
        let centroids = vectors
            .into_iter()
            .map(|(class, values)| {
                if values.len() != bands.len() {
                    return Err(Error::InvalidParameter {
                        name: "centroid",
                        value: class.key().to_string(),
                        reason: format!("{} values for {} bands", values.len(), bands.len()),
                    });
                }
                Ok(Centroid::new(class, bands.iter().copied().zip(values).collect()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(mission, centroids)
    }

    pub fn mission(&self) -> Option<Mission> {
        self.mission
    }

    /// Shared band ids in ascending order
    pub fn band_ids(&self) -> &[BandId] {
        &self.bands
    }

    /// Classes present, in priority order
    pub fn classes(&self) -> Vec<SurfaceClass> {
        self.centroids.iter().map(|c| c.class).collect()
    }

    pub fn get(&self, class: SurfaceClass) -> Option<&Centroid> {
        self.centroids.iter().find(|c| c.class == class)
    }

    /// Centroids in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Centroid> {
        self.centroids.iter()
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Centroid vectors multiplied by `scale`, in priority order
    pub fn scaled_vectors(&self, scale: ReflectanceScale) -> Vec<(SurfaceClass, Vec<f64>)> {
        self.centroids
            .iter()
            .map(|c| (c.class, c.values.values().map(|v| v * scale.get()).collect()))
            .collect()
    }
}

/// Multiplier converting training reflectance into raster reflectance units.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ReflectanceScale(f64);

impl ReflectanceScale {
    pub const UNIT: ReflectanceScale = ReflectanceScale(1.0);

    pub fn new(k: f64) -> Result<Self> {
        if !k.is_finite() || k <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "scale",
                value: k.to_string(),
                reason: "must be finite and greater than zero".into(),
            });
        }
        Ok(Self(k))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Default scale for a mission's normalised band rasters
    pub fn for_mission(mission: Mission) -> Self {
        match mission {
            Mission::Sentinel2 | Mission::Landsat8 => Self(1.0),
            Mission::Landsat7 => Self(0.9),
        }
    }
}

impl Default for ReflectanceScale {
    fn default() -> Self {
        Self::UNIT
    }
}

impl TryFrom<f64> for ReflectanceScale {
    type Error = Error;

    fn try_from(k: f64) -> Result<Self> {
        Self::new(k)
    }
}

impl From<ReflectanceScale> for f64 {
    fn from(s: ReflectanceScale) -> f64 {
        s.0
    }
}
