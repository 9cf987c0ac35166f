//! Field-measured reflectance spectra and their class assignment

use crate::class::SurfaceClass;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

/// Default first wavelength (nm) of field spectrometer tables.
pub const DEFAULT_BASE_WAVELENGTH: u32 = 350;

/// Reflectance table indexed by wavelength at 1 nm resolution.
///
/// Row `r` holds the reflectance at `base_wavelength + r` nm, column `c`
/// belongs to the sample named `sample_ids[c]`.
#[derive(Debug, Clone)]
pub struct SpectralTable {
    base_wavelength: u32,
    sample_ids: Vec<String>,
    index: HashMap<String, usize>,
    data: Array2<f64>,
}

impl SpectralTable {
    /// Create a table from a (wavelength × sample) matrix.
    pub fn new(base_wavelength: u32, sample_ids: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if data.ncols() != sample_ids.len() {
            return Err(Error::InvalidDimensions {
                width: sample_ids.len(),
                height: data.nrows(),
            });
        }
        let span_fits = u32::try_from(data.nrows())
            .ok()
            .and_then(|rows| base_wavelength.checked_add(rows))
            .is_some();
        if !span_fits {
            return Err(Error::InvalidParameter {
                name: "base_wavelength",
                value: base_wavelength.to_string(),
                reason: format!("{} rows run past the largest wavelength", data.nrows()),
            });
        }
        let mut index = HashMap::with_capacity(sample_ids.len());
        for (col, id) in sample_ids.iter().enumerate() {
            if index.insert(id.clone(), col).is_some() {
                return Err(Error::InvalidParameter {
                    name: "sample_ids",
                    value: id.clone(),
                    reason: "duplicate sample column".into(),
                });
            }
        }
        Ok(Self {
            base_wavelength,
            sample_ids,
            index,
            data,
        })
    }

    /// Wavelength (nm) of the first row
    pub fn base_wavelength(&self) -> u32 {
        self.base_wavelength
    }

    /// Wavelength (nm) one past the last row
    pub fn end_wavelength(&self) -> u32 {
        // fits: checked in `new`
        self.base_wavelength + self.data.nrows() as u32
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of wavelength rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Column index of a sample
    pub fn column(&self, sample_id: &str) -> Option<usize> {
        self.index.get(sample_id).copied()
    }

    /// Row range covering the half-open wavelength interval `[min_nm, max_nm)`.
    ///
    /// Returns `None` when the interval starts before the table or ends
    /// after it.
    pub fn row_range(&self, min_nm: u32, max_nm: u32) -> Option<Range<usize>> {
        if min_nm < self.base_wavelength || max_nm > self.end_wavelength() || min_nm > max_nm {
            return None;
        }
        let start = (min_nm - self.base_wavelength) as usize;
        let end = (max_nm - self.base_wavelength) as usize;
        Some(start..end)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

/// Assignment of spectral table samples to surface classes.
///
/// Sample sets are expected to be disjoint but this is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMembership {
    classes: BTreeMap<SurfaceClass, Vec<String>>,
}

impl ClassMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the samples of a class.
    pub fn insert<I, S>(&mut self, class: SurfaceClass, samples: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .insert(class, samples.into_iter().map(Into::into).collect());
    }

    pub fn with<I, S>(mut self, class: SurfaceClass, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(class, samples);
        self
    }

    pub fn samples(&self, class: SurfaceClass) -> Option<&[String]> {
        self.classes.get(&class).map(Vec::as_slice)
    }

    /// Classes in priority order with their sample ids
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceClass, &[String])> {
        self.classes.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Sample lists of the 2016 Greenland ice sheet field campaign
    /// (hemispherical-conical reflectance measurements).
    pub fn field_campaign_2016() -> Self {
        Self::new()
            .with(SurfaceClass::CleanIce, CLEAN_ICE_SITES.iter().copied())
            .with(SurfaceClass::Snow, SNOW_SITES.iter().copied())
            .with(SurfaceClass::LowAlgae, LOW_ALGAE_SITES.iter().copied())
            .with(SurfaceClass::HighAlgae, HIGH_ALGAE_SITES.iter().copied())
            .with(SurfaceClass::Water, WATER_SITES.iter().copied())
            .with(SurfaceClass::Cryoconite, CRYOCONITE_SITES.iter().copied())
    }
}

const HIGH_ALGAE_SITES: &[&str] = &[
    "13_7_SB2", "13_7_SB4", "14_7_S5", "14_7_SB1", "14_7_SB5", "14_7_SB10",
    "15_7_SB3", "21_7_SB1", "21_7_SB7", "22_7_SB4", "22_7_SB5", "22_7_S3", "22_7_S5",
    "23_7_SB3", "23_7_SB5", "23_7_S3", "23_7_SB4", "24_7_SB2", "HA_1", "HA_2", "HA_3",
    "HA_4", "HA_5", "HA_6", "HA_7", "HA_8", "HA_10", "HA_11", "HA_12", "HA_13", "HA_14",
    "HA_15", "HA_16", "HA_17", "HA_18", "HA_19", "HA_20", "HA_21", "HA_22", "HA_24",
    "HA_25", "HA_26", "HA_27", "HA_28", "HA_29", "HA_30", "HA_31", "13_7_S2", "14_7_SB9",
    "MA_11", "MA_14", "MA_15", "MA_17", "21_7_SB2", "22_7_SB1", "MA_4", "MA_7", "MA_18",
    "27_7_16_SITE3_WMELON1", "27_7_16_SITE3_WMELON3", "27_7_16_SITE2_ALG1",
    "27_7_16_SITE2_ALG2", "27_7_16_SITE2_ALG3", "27_7_16_SITE2_ICE3", "27_7_16_SITE2_ICE5",
    "27_7_16_SITE3_ALG4", "5_8_16_site2_ice7", "5_8_16_site3_ice2", "5_8_16_site3_ice3",
    "5_8_16_site3_ice5", "5_8_16_site3_ice6", "5_8_16_site3_ice7", "5_8_16_site3_ice8",
    "5_8_16_site3_ice9",
];

const LOW_ALGAE_SITES: &[&str] = &[
    "14_7_S2", "14_7_S3", "14_7_SB2", "14_7_SB3", "14_7_SB7", "15_7_S2",
    "15_7_SB4", "20_7_SB1", "20_7_SB3", "21_7_S1", "21_7_S5", "21_7_SB4", "22_7_SB2",
    "22_7_SB3", "22_7_S1", "23_7_S1", "23_7_S2", "24_7_S2", "MA_1", "MA_2", "MA_3",
    "MA_5", "MA_6", "MA_8", "MA_9", "MA_10", "MA_12", "MA_13", "MA_16", "MA_19",
    "13_7_S1", "13_7_S3", "14_7_S1", "15_7_S1", "15_7_SB2", "20_7_SB2", "21_7_SB5",
    "21_7_SB8", "25_7_S3", "5_8_16_site2_ice10", "5_8_16_site2_ice5",
    "5_8_16_site2_ice9", "27_7_16_SITE3_WHITE3",
];

const CLEAN_ICE_SITES: &[&str] = &[
    "21_7_S4", "13_7_SB3", "15_7_S4", "15_7_SB1", "15_7_SB5", "21_7_S2",
    "21_7_SB3", "22_7_S2", "22_7_S4", "23_7_SB1", "23_7_SB2", "23_7_S4",
    "WI_1", "WI_2", "WI_4", "WI_5", "WI_6", "WI_7", "WI_9", "WI_10", "WI_11",
    "WI_12", "WI_13", "27_7_16_SITE3_WHITE1", "27_7_16_SITE3_WHITE2",
    "27_7_16_SITE2_ICE2", "27_7_16_SITE2_ICE4", "27_7_16_SITE2_ICE6",
    "5_8_16_site2_ice1", "5_8_16_site2_ice2", "5_8_16_site2_ice3",
    "5_8_16_site2_ice4", "5_8_16_site2_ice6", "5_8_16_site2_ice8",
    "5_8_16_site3_ice1", "5_8_16_site3_ice4",
];

const CRYOCONITE_SITES: &[&str] = &[
    "DISP1", "DISP2", "DISP3", "DISP4", "DISP5", "DISP6", "DISP7", "DISP8",
    "DISP9", "DISP10", "DISP11", "DISP12", "DISP13", "DISP14", "27_7_16_SITE3_DISP1",
    "27_7_16_SITE3_DISP3",
];

const WATER_SITES: &[&str] = &["21_7_SB5", "21_7_SB8", "WAT_1", "WAT_3", "WAT_6"];

const SNOW_SITES: &[&str] = &[
    "14_7_S4", "14_7_SB6", "14_7_SB8", "17_7_SB2", "SNICAR100", "SNICAR200",
    "SNICAR300", "SNICAR400", "SNICAR500", "SNICAR600", "SNICAR700", "SNICAR800",
    "SNICAR900", "SNICAR1000", "27_7_16_KANU_", "27_7_16_SITE2_1",
    "5_8_16_site1_snow10", "5_8_16_site1_snow2", "5_8_16_site1_snow3",
    "5_8_16_site1_snow4", "5_8_16_site1_snow6", "5_8_16_site1_snow7",
    "5_8_16_site1_snow9",
];

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> SpectralTable {
        SpectralTable::new(
            350,
            vec!["a".into(), "b".into()],
            array![[1.0, 3.0], [2.0, 4.0], [3.0, 5.0], [4.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn row_range_offsets_by_base() {
        let t = table();
        assert_eq!(t.row_range(350, 352), Some(0..2));
        assert_eq!(t.row_range(352, 354), Some(2..4));
        assert_eq!(t.row_range(353, 353), Some(3..3));
        assert_eq!(t.row_range(349, 352), None);
        assert_eq!(t.row_range(352, 355), None);
        assert_eq!(t.end_wavelength(), 354);
    }

    #[test]
    fn rejects_span_past_largest_wavelength() {
        let err = SpectralTable::new(u32::MAX - 1, vec!["a".into()], Array2::zeros((2, 1)));
        assert!(matches!(err, Err(Error::InvalidParameter { name: "base_wavelength", .. })));
        let t = SpectralTable::new(u32::MAX - 2, vec!["a".into()], Array2::zeros((2, 1))).unwrap();
        assert_eq!(t.end_wavelength(), u32::MAX);
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = SpectralTable::new(350, vec!["a".into(), "a".into()], Array2::zeros((2, 2)));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_column_count_mismatch() {
        assert!(SpectralTable::new(350, vec!["a".into()], Array2::zeros((2, 2))).is_err());
    }

    #[test]
    fn field_campaign_covers_all_classes() {
        let m = ClassMembership::field_campaign_2016();
        assert_eq!(m.len(), 6);
        assert_eq!(m.samples(SurfaceClass::Water).unwrap().len(), 5);
        assert_eq!(m.samples(SurfaceClass::Cryoconite).unwrap().len(), 16);
    }

    #[test]
    fn membership_json_uses_class_keys() {
        let m = ClassMembership::new().with(SurfaceClass::Snow, ["s1", "s2"]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"snow":["s1","s2"]}"#);
        let back: ClassMembership = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
