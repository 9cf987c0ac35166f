//! Spectral table and class membership readers
//!
//! Spectral tables are CSV files with one column per field sample and one
//! row per wavelength at 1 nm resolution. An optional leading `wavelength`
//! column fixes the base wavelength; otherwise the caller supplies it.

use crate::error::{Error, Result};
use crate::spectral::{ClassMembership, SpectralTable};
use ndarray::Array2;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a spectral table from a CSV file.
///
/// `base_wavelength` is used when the file has no `wavelength` column.
pub fn read_spectral_table<P: AsRef<Path>>(path: P, base_wavelength: u32) -> Result<SpectralTable> {
    let file = File::open(path.as_ref())?;
    read_spectral_table_from_reader(file, base_wavelength)
}

/// Read a spectral table from any CSV source.
pub fn read_spectral_table_from_reader<R: Read>(reader: R, base_wavelength: u32) -> Result<SpectralTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let has_wavelength = headers
        .get(0)
        .is_some_and(|h| h.eq_ignore_ascii_case("wavelength") || h.eq_ignore_ascii_case("wavelength_nm"));
    let skip = usize::from(has_wavelength);
    let sample_ids: Vec<String> = headers.iter().skip(skip).map(str::to_string).collect();
    if sample_ids.is_empty() {
        return Err(parse_error("spectral table has no sample columns"));
    }

    let mut values = Vec::new();
    let mut rows = 0usize;
    let mut base = base_wavelength;

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != sample_ids.len() + skip {
            return Err(parse_error(format!(
                "row {} has {} fields, expected {}",
                line + 1,
                record.len(),
                sample_ids.len() + skip
            )));
        }
        if has_wavelength {
            let wl = parse_wavelength(&record[0], line)?;
            if rows == 0 {
                base = wl;
            } else if Some(wl) != u32::try_from(rows).ok().and_then(|r| base.checked_add(r)) {
                return Err(parse_error(format!(
                    "row {}: wavelength {} breaks the 1 nm sequence starting at {}",
                    line + 1,
                    wl,
                    base
                )));
            }
        }
        for field in record.iter().skip(skip) {
            let v: f64 = field.parse().map_err(|_| {
                parse_error(format!("row {}: '{}' is not a number", line + 1, field))
            })?;
            values.push(v);
        }
        rows += 1;
    }

    let data = Array2::from_shape_vec((rows, sample_ids.len()), values)
        .map_err(|e| Error::Other(e.to_string()))?;
    SpectralTable::new(base, sample_ids, data)
}

fn parse_wavelength(field: &str, line: usize) -> Result<u32> {
    let wl: f64 = field
        .parse()
        .map_err(|_| parse_error(format!("row {}: bad wavelength '{}'", line + 1, field)))?;
    if wl < 0.0 || wl.fract() != 0.0 || wl > u32::MAX as f64 {
        return Err(parse_error(format!(
            "row {}: wavelength {} is not a whole number of nm",
            line + 1,
            field
        )));
    }
    Ok(wl as u32)
}

fn parse_error(message: impl Into<String>) -> Error {
    Error::Parse {
        source_name: "spectral table".into(),
        message: message.into(),
    }
}

/// Read a class membership table from a JSON file.
///
/// The file maps class keys to sample id lists:
/// `{"clean_ice": ["WI_1", ...], "snow": [...]}`.
pub fn read_membership<P: AsRef<Path>>(path: P) -> Result<ClassMembership> {
    let file = File::open(path.as_ref())?;
    read_membership_from_reader(file)
}

pub fn read_membership_from_reader<R: Read>(reader: R) -> Result<ClassMembership> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::SurfaceClass;

    #[test]
    fn reads_plain_table_with_given_base() {
        let csv = "a,b\n1.0,3.0\n2.0,4.0\n3.0,5.0\n";
        let t = read_spectral_table_from_reader(csv.as_bytes(), 350).unwrap();
        assert_eq!(t.base_wavelength(), 350);
        assert_eq!(t.rows(), 3);
        assert_eq!(t.sample_ids(), &["a".to_string(), "b".to_string()]);
        assert_eq!(t.view()[[2, 1]], 5.0);
    }

    #[test]
    fn wavelength_column_sets_base() {
        let csv = "wavelength,a\n400,0.1\n401,0.2\n";
        let t = read_spectral_table_from_reader(csv.as_bytes(), 350).unwrap();
        assert_eq!(t.base_wavelength(), 400);
        assert_eq!(t.sample_ids().len(), 1);
    }

    #[test]
    fn wavelength_gap_is_rejected() {
        let csv = "wavelength,a\n400,0.1\n402,0.2\n";
        let err = read_spectral_table_from_reader(csv.as_bytes(), 350).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn wavelength_near_u32_max_is_rejected() {
        let csv = format!("wavelength,a\n{},0.1\n{},0.2\n", u32::MAX, u32::MAX);
        let err = read_spectral_table_from_reader(csv.as_bytes(), 350).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        // a single row at the maximum has no representable end wavelength
        let csv = format!("wavelength,a\n{},0.1\n", u32::MAX);
        assert!(read_spectral_table_from_reader(csv.as_bytes(), 350).is_err());
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let csv = "a\nabc\n";
        assert!(read_spectral_table_from_reader(csv.as_bytes(), 350).is_err());
    }

    #[test]
    fn membership_from_json() {
        let json = r#"{"high_algae": ["HA_1", "HA_2"], "water": ["WAT_1"]}"#;
        let m = read_membership_from_reader(json.as_bytes()).unwrap();
        assert_eq!(m.samples(SurfaceClass::HighAlgae).unwrap().len(), 2);
        assert!(m.samples(SurfaceClass::Snow).is_none());
    }

    #[test]
    fn membership_rejects_unknown_class() {
        let json = r#"{"rock": ["R1"]}"#;
        assert!(read_membership_from_reader(json.as_bytes()).is_err());
    }
}
