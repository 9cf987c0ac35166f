//! Centroid construction from field spectra
//!
//! For every class the selected sample columns are averaged over every
//! wavelength row of each band interval. Band intervals are converted to
//! row ranges by subtracting the table's base wavelength, so with a base of
//! 350 nm the band `[650, 680)` covers rows `[300, 330)`.

use super::bands::{BandDefinition, BandDefinitionTable, Mission};
use super::centroid::{Centroid, CentroidSet};
use glaciermap_core::{ClassMembership, Error, Result, SpectralTable, SurfaceClass};
use std::collections::BTreeMap;
use std::ops::Range;

/// Build one centroid per class of `membership` for the bands of `bands`.
///
/// Every band interval must be non-empty and lie inside the table, every
/// listed class needs at least one sample, and every sample must be a
/// column of the table. The mean is taken jointly over all selected rows
/// and columns, with columns visited in table order so that the listing
/// order of samples never changes the result.
pub fn build_centroids(
    table: &SpectralTable,
    membership: &ClassMembership,
    bands: &BandDefinitionTable,
) -> Result<CentroidSet> {
    let defs: Vec<BandDefinition> = bands.iter().copied().collect();
    build_centroids_with(table, membership, Some(bands.mission()), &defs)
}

/// [`build_centroids`] for an arbitrary list of band intervals
pub fn build_centroids_with(
    table: &SpectralTable,
    membership: &ClassMembership,
    mission: Option<Mission>,
    bands: &[BandDefinition],
) -> Result<CentroidSet> {
    if membership.is_empty() {
        return Err(Error::NoCentroids);
    }

    let row_ranges = bands
        .iter()
        .map(|def| band_rows(table, def).map(|rows| (def.band, rows)))
        .collect::<Result<Vec<_>>>()?;

    let mut centroids = Vec::with_capacity(membership.len());
    for (class, samples) in membership.iter() {
        let columns = sample_columns(table, class, samples)?;
        let mut values = BTreeMap::new();
        for (band, rows) in &row_ranges {
            let mean = block_mean(table, rows.clone(), &columns);
            if !mean.is_finite() {
                return Err(Error::NonFiniteCentroid {
                    class: class.key().to_string(),
                    band: band.get(),
                    value: mean,
                });
            }
            values.insert(*band, mean);
        }
        centroids.push(Centroid::new(class, values));
    }

    CentroidSet::new(mission, centroids)
}

/// Row range of the table covered by a band interval
pub fn band_rows(table: &SpectralTable, def: &BandDefinition) -> Result<Range<usize>> {
    if def.width() == 0 {
        return Err(Error::EmptyBandInterval {
            band: def.band.get(),
            min_nm: def.min_nm,
            max_nm: def.max_nm,
        });
    }
    table
        .row_range(def.min_nm, def.max_nm)
        .ok_or(Error::BandOutOfRange {
            band: def.band.get(),
            min_nm: def.min_nm,
            max_nm: def.max_nm,
            first_nm: table.base_wavelength(),
            end_nm: table.end_wavelength(),
        })
}

/// Resolve sample ids to distinct column indices in ascending order
fn sample_columns(table: &SpectralTable, class: SurfaceClass, samples: &[String]) -> Result<Vec<usize>> {
    if samples.is_empty() {
        return Err(Error::EmptyClass {
            class: class.key().to_string(),
        });
    }
    let mut columns = samples
        .iter()
        .map(|s| {
            table.column(s).ok_or_else(|| Error::UnknownSample {
                class: class.key().to_string(),
                sample: s.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    columns.sort_unstable();
    columns.dedup();
    Ok(columns)
}

fn block_mean(table: &SpectralTable, rows: Range<usize>, columns: &[usize]) -> f64 {
    let view = table.view();
    let count = rows.len() * columns.len();
    let mut sum = 0.0;
    for row in rows {
        for &col in columns {
            sum += view[[row, col]];
        }
    }
    sum / count as f64
}
