//! I/O for band rasters, spectral tables and class membership files

mod native;
mod spectra;

pub use native::{
    normalize_min_max, parse_band_id, read_band_directory, read_geotiff, ReadBandsOptions,
};
pub use spectra::{
    read_membership, read_membership_from_reader, read_spectral_table,
    read_spectral_table_from_reader,
};
