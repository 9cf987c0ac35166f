//! Reading band directories and spectral inputs from disk.

use glaciermap_core::io::{
    read_band_directory, read_geotiff, read_membership, read_spectral_table, ReadBandsOptions,
};
use glaciermap_core::{BandId, Error, GeoCorners, LonLat, SurfaceClass};
use std::fs::{self, File};
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};

fn write_band(path: &Path, width: u32, height: u32, data: &[f32]) {
    let mut file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(&mut file).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(width, height, data)
        .unwrap();
}

#[test]
fn single_band_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("B02.tif");
    write_band(&path, 3, 2, &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

    let raster = read_geotiff::<f64, _>(&path).unwrap();
    assert_eq!(raster.shape(), (2, 3));
    assert!((raster.get(1, 2).unwrap() - 0.6).abs() < 1e-6);
}

#[test]
fn directory_becomes_cube() {
    let dir = tempfile::tempdir().unwrap();
    write_band(&dir.path().join("B03.tif"), 2, 2, &[0.0, 10.0, 20.0, 40.0]);
    write_band(&dir.path().join("B8A.tif"), 2, 2, &[5.0, 5.0, 5.0, 5.0]);
    write_band(&dir.path().join("2.tiff"), 2, 2, &[1.0, 2.0, 3.0, 4.0]);
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let corners = GeoCorners::new(LonLat::new(-50.0, 67.2), LonLat::new(-49.0, 67.0));
    let options = ReadBandsOptions {
        corners,
        ..ReadBandsOptions::default()
    };
    let cube = read_band_directory(dir.path(), &options).unwrap();

    assert_eq!(cube.band_ids(), vec![BandId(2), BandId(3), BandId(8)]);
    assert_eq!(cube.corners(), corners);

    let b3 = cube.band(BandId(3)).unwrap();
    assert_eq!(b3.get(0, 0).unwrap(), 0.0);
    assert_eq!(b3.get(1, 0).unwrap(), 0.5);
    assert_eq!(b3.get(1, 1).unwrap(), 1.0);
    // constant band
    assert_eq!(cube.band(BandId(8)).unwrap().get(0, 1).unwrap(), 0.0);

    let mut pixel = [0.0; 3];
    cube.pixel_into(1, 1, &mut pixel).unwrap();
    assert_eq!(pixel, [1.0, 1.0, 0.0]);
}

#[test]
fn raw_values_without_normalization() {
    let dir = tempfile::tempdir().unwrap();
    write_band(&dir.path().join("B04.tif"), 2, 1, &[1200.0, 3400.0]);
    let options = ReadBandsOptions {
        normalize: false,
        ..ReadBandsOptions::default()
    };
    let cube = read_band_directory(dir.path(), &options).unwrap();
    assert_eq!(cube.band(BandId(4)).unwrap().get(0, 1).unwrap(), 3400.0);
}

#[test]
fn mismatched_band_sizes_fail() {
    let dir = tempfile::tempdir().unwrap();
    write_band(&dir.path().join("B02.tif"), 2, 2, &[1.0; 4]);
    write_band(&dir.path().join("B03.tif"), 3, 1, &[1.0; 3]);
    let err = read_band_directory(dir.path(), &ReadBandsOptions::default()).unwrap_err();
    assert!(matches!(err, Error::SizeMismatch { .. }));
}

#[test]
fn empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_band_directory(dir.path(), &ReadBandsOptions::default()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn spectra_and_membership_files() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("spectra.csv");
    fs::write(&csv, "wavelength,s1,s2\n400,0.1,0.3\n401,0.2,0.4\n402,0.3,0.5\n").unwrap();
    let json = dir.path().join("membership.json");
    fs::write(&json, r#"{"snow": ["s1"], "clean_ice": ["s2"]}"#).unwrap();

    let table = read_spectral_table(&csv, 350).unwrap();
    assert_eq!(table.base_wavelength(), 400);
    assert_eq!(table.rows(), 3);
    assert_eq!(table.column("s2"), Some(1));

    let membership = read_membership(&json).unwrap();
    assert_eq!(membership.samples(SurfaceClass::Snow), Some(&["s1".to_string()][..]));
    assert_eq!(membership.len(), 2);
}
