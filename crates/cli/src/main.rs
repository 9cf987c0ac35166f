//! glaciermap CLI - glacier surface classification from multispectral imagery

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use glaciermap_algorithms::surface::{
    axis_ticks, build_centroids_with, classify, AxisTicks, Centroid, CentroidSet, ClassificationMap,
    ClassifyParams, Histogram, Mission, ReflectanceScale, TickLabels, DEFAULT_TICK_DECIMALS,
};
use glaciermap_colormap::ClassPalette;
use glaciermap_core::io::{read_band_directory, read_membership, read_spectral_table, ReadBandsOptions};
use glaciermap_core::{
    BandId, ClassMembership, GeoCorners, LonLat, RasterCube, SurfaceClass, DEFAULT_BASE_WAVELENGTH,
};
use glaciermap_parallel::ProcessingMode;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "glaciermap")]
#[command(author, version, about = "Glacier surface classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the band wavelength intervals of a mission
    Bands {
        /// Mission: sentinel2, landsat8, landsat7
        #[arg(short, long, default_value = "sentinel2")]
        mission: Mission,
    },
    /// Compute class centroids from field spectra
    Centroids {
        /// Spectral table (CSV, one column per sample)
        spectra: PathBuf,
        /// Output JSON file
        output: PathBuf,
        /// Mission: sentinel2, landsat8, landsat7
        #[arg(short, long, default_value = "sentinel2")]
        mission: Mission,
        /// Restrict to these band numbers, e.g. 1,2,3,4,5,6,7,8,9,11,12
        #[arg(long, value_delimiter = ',')]
        bands: Option<Vec<u8>>,
        #[command(flatten)]
        training: TrainingArgs,
    },
    /// Classify a directory of band rasters
    Classify {
        /// Directory with one TIFF per band (e.g. B02.tif)
        bands: PathBuf,
        /// Output PNG file
        output: PathBuf,
        /// Mission: sentinel2, landsat8, landsat7
        #[arg(short, long, default_value = "sentinel2")]
        mission: Mission,
        /// Spectral table to train centroids from
        #[arg(long, conflicts_with = "centroids")]
        spectra: Option<PathBuf>,
        /// Precomputed centroids (output of `glaciermap centroids`)
        #[arg(long)]
        centroids: Option<PathBuf>,
        #[command(flatten)]
        training: TrainingArgs,
        /// Centroid multiplier (default depends on the mission)
        #[arg(short, long)]
        scale: Option<f64>,
        /// Value marking pixels outside the scene in every band
        #[arg(short, long, default_value = "0.0")]
        background: f64,
        /// Largest tolerated raster / centroid magnitude ratio
        #[arg(long, default_value = "10.0")]
        max_scale_ratio: f64,
        /// Skip the raster / centroid magnitude check
        #[arg(long)]
        no_scale_check: bool,
        /// Keep raw band values instead of stretching each band to [0, 1]
        #[arg(long)]
        no_normalize: bool,
        /// Worker threads (0 = all cores, 1 = sequential)
        #[arg(short, long)]
        threads: Option<usize>,
        /// Tile edge length in pixels
        #[arg(long, default_value = "256")]
        tile_size: usize,
        /// Scene corners: ul_lon,ul_lat,lr_lon,lr_lat
        #[arg(long, allow_hyphen_values = true)]
        corners: Option<String>,
        /// Write the class histogram to this JSON file
        #[arg(long)]
        histogram: Option<PathBuf>,
        /// Write axis tick values to this JSON file
        #[arg(long)]
        ticks: Option<PathBuf>,
        /// Number of labelled tick intervals per axis
        #[arg(long, default_value = "5")]
        tick_bins: usize,
        /// Decimal places of tick values
        #[arg(long, default_value_t = DEFAULT_TICK_DECIMALS)]
        tick_decimals: u32,
    },
}

#[derive(clap::Args)]
struct TrainingArgs {
    /// Wavelength in nm of the first table row (ignored if the table has a wavelength column)
    #[arg(long, default_value_t = DEFAULT_BASE_WAVELENGTH)]
    base_wavelength: u32,
    /// Class membership JSON (defaults to the 2016 field campaign lists)
    #[arg(long)]
    membership: Option<PathBuf>,
}

// ─── Output documents ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct CentroidFile {
    mission: Option<Mission>,
    centroids: Vec<Centroid>,
}

#[derive(Serialize)]
struct HistogramReport<'a> {
    histogram: &'a Histogram,
    colors: BTreeMap<SurfaceClass, String>,
    classified_pixels: u64,
    background_pixels: u64,
    invalid_pixels: u64,
    total_pixels: u64,
}

#[derive(Serialize)]
struct TicksReport {
    #[serde(flatten)]
    ticks: AxisTicks,
    labels: TickLabels,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_corners(s: &str) -> Result<GeoCorners> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid corners: {}", s))?;
    if values.len() != 4 {
        bail!("Expected ul_lon,ul_lat,lr_lon,lr_lat, got {} values", values.len());
    }
    Ok(GeoCorners::new(
        LonLat::new(values[0], values[1]),
        LonLat::new(values[2], values[3]),
    ))
}

fn load_membership(path: Option<&Path>) -> Result<ClassMembership> {
    match path {
        Some(p) => read_membership(p)
            .with_context(|| format!("Failed to read membership file {}", p.display())),
        None => Ok(ClassMembership::field_campaign_2016()),
    }
}

/// Train centroids over `bands`, or over every band of the mission when `None`.
fn train(
    spectra: &Path,
    mission: Mission,
    bands: Option<&[BandId]>,
    args: &TrainingArgs,
) -> Result<CentroidSet> {
    let pb = spinner("Reading spectral table...");
    let table = read_spectral_table(spectra, args.base_wavelength)
        .with_context(|| format!("Failed to read spectral table {}", spectra.display()))?;
    pb.finish_and_clear();
    info!(
        "Spectra: {} samples, {}-{} nm",
        table.sample_ids().len(),
        table.base_wavelength(),
        table.end_wavelength()
    );

    let table_bands = mission.bands();
    let defs = match bands {
        Some(ids) => table_bands
            .select(ids)
            .with_context(|| format!("Band set does not match {}", mission))?,
        None => table_bands.iter().copied().collect(),
    };

    let membership = load_membership(args.membership.as_deref())?;
    let centroids = build_centroids_with(&table, &membership, Some(mission), &defs)
        .context("Failed to compute centroids")?;
    debug!("{} centroids over {} bands", centroids.len(), centroids.band_ids().len());
    Ok(centroids)
}

fn load_centroids(path: &Path) -> Result<CentroidSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open centroid file {}", path.display()))?;
    centroids_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load centroids from {}", path.display()))
}

fn centroids_from_reader<R: Read>(reader: R) -> Result<CentroidSet> {
    let doc: CentroidFile =
        serde_json::from_reader(reader).context("Failed to parse centroid file")?;
    CentroidSet::new(doc.mission, doc.centroids).context("Invalid centroid file")
}

fn check_mission(centroids: &CentroidSet, mission: Mission) -> Result<()> {
    match centroids.mission() {
        Some(m) if m != mission => {
            bail!("Centroids were built for {}, cannot classify {} bands", m, mission)
        }
        _ => Ok(()),
    }
}

fn legend(palette: &ClassPalette, classes: &[SurfaceClass]) -> BTreeMap<SurfaceClass, String> {
    classes.iter().map(|c| (*c, palette.color(*c).to_hex())).collect()
}

fn read_cube(dir: &Path, options: &ReadBandsOptions) -> Result<RasterCube> {
    let pb = spinner("Reading bands...");
    let cube = read_band_directory(dir, options)
        .with_context(|| format!("Failed to read bands from {}", dir.display()))?;
    pb.finish_and_clear();
    let ids: Vec<String> = cube.band_ids().iter().map(ToString::to_string).collect();
    info!("Input: {} x {}, bands {}", cube.cols(), cube.rows(), ids.join(" "));
    Ok(cube)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).context("Failed to write JSON")?;
    writer.flush()?;
    Ok(())
}

fn write_png(map: &ClassificationMap, path: &Path) -> Result<()> {
    let (rows, cols) = map.shape();
    let img = image::RgbImage::from_raw(cols as u32, rows as u32, map.rgb().to_vec())
        .context("RGB buffer does not match the map size")?;
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_histogram(map: &ClassificationMap, palette: &ClassPalette) {
    let classified = map.histogram().total();
    println!("\nSurface classes:");
    for (class, count) in map.histogram().iter() {
        let pct = if classified > 0 {
            100.0 * count as f64 / classified as f64
        } else {
            0.0
        };
        println!(
            "  {:<12} {} {:>10} ({:.1}%)",
            class.name(),
            palette.color(class).to_hex(),
            count,
            pct
        );
    }
    println!("  {:<12} {:>10}", "Background", map.background_pixels());
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Bands ────────────────────────────────────────────────────
        Commands::Bands { mission } => {
            println!("{} bands:", mission);
            for def in mission.bands().iter() {
                println!(
                    "  {:<4} {:>5}-{:<5} nm  ({} nm)",
                    def.band.to_string(),
                    def.min_nm,
                    def.max_nm,
                    def.width()
                );
            }
        }

        // ── Centroids ────────────────────────────────────────────────
        Commands::Centroids {
            spectra,
            output,
            mission,
            bands,
            training,
        } => {
            let start = Instant::now();
            let ids: Option<Vec<BandId>> = bands.map(|b| b.into_iter().map(BandId).collect());
            let centroids = train(&spectra, mission, ids.as_deref(), &training)?;
            let elapsed = start.elapsed();
            write_json(&centroids, &output)?;
            done("Centroids", &output, elapsed);
        }

        // ── Classify ─────────────────────────────────────────────────
        Commands::Classify {
            bands,
            output,
            mission,
            spectra,
            centroids,
            training,
            scale,
            background,
            max_scale_ratio,
            no_scale_check,
            no_normalize,
            threads,
            tile_size,
            corners,
            histogram,
            ticks,
            tick_bins,
            tick_decimals,
        } => {
            let options = ReadBandsOptions {
                normalize: !no_normalize,
                corners: match corners.as_deref() {
                    Some(s) => parse_corners(s)?,
                    None => GeoCorners::default(),
                },
            };
            let cube = read_cube(&bands, &options)?;

            let scene_bands = cube.band_ids();
            let centroids = match (&spectra, &centroids) {
                (Some(s), None) => train(s, mission, Some(scene_bands.as_slice()), &training)?,
                (None, Some(c)) => load_centroids(c)?,
                _ => bail!("Either --spectra or --centroids is required"),
            };
            check_mission(&centroids, mission)?;

            let scale = match scale {
                Some(k) => ReflectanceScale::new(k).context("Invalid --scale")?,
                None => ReflectanceScale::for_mission(mission),
            };
            let params = ClassifyParams {
                scale,
                background,
                max_scale_ratio: (!no_scale_check).then_some(max_scale_ratio),
                tile_size,
                mode: ProcessingMode::from_threads(threads),
            };
            debug!("Scale {}, background {}, mode {:?}", scale.get(), background, params.mode);

            let pb = spinner("Classifying...");
            let start = Instant::now();
            let palette = ClassPalette::default();
            let map = classify(&cube, &centroids, &params, &palette)
                .context("Failed to classify")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            if map.invalid_pixels() > 0 {
                warn!(
                    "{} pixels with NaN or infinite band values left unclassified",
                    map.invalid_pixels()
                );
            }

            write_png(&map, &output)?;
            print_histogram(&map, &palette);

            if let Some(path) = histogram {
                let report = HistogramReport {
                    histogram: map.histogram(),
                    colors: legend(&palette, &centroids.classes()),
                    classified_pixels: map.histogram().total(),
                    background_pixels: map.background_pixels(),
                    invalid_pixels: map.invalid_pixels(),
                    total_pixels: (cube.rows() * cube.cols()) as u64,
                };
                write_json(&report, &path)?;
                info!("Histogram saved to: {}", path.display());
            }

            if let Some(path) = ticks {
                if corners.is_none() {
                    warn!("No --corners given, tick values span (0, 0)-(0, 0)");
                }
                let values = axis_ticks(cube.corners(), cube.cols(), cube.rows(), tick_decimals);
                let labels = values.thinned(tick_bins);
                write_json(&TicksReport { ticks: values, labels }, &path)?;
                info!("Axis ticks saved to: {}", path.display());
            }

            println!();
            done("Classification", &output, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_parse() {
        let c = parse_corners("-50.1, 67.2,-49.0,67.0").unwrap();
        assert_eq!(c.upper_left, LonLat::new(-50.1, 67.2));
        assert_eq!(c.lower_right, LonLat::new(-49.0, 67.0));
        assert!(parse_corners("1,2,3").is_err());
        assert!(parse_corners("a,b,c,d").is_err());
    }

    #[test]
    fn cli_parses_classify() {
        let cli = Cli::try_parse_from([
            "glaciermap",
            "classify",
            "bands/",
            "out.png",
            "--mission",
            "l8",
            "--spectra",
            "spectra.csv",
            "--corners",
            "-50,67.2,-49,67",
            "--threads",
            "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify {
                mission,
                threads,
                corners,
                ..
            } => {
                assert_eq!(mission, Mission::Landsat8);
                assert_eq!(threads, Some(1));
                assert_eq!(corners.as_deref(), Some("-50,67.2,-49,67"));
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn spectra_and_centroids_conflict() {
        let res = Cli::try_parse_from([
            "glaciermap",
            "classify",
            "bands/",
            "out.png",
            "--spectra",
            "a.csv",
            "--centroids",
            "c.json",
        ]);
        assert!(res.is_err());
    }

    fn landsat7_set() -> CentroidSet {
        CentroidSet::from_vectors(
            Some(Mission::Landsat7),
            &[BandId(1), BandId(7)],
            [
                (SurfaceClass::Snow, vec![0.92, 0.05]),
                (SurfaceClass::Water, vec![0.11, 0.01]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn mission_mismatch_is_an_error() {
        let set = landsat7_set();
        assert!(check_mission(&set, Mission::Landsat7).is_ok());
        let err = check_mission(&set, Mission::Sentinel2).unwrap_err();
        assert!(err.to_string().contains("Landsat 7"));

        let unbound = CentroidSet::from_vectors(
            None,
            &[BandId(1)],
            [(SurfaceClass::Snow, vec![0.9])],
        )
        .unwrap();
        assert!(check_mission(&unbound, Mission::Sentinel2).is_ok());
    }

    #[test]
    fn written_centroids_load_back() {
        let set = landsat7_set();
        let json = serde_json::to_vec_pretty(&set).unwrap();
        let loaded = centroids_from_reader(json.as_slice()).unwrap();
        assert_eq!(loaded, set);
        assert_eq!(loaded.mission(), Some(Mission::Landsat7));
    }

    #[test]
    fn invalid_centroid_files_are_rejected() {
        let overflow = r#"{"mission": "landsat7", "centroids": [
            {"class": "snow", "values": {"1": 1e999}}
        ]}"#;
        assert!(centroids_from_reader(overflow.as_bytes()).is_err());

        let mixed = r#"{"mission": null, "centroids": [
            {"class": "snow", "values": {"1": 0.9, "2": 0.8}},
            {"class": "water", "values": {"1": 0.1}}
        ]}"#;
        assert!(centroids_from_reader(mixed.as_bytes()).is_err());

        let duplicate = r#"{"centroids": [
            {"class": "snow", "values": {"1": 0.9}},
            {"class": "snow", "values": {"1": 0.8}}
        ]}"#;
        assert!(centroids_from_reader(duplicate.as_bytes()).is_err());

        let empty = r#"{"mission": "sentinel2", "centroids": []}"#;
        assert!(centroids_from_reader(empty.as_bytes()).is_err());
    }

    #[test]
    fn legend_lists_class_colors() {
        let colors = legend(
            &ClassPalette::default(),
            &[SurfaceClass::CleanIce, SurfaceClass::Cryoconite],
        );
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[&SurfaceClass::CleanIce], "#87cefa");
        assert_eq!(colors[&SurfaceClass::Cryoconite], "#000000");
    }

    #[test]
    fn centroids_band_list_parses() {
        let cli = Cli::try_parse_from([
            "glaciermap",
            "centroids",
            "spectra.csv",
            "out.json",
            "--bands",
            "1,2,3,11,12",
        ])
        .unwrap();
        match cli.command {
            Commands::Centroids { bands, mission, .. } => {
                assert_eq!(bands, Some(vec![1, 2, 3, 11, 12]));
                assert_eq!(mission, Mission::Sentinel2);
            }
            _ => panic!("expected centroids"),
        }
    }
}
