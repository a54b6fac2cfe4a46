//! AgniScan CLI - Stubble-burn scar classification from multispectral imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use agniscan_core::io::{read_geotiff, write_geotiff, write_geotiff_u8};
use agniscan_core::{ensure_same_grid, Raster};
use agniscan_engine::bands::{Acquisition, Band, BandSet};
use agniscan_engine::fusion::FusedClassification;
use agniscan_engine::pipeline::classify_with_indices;
use agniscan_engine::severity::{ClassifierConfig, SeverityClass, NODATA_CODE};
use agniscan_engine::summary::{summarize, AnalysisSummary};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "agniscan")]
#[command(author, version, about = "Stubble-burn scar classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Classify burn severity from paired pre/post-fire acquisitions
    Classify {
        /// Pre-fire red band file
        #[arg(long)]
        pre_red: PathBuf,
        /// Pre-fire NIR band file
        #[arg(long)]
        pre_nir: PathBuf,
        /// Pre-fire SWIR band file
        #[arg(long)]
        pre_swir: PathBuf,
        /// Post-fire red band file
        #[arg(long)]
        post_red: PathBuf,
        /// Post-fire NIR band file
        #[arg(long)]
        post_nir: PathBuf,
        /// Post-fire SWIR band file
        #[arg(long)]
        post_swir: PathBuf,
        /// Agricultural mask file (1 = farmland)
        #[arg(long)]
        mask: PathBuf,
        /// Output severity raster (codes 0-4, 255 = no-data)
        #[arg(long)]
        severity: PathBuf,
        /// Output agreement raster (0-3 indicators per pixel)
        #[arg(long)]
        agreement: Option<PathBuf>,
        /// Classifier configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the BAI burn threshold
        #[arg(long)]
        bai_threshold: Option<f64>,
        /// Override the dNDVI burn threshold
        #[arg(long)]
        ndvi_threshold: Option<f64>,
        /// Directory for intermediate index rasters (dnbr, bai, dndvi)
        #[arg(long)]
        write_indices: Option<PathBuf>,
    },
    /// Aggregate burned area over regions of interest
    Summarize {
        /// Severity raster produced by classify
        #[arg(long)]
        severity: PathBuf,
        /// Agreement raster produced by classify
        #[arg(long)]
        agreement: PathBuf,
        /// GeoJSON file with ROI polygons, in the raster CRS
        #[arg(long)]
        roi: PathBuf,
        /// Print summaries as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also write summaries to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool, quiet: bool) {
    let default_directive = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
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

fn read_band(path: &PathBuf) -> Result<Raster<f64>> {
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read band {}", path.display()))?;
    Ok(raster)
}

fn read_band_set(
    acquisition: Acquisition,
    red: &PathBuf,
    nir: &PathBuf,
    swir: &PathBuf,
) -> Result<BandSet> {
    let pb = spinner(&format!("Reading {} bands...", acquisition));
    let mut set = BandSet::new(acquisition);
    for (band, path) in Band::ALL.into_iter().zip([red, nir, swir]) {
        debug!(
            "Reading {} {} band ({}) from {}",
            acquisition,
            band,
            band.sentinel2(),
            path.display()
        );
        set.insert(band, read_band(path)?);
    }
    pb.finish_and_clear();
    Ok(set)
}

fn read_u8(path: &PathBuf) -> Result<Raster<u8>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<u8> = read_geotiff(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    Ok(raster)
}

fn write_result_u8(raster: &Raster<u8>, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff_u8(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn load_config(
    path: Option<&PathBuf>,
    bai_threshold: Option<f64>,
    ndvi_threshold: Option<f64>,
) -> Result<ClassifierConfig> {
    let mut config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read config {}", p.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", p.display()))?
        }
        None => ClassifierConfig::default(),
    };
    if let Some(v) = bai_threshold {
        config.bai_threshold = v;
    }
    if let Some(v) = ndvi_threshold {
        config.ndvi_threshold = v;
    }
    Ok(config)
}

// ─── GeoJSON ROIs ───────────────────────────────────────────────────────

struct NamedRoi {
    name: String,
    geometry: MultiPolygon<f64>,
}

fn load_rois(path: &PathBuf) -> Result<Vec<NamedRoi>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ROI file {}", path.display()))?;
    parse_rois(&text).with_context(|| format!("Failed to parse ROI file {}", path.display()))
}

fn parse_rois(text: &str) -> Result<Vec<NamedRoi>> {
    let value: Value = serde_json::from_str(text).context("Invalid JSON")?;
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .context("FeatureCollection has no features array")?;
            features
                .iter()
                .enumerate()
                .map(|(i, feature)| parse_feature(i, feature))
                .collect()
        }
        Some("Feature") => Ok(vec![parse_feature(0, &value)?]),
        Some("Polygon") | Some("MultiPolygon") => Ok(vec![NamedRoi {
            name: "roi-0".to_string(),
            geometry: parse_geometry(&value)?,
        }]),
        other => anyhow::bail!("Unsupported GeoJSON type: {:?}", other),
    }
}

fn parse_feature(index: usize, feature: &Value) -> Result<NamedRoi> {
    let name = feature
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("roi-{}", index));
    let geometry = feature
        .get("geometry")
        .with_context(|| format!("Feature {} has no geometry", index))?;
    let geometry = parse_geometry(geometry)
        .with_context(|| format!("Feature {} ({})", index, name))?;
    Ok(NamedRoi { name, geometry })
}

fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry
        .get("coordinates")
        .context("Geometry has no coordinates")?;
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => {
            let rings: Vec<Vec<Vec<f64>>> =
                serde_json::from_value(coords.clone()).context("Malformed Polygon coordinates")?;
            Ok(MultiPolygon(vec![polygon_from_rings(rings)?]))
        }
        Some("MultiPolygon") => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coords.clone())
                .context("Malformed MultiPolygon coordinates")?;
            polygons
                .into_iter()
                .map(polygon_from_rings)
                .collect::<Result<Vec<_>>>()
                .map(MultiPolygon)
        }
        other => anyhow::bail!("Unsupported geometry type: {:?}", other),
    }
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon<f64>> {
    let mut line_strings = rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|position| {
                    if position.len() < 2 {
                        anyhow::bail!("Position needs at least 2 coordinates");
                    }
                    Ok(Coord {
                        x: position[0],
                        y: position[1],
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(LineString)
        })
        .collect::<Result<Vec<_>>>()?;
    if line_strings.is_empty() {
        anyhow::bail!("Polygon has no rings");
    }
    let exterior = line_strings.remove(0);
    Ok(Polygon::new(exterior, line_strings))
}

// ─── Output formatting ──────────────────────────────────────────────────

fn print_summary(name: &str, summary: &AnalysisSummary) {
    println!("ROI: {}", name);
    println!(
        "  Pixels: {} ({} no-data, {:.1}%)",
        summary.total_pixels,
        summary.nodata_pixels,
        100.0 * summary.nodata_fraction
    );
    println!("  Mean agreement: {:.2}", summary.mean_agreement);
    println!("  Burned area: {:.4} ha", summary.burned_hectares);
    for class in SeverityClass::SCALE {
        let figures = summary.class(class);
        if figures.pixels > 0 {
            println!(
                "    {}: {} px, {:.4} ha",
                class.name(),
                figures.pixels,
                figures.hectares
            );
        }
    }
}

fn write_csv(path: &PathBuf, rows: &[(String, AnalysisSummary)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "roi",
        "total_pixels",
        "nodata_pixels",
        "nodata_fraction",
        "mean_agreement",
        "unburned_ha",
        "low_ha",
        "moderate_low_ha",
        "moderate_high_ha",
        "high_ha",
        "burned_ha",
    ])?;
    for (name, summary) in rows {
        let mut record = vec![
            name.clone(),
            summary.total_pixels.to_string(),
            summary.nodata_pixels.to_string(),
            format!("{:.6}", summary.nodata_fraction),
            format!("{:.4}", summary.mean_agreement),
        ];
        for class in SeverityClass::SCALE {
            record.push(format!("{:.4}", summary.class(class).hectares));
        }
        record.push(format!("{:.4}", summary.burned_hectares));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster: Raster<f64> = read_geotiff(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        // ── Classify ─────────────────────────────────────────────────
        Commands::Classify {
            pre_red,
            pre_nir,
            pre_swir,
            post_red,
            post_nir,
            post_swir,
            mask,
            severity,
            agreement,
            config,
            bai_threshold,
            ndvi_threshold,
            write_indices,
        } => {
            let config = load_config(config.as_ref(), bai_threshold, ndvi_threshold)?;
            info!(
                "Thresholds: BAI >= {}, dNDVI >= {}",
                config.bai_threshold, config.ndvi_threshold
            );

            let pre = read_band_set(Acquisition::PreFire, &pre_red, &pre_nir, &pre_swir)?;
            let post = read_band_set(Acquisition::PostFire, &post_red, &post_nir, &post_swir)?;
            let mask_raster = read_u8(&mask)?;

            let pb = spinner("Classifying...");
            let start = Instant::now();
            let (fused, indices) = classify_with_indices(&pre, &post, &mask_raster, &config)
                .context("Classification failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            write_result_u8(&fused.severity, &severity)?;
            done("Severity", &severity, elapsed);
            if let Some(path) = agreement {
                write_result_u8(&fused.agreement, &path)?;
                println!("Agreement saved to: {}", path.display());
            }
            if let Some(dir) = write_indices {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                for (name, raster) in [
                    ("dnbr", &indices.dnbr),
                    ("bai", &indices.bai),
                    ("dndvi", &indices.dndvi),
                ] {
                    let path = dir.join(format!("{}.tif", name));
                    write_geotiff(raster, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Index {} saved to: {}", name, path.display());
                }
            }
        }

        // ── Summarize ────────────────────────────────────────────────
        Commands::Summarize {
            severity,
            agreement,
            roi,
            json,
            csv,
        } => {
            let mut severity_raster = read_u8(&severity)?;
            severity_raster.set_nodata(Some(NODATA_CODE));
            let agreement_raster = read_u8(&agreement)?;
            ensure_same_grid(
                "agreement raster",
                &severity_raster.descriptor(),
                &agreement_raster.descriptor(),
            )?;
            let classification = FusedClassification {
                severity: severity_raster,
                agreement: agreement_raster,
            };

            let rois = load_rois(&roi)?;
            info!("Loaded {} ROI(s) from {}", rois.len(), roi.display());

            let start = Instant::now();
            let mut results: Vec<(String, AnalysisSummary)> = Vec::new();
            for named in &rois {
                match summarize(&classification, &named.geometry) {
                    Ok(summary) => results.push((named.name.clone(), summary)),
                    Err(e) => warn!("Skipping ROI '{}': {}", named.name, e),
                }
            }
            let elapsed = start.elapsed();

            if json {
                let payload: Vec<Value> = results
                    .iter()
                    .map(|(name, summary)| {
                        serde_json::json!({ "roi": name, "summary": summary })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (name, summary) in &results {
                    print_summary(name, summary);
                }
                println!("Summarized {} ROI(s) in {:.2?}", results.len(), elapsed);
            }
            if let Some(path) = csv {
                write_csv(&path, &results)?;
                println!("CSV saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────
