// src/main.rs

mod analysis;
mod config;
mod readings;
mod report;
mod types;

use analysis::{summarize, BottleneckFinder};
use anyhow::Result;
use clap::Parser;
use report::ReportWriter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use types::Config;

#[derive(Parser)]
#[command(name = "bottleneck-detection")]
#[command(about = "Detect freeway bottlenecks from PeMS 5-minute station data")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "BOTTLENECK_CONFIG", default_value = "config.yaml")]
    config: String,

    /// Override the input directory from the config
    #[arg(long)]
    input_dir: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bottleneck_detection=info")),
        )
        .init();

    info!("🛣️  Bottleneck Detection Starting");

    let mut config = Config::load(&args.config)?;
    if let Some(input_dir) = args.input_dir {
        config.data.input_dir = input_dir;
    }
    info!("✓ Configuration loaded");

    info!(
        "Detection thresholds: min_speed={:.1} mph, max_distance={:.1} mi, trigger={:.1} mph, direction={}",
        config.detection.min_speed_mph,
        config.detection.max_distance_miles,
        config.detection.mph_trigger,
        config.detection.direction.as_str()
    );

    let files = readings::find_daily_files(&config.data.input_dir)?;
    if files.is_empty() {
        error!("No daily extract files found in {}", config.data.input_dir);
        return Ok(());
    }

    let finder = BottleneckFinder::new(config.detection.clone());
    let writer = ReportWriter::new(&config.data.output_dir, config.data.write_jsonl)?;
    info!("✓ Finder and report writer ready");

    let mut all_detections = Vec::new();
    let mut days_processed: usize = 0;
    let mut total_rows: usize = 0;
    let mut total_seeds: usize = 0;
    let mut total_collapsed: usize = 0;

    for path in &files {
        let day_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("day")
            .to_string();

        let rows = match readings::load_readings(path) {
            Ok(rows) => rows,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                continue;
            }
        };
        let table = readings::ReadingTable::from_rows(rows);
        if table.is_empty() {
            warn!("⚪ {}: no usable readings, skipping", day_stem);
            continue;
        }

        let (detections, stats) = finder.detect(&table);

        info!(
            "{}: {} row(s), {} seed(s) → {} detection(s)",
            day_stem,
            stats.rows_scanned,
            stats.seeds,
            detections.len()
        );

        writer.write_detections(&day_stem, &detections)?;

        total_rows += stats.rows_scanned;
        total_seeds += stats.seeds;
        total_collapsed += stats.dedup_dropped;
        all_detections.extend(detections);
        days_processed += 1;
    }

    let summaries = summarize(&all_detections);
    writer.write_summary(&summaries)?;

    info!("\n📊 Final Report:");
    info!("  Days Processed: {}", days_processed);
    info!("  Readings Scanned: {}", total_rows);
    info!("  Seed Readings: {}", total_seeds);
    info!("  ✅ Detections: {}", all_detections.len());
    info!("  🚏 Stations Flagged: {}", summaries.len());
    if total_collapsed > 0 {
        info!(
            "  ⚠️  Co-occurring candidates collapsed: {}",
            total_collapsed
        );
    }

    Ok(())
}
