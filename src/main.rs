use circl_canvas::{ConnectionDetector, DetectionReport, DetectorConfig, TableCatalog};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "circl-canvas")]
#[command(about = "Infer relationships between canvas tables from their column names")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect connections for every table in a catalog file
    Detect {
        /// JSON catalog: an array of table nodes or {"tables": [...]}
        catalog: PathBuf,

        /// Print the full report (timestamp, counts) instead of the bare list
        #[arg(long)]
        report: bool,

        /// Override the minimum confidence (exclusive)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Score a single pair of field names
    Match {
        field1: String,
        field2: String,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DetectorConfig::from_env().context("Invalid detector configuration")?;

    let output = run(args.command, config)?;
    println!("{}", output);
    Ok(())
}

/// Execute a subcommand and return the JSON it prints
fn run(command: Commands, mut config: DetectorConfig) -> Result<String> {
    match command {
        Commands::Detect {
            catalog,
            report,
            min_confidence,
            pretty,
        } => {
            if let Some(min_confidence) = min_confidence {
                config = config.with_min_confidence(min_confidence)?;
            }
            run_detect(catalog, config, report, pretty)
        }
        Commands::Match { field1, field2 } => {
            let detector = ConnectionDetector::with_config(config);
            let field_match = detector.match_fields(&field1, &field2);
            render_json(&field_match, true)
        }
    }
}

fn run_detect(
    catalog_path: PathBuf,
    config: DetectorConfig,
    report: bool,
    pretty: bool,
) -> Result<String> {
    let catalog = TableCatalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {:?}", catalog_path))?;

    let detector = ConnectionDetector::with_config(config);
    let detection = DetectionReport::build(&detector, &catalog.tables);

    info!(
        "Detected {} connection(s) across {} table(s)",
        detection.connections.len(),
        detection.table_count
    );

    if report {
        render_json(&detection, pretty)
    } else {
        render_json(&detection.connections, pretty)
    }
}

fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}
