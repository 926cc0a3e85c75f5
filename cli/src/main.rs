//! `traod` CLI: log ingestion, outlier detection, scenario generation,
//! presence/flow aggregation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ingest::dataset::{load_dataset, save_dataset, TrajectoryDataset};
use ingest::positions::{load_position_log, trajectories_from_records, IngestConfig};
use ingest::presence::{flow_by_second, presence_by_second};
use ingest::synth::{self, ScenarioKind};
use std::path::PathBuf;
use traod_core::{Traod, TraodConfig};

#[derive(Parser)]
#[command(name = "traod", about = "Trajectory outlier detection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a position log and save the trajectories as a dataset.
    Ingest {
        /// Semicolon-delimited position log
        input: PathBuf,
        /// Output dataset JSON
        output: PathBuf,
        /// Dataset name (defaults to the input file stem)
        #[arg(long)]
        name: Option<String>,
    },
    /// Run outlier detection over a dataset.
    Detect {
        /// Input dataset JSON
        input: PathBuf,
        /// Distance below which two t-partitions count as close
        #[arg(long, default_value_t = 1.0)]
        closeness: f64,
        /// Support factor relative to the population size
        #[arg(long, default_value_t = 0.1)]
        support: f64,
        /// Outlying length fraction above which a trajectory is marked
        #[arg(long, default_value_t = 0.3)]
        fraction: f64,
        /// Write a JSON report
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate a synthetic scenario dataset.
    Synth {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output dataset JSON
        output: PathBuf,
    },
    /// Aggregate per-second presence counts and flow histograms.
    Presence {
        /// Semicolon-delimited position log
        input: PathBuf,
        /// Output JSON
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            input,
            output,
            name,
        } => run_ingest(&input, &output, name)?,
        Commands::Detect {
            input,
            closeness,
            support,
            fraction,
            output,
        } => run_detect(&input, closeness, support, fraction, output.as_deref())?,
        Commands::Synth {
            scenario,
            seed,
            output,
        } => run_synth(&scenario, seed, &output)?,
        Commands::Presence { input, output } => run_presence(&input, &output)?,
    }

    Ok(())
}

fn run_ingest(
    input: &std::path::Path,
    output: &std::path::Path,
    name: Option<String>,
) -> Result<()> {
    let records = load_position_log(input)?;
    let set = trajectories_from_records(&records, &IngestConfig::default());
    let name = name.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string())
    });

    println!(
        "Parsed {} rows into {} trajectories",
        records.len(),
        set.len()
    );

    let dataset = TrajectoryDataset::from_set(name, &set);
    save_dataset(&dataset, output)?;
    println!("Dataset saved to {}", output.display());
    Ok(())
}

fn run_detect(
    input: &std::path::Path,
    closeness: f64,
    support: f64,
    fraction: f64,
    report_path: Option<&std::path::Path>,
) -> Result<()> {
    let dataset = load_dataset(input)?;
    let set = dataset.to_set();
    println!(
        "Detecting outliers in '{}' ({} trajectories)...",
        dataset.name,
        set.len()
    );

    let pipeline = Traod::new(TraodConfig {
        closeness_threshold: closeness,
        support_factor: support,
        outlier_fraction: fraction,
        ..TraodConfig::default()
    });
    let out = pipeline.run(&set)?;

    println!(
        "Done: {} t-partitions, {} flagged, {} outlier trajectories, {:.2}ms",
        out.segment_count,
        out.outlier_segment_count,
        out.outlier_trajectory_count(),
        out.total_time_us as f64 / 1000.0,
    );
    for skipped in &out.skipped {
        println!("Skipped {}: {}", skipped.id, skipped.reason);
    }
    for id in &out.outliers {
        println!("Outlier: {id}");
    }

    if let Some(path) = report_path {
        let report = serde_json::json!({
            "dataset": dataset.name,
            "closeness": closeness,
            "support": support,
            "fraction": fraction,
            "segment_count": out.segment_count,
            "outlier_segment_count": out.outlier_segment_count,
            "outliers": out.outliers.iter().map(|id| id.0).collect::<Vec<_>>(),
            "skipped": out.skipped.iter().map(|s| s.id.0).collect::<Vec<_>>(),
            "timing_us": {
                "partition": out.timing_partition_us,
                "detect": out.timing_detect_us,
                "mark": out.timing_mark_us,
                "total": out.total_time_us,
            },
        });
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

fn run_synth(scenario: &ScenarioKind, seed: u64, output: &std::path::Path) -> Result<()> {
    let set = synth::build(scenario, seed);
    let dataset = TrajectoryDataset::from_set(format!("{scenario:?}-{seed}"), &set);
    save_dataset(&dataset, output)?;
    println!(
        "Generated {} trajectories, saved to {}",
        dataset.trajectories.len(),
        output.display()
    );
    Ok(())
}

fn run_presence(input: &std::path::Path, output: &std::path::Path) -> Result<()> {
    let records = load_position_log(input)?;
    let config = IngestConfig::default();
    let presence = presence_by_second(&records, &config);
    let flow = flow_by_second(&records, &config);

    // Flatten the maps into record arrays; JSON objects need string keys.
    let presence_rows: Vec<_> = presence
        .iter()
        .flat_map(|(time, cells)| {
            cells.iter().map(move |(cell, entities)| {
                serde_json::json!({
                    "time": time,
                    "cell": [cell.0, cell.1],
                    "count": entities.len(),
                })
            })
        })
        .collect();
    let flow_rows: Vec<_> = flow
        .iter()
        .flat_map(|(time, cells)| {
            cells.iter().map(move |(cell, histogram)| {
                serde_json::json!({
                    "time": time,
                    "cell": [cell.0, cell.1],
                    "histogram": histogram.0,
                })
            })
        })
        .collect();

    println!(
        "Aggregated {} rows into {} presence frames, {} flow frames",
        records.len(),
        presence.len(),
        flow.len()
    );
    let report = serde_json::json!({ "presence": presence_rows, "flow": flow_rows });
    std::fs::write(output, serde_json::to_string_pretty(&report)?)?;
    println!("Aggregates saved to {}", output.display());
    Ok(())
}
