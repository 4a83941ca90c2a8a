use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};

use event_gate::config::PipelineConfig;
use event_gate::observability;
use event_gate::pipeline::validation::ValidationPipeline;
use event_gate::taxonomy;

#[derive(Parser)]
#[command(name = "event_gate")]
#[command(about = "Validation and standardization pipeline for marketing analytics events")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate events from a JSON file (a single object or an array)
    Validate {
        /// Path to the events file
        file: PathBuf,
        /// Optional pipeline config TOML
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print full results as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List the canonical event taxonomy
    Taxonomy,
}

fn load_events(path: &PathBuf) -> event_gate::error::Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&content)?;
    match parsed {
        Value::Array(events) => Ok(events),
        other => Ok(vec![other]),
    }
}

fn run_validate(file: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = ValidationPipeline::with_config(config)
        .with_timing_sink(Box::new(observability::LogTimingSink));

    let events = load_events(&file)?;
    info!(count = events.len(), "validating events from {}", file.display());

    for (index, event) in events.iter().enumerate() {
        let result = pipeline.validate(event);

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            continue;
        }

        let verdict = if result.is_valid { "ok" } else { "INVALID" };
        println!(
            "[{}] {} {} (score {}, completeness {}%)",
            index, verdict, result.standardized_data.event_name, result.quality_score,
            result.metadata.data_completeness
        );
        for warning in &result.warnings {
            println!("      warn: {}", warning);
        }
        for err in &result.errors {
            println!("      error: {}", err);
        }
    }

    let stats = pipeline.stats();
    println!(
        "\n{} processed, {} passed, {} failed, {} with warnings",
        stats.processed, stats.passed, stats.errors, stats.warnings
    );
    println!(
        "average quality {:.1}, success rate {:.1}%",
        stats.average_quality, stats.success_rate
    );

    Ok(())
}

fn run_taxonomy() {
    println!("Canonical events:");
    for name in taxonomy::canonical_names() {
        let def = taxonomy::definition(name).expect("canonical name has a definition");
        println!(
            "  {:22} required: [{}]  aliases: [{}]",
            def.name,
            def.required_properties.join(", "),
            def.legacy_names.join(", ")
        );
    }
}

fn main() {
    dotenv::dotenv().ok();
    observability::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, config, json } => {
            if let Err(e) = run_validate(file, config, json) {
                error!("validation run failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Taxonomy => run_taxonomy(),
    }
}
