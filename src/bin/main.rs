//! Kestrel CLI - cost anomaly detection over a local billing export.
//!
//! Usage:
//!   kestrel run [--config kestrel.toml] [--date 2024-03-05]
//!   kestrel queries [--config kestrel.toml] [--json]
//!   kestrel validate [--config kestrel.toml]

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use kestrel::config::{Settings, SettingsError};
use kestrel::detect::run_detector;
use kestrel::expand::expand_queries;
use kestrel::run_context::RunContext;
use kestrel::sink::{ArchiveSink, ResultSink, SqliteSink};
use kestrel::source::SqliteFactSource;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Kestrel - dimensional cost anomaly detection for cloud billing exports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detector for one target date
    Run {
        /// Path to the config file (defaults to the standard search order)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target date (defaults to two days ago; billing exports lag)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Print the expanded concrete query set
    Queries {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print full definitions as JSON instead of names
        #[arg(long)]
        json: bool,
    },

    /// Load and validate the configuration
    Validate {
        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, date } => cmd_run(config, date),
        Commands::Queries { config, json } => cmd_queries(config, json),
        Commands::Validate { config } => cmd_validate(config),
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings, SettingsError> {
    let settings = match config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    settings.validate()?;
    Ok(settings)
}

fn cmd_run(config: Option<PathBuf>, date: Option<NaiveDate>) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let date = date.unwrap_or_else(|| (Utc::now() - Duration::days(2)).date_naive());
    let ctx = RunContext::new(&settings.run.marker_dir);
    if ctx.markers.is_complete(date) {
        println!("Run for {} already complete, nothing to do.", date);
        return ExitCode::SUCCESS;
    }

    let source_path = match settings.source.resolved_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let sink_path = match settings.sink.resolved_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = match SqliteFactSource::open(&source_path, settings.accounts.clone()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to open fact source: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();
    match SqliteSink::open(&sink_path) {
        Ok(sink) => sinks.push(Box::new(sink)),
        Err(e) => {
            eprintln!("Failed to open result sink: {}", e);
            return ExitCode::FAILURE;
        }
    }
    match ArchiveSink::create(&settings.run.archive_dir, date) {
        Ok(sink) => sinks.push(Box::new(sink)),
        Err(e) => {
            eprintln!("Failed to open archive: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match run_detector(&settings, date, &source, &mut sinks, &ctx) {
        Ok(summary) => {
            println!("Run complete for {}:", date);
            println!("  expanded queries:       {}", summary.expanded);
            println!("  results written:        {}", summary.written);
            println!("  skipped (columns):      {}", summary.skipped_missing_columns);
            println!("  skipped (no data):      {}", summary.skipped_no_data);
            println!("  suppressed (all zero):  {}", summary.suppressed);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_queries(config: Option<PathBuf>, json: bool) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let expanded = expand_queries(&settings.queries, &settings.aws_query_regions);
    if json {
        match serde_json::to_string_pretty(&expanded) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Failed to render queries: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for (name, definition) in &expanded {
            let dimensions: Vec<String> = definition
                .iter()
                .map(|(dimension, value)| format!("{}={}", dimension, value))
                .collect();
            println!("{}: {}", name, dimensions.join(", "));
        }
    }
    ExitCode::SUCCESS
}

fn cmd_validate(config: Option<PathBuf>) -> ExitCode {
    match load_settings(config) {
        Ok(settings) => {
            println!(
                "Configuration OK: {} queries, {} regions",
                settings.queries.len(),
                settings.aws_query_regions.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            ExitCode::FAILURE
        }
    }
}
