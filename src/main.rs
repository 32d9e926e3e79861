use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eventlog2csv::config::parse_delimiter;
use eventlog2csv::{ConvertConfig, Mode, Pairing};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert a Spark event log (one JSON event per line) to CSV files.
#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Spark event logs to CSV", long_about = None)]
struct Cli {
    /// The filename of the Spark event log
    filename: PathBuf,

    /// Column strategy
    #[arg(long, value_enum, default_value_t = Mode::Fixed)]
    mode: Mode,

    /// Flatten arrays of objects into indexed columns (generic mode)
    #[arg(long)]
    flatten_arrays: bool,

    /// Handling of end events with no recorded start (fixed mode)
    #[arg(long, value_enum, default_value_t = Pairing::Strict)]
    pairing: Pairing,

    /// Field delimiter for every output file
    #[arg(long, default_value = ";")]
    delimiter: String,

    /// Log verbosity on stderr (RUST_LOG takes precedence)
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    // Parse CLI flags
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConvertConfig {
        mode: cli.mode,
        pairing: cli.pairing,
        flatten_arrays: cli.flatten_arrays,
        delimiter: parse_delimiter(&cli.delimiter)?,
    };

    let summary = eventlog2csv::run(&cli.filename, &config)
        .with_context(|| format!("Conversion of {} failed", cli.filename.display()))?;

    let outputs: Vec<String> = summary
        .outputs
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "Conversion from {} to {} successfully completed ({} events).",
        cli.filename.display(),
        outputs.join(", "),
        summary.events
    );

    Ok(())
}
