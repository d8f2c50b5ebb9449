use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fiscal_core::{FiscalDataset, FiscalEngine, FiscalRequest};
use fiscal_data::{DatasetSource, DirectoryDataset, EmbeddedDataset};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Decompose a salary and monthly spending into the taxes they carry.
///
/// The request file is a JSON object with a `profile`, optional
/// `categories` of monthly expenses and an optional display `view`. The
/// report is written to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "fiscal-report")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON request file
    #[arg(short, long, required_unless_present = "list_jurisdictions")]
    request: Option<PathBuf>,

    /// Directory containing brackets.csv and rates.toml (defaults to the embedded 2025 snapshot)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Print the known jurisdictions and exit
    #[arg(short, long, default_value_t = false)]
    list_jurisdictions: bool,

    /// Pretty-print the JSON output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

#[derive(Serialize)]
struct JurisdictionSummary<'a> {
    id: &'a str,
    display_name: &'a str,
    regime: &'static str,
}

/// Logs go to stderr so stdout stays valid JSON. `RUST_LOG` overrides the
/// default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn load_dataset(args: &Args) -> Result<FiscalDataset> {
    match &args.dataset {
        Some(dir) => DirectoryDataset::new(dir)
            .load()
            .with_context(|| format!("Failed to load dataset from: {}", dir.display())),
        None => EmbeddedDataset
            .load()
            .context("Failed to load embedded dataset"),
    }
}

fn print_json<T: Serialize>(
    value: &T,
    pretty: bool,
) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let dataset = load_dataset(&args)?;

    if args.list_jurisdictions {
        let summaries: Vec<_> = dataset
            .jurisdictions_by_name()
            .into_iter()
            .map(|j| JurisdictionSummary {
                id: &j.id,
                display_name: &j.display_name,
                regime: j.regime.as_str(),
            })
            .collect();
        return print_json(&summaries, args.pretty);
    }

    let Some(request_path) = &args.request else {
        anyhow::bail!("--request is required");
    };

    let file = File::open(request_path)
        .with_context(|| format!("Failed to open: {}", request_path.display()))?;
    let request: FiscalRequest = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse request: {}", request_path.display()))?;

    info!(
        jurisdiction = %request.profile.jurisdiction_id,
        categories = request.categories.len(),
        "Computing fiscal report"
    );

    let report = FiscalEngine::new(&dataset).report(&request);
    print_json(&report, args.pretty)
}
