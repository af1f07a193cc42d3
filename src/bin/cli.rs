//! sihn-sync CLI
//!
//! Fetches tide-gauge heights from SIHN and uploads them to a5 series.
//! Run without `--cod-mareografo` to sync every configured station.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use clap::{ArgGroup, Parser};
use sihn_sync::{
    config::load_config,
    error::Result,
    models::StationResult,
    pipeline::{self, RunOptions},
    services::{A5Client, FileSource, SihnClient, UpstreamSource},
    utils::{days_before, parse_datetime},
};

/// sihn-sync - SIHN tide gauge to a5 synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "sihn-sync",
    version,
    about = "Download SIHN tide-gauge heights and upload them to a5"
)]
#[command(group(ArgGroup::new("start").args(["begin", "relative_days"])))]
struct Cli {
    /// Config file (default: config/config.toml, then config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Station code, e.g. SFER (default: every configured station)
    #[arg(short = 'c', long = "cod-mareografo", value_name = "CODE")]
    station: Option<String>,

    /// Series id override for the selected station
    #[arg(short, long, requires = "station")]
    series_id: Option<i64>,

    /// Begin date (YYYY-MM-DD, YYYY-MM-DDTHH:MM, YYYYMMDD, YYYYMMDDHHMM, ...)
    #[arg(short, long, value_parser = parse_date_arg, conflicts_with = "relative_days")]
    begin: Option<NaiveDateTime>,

    /// End date (default: now); needs --begin or --relative-days
    #[arg(short, long, value_parser = parse_date_arg, requires = "start")]
    end: Option<NaiveDateTime>,

    /// Begin this many days before now
    #[arg(short, long, value_name = "DAYS")]
    relative_days: Option<u32>,

    /// Fetch and normalize only; do not upload to a5
    #[arg(short, long)]
    test: bool,

    /// Read a saved `lecturas` JSON file instead of calling SIHN
    #[arg(short, long, requires = "station")]
    input: Option<PathBuf>,

    /// Write results as JSON to this file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_datetime(value).map_err(|e| e.to_string())
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Write per-station results as a JSON array.
fn write_results(results: &[StationResult], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer(&mut writer, results)?;
            writer.flush()?;
            log::info!("Results written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer(&mut handle, results)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_path = std::env::current_dir()?;
    let config = load_config(&base_path, cli.config.as_deref())?;

    let mut options = RunOptions::new(cli.begin, cli.end, cli.test);
    if let Some(days) = cli.relative_days {
        options.begin = Some(days_before(options.now, days));
    }

    if let Some(begin) = options.begin {
        log::info!(
            "Fetching from {} to {} every {}h",
            begin,
            options.end.unwrap_or(options.now),
            config.dt_hours
        );
    }
    if options.diagnostic {
        log::info!("Test mode: observations will not be uploaded");
    }

    let source: Box<dyn UpstreamSource> = match &cli.input {
        Some(path) => Box::new(FileSource::load(path)?),
        None => Box::new(SihnClient::new(&config)?),
    };
    let sink = A5Client::new(&config)?;

    let results = match &cli.station {
        Some(code) => {
            pipeline::run_one(
                &config,
                source.as_ref(),
                &sink,
                code,
                cli.series_id,
                &options,
            )
            .await?
        }
        None => pipeline::run_all(&config, source.as_ref(), &sink, &options).await?,
    };

    write_results(&results, cli.output.as_deref())?;
    Ok(())
}
