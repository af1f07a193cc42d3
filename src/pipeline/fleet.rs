// src/pipeline/fleet.rs

//! Fleet orchestration over every configured station.

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, StationResult};
use crate::services::{ObservationSink, UpstreamSource};

use super::station::{RunOptions, StationPipeline};

/// Run every configured station in declaration order.
///
/// The upstream session is bootstrapped once and shared. A fetch failure in
/// any station aborts the run; upload failures only empty that station's
/// result.
pub async fn run_all(
    config: &Config,
    source: &dyn UpstreamSource,
    sink: &dyn ObservationSink,
    options: &RunOptions,
) -> Result<Vec<StationResult>> {
    let start_time = Local::now();
    source.bootstrap().await?;

    let pipeline = StationPipeline::new(config, source, sink);
    let stations = config.stations();
    log::info!("Syncing {} stations", stations.len());

    let mut results = Vec::with_capacity(stations.len());
    for station in stations {
        let result = pipeline
            .run(&station.code, Some(station.series_id), options)
            .await?;
        results.push(result);
    }

    log_summary(
        stations.iter().map(|s| s.code.as_str()).zip(&results),
        options,
        start_time,
    );
    Ok(results)
}

/// Run a single station, bootstrapping the session first.
pub async fn run_one(
    config: &Config,
    source: &dyn UpstreamSource,
    sink: &dyn ObservationSink,
    code: &str,
    series_id: Option<i64>,
    options: &RunOptions,
) -> Result<Vec<StationResult>> {
    let start_time = Local::now();
    // Resolve before bootstrapping so an unknown code makes no request.
    let series_id = match series_id {
        Some(id) => id,
        None => config.series_id(code)?,
    };
    source.bootstrap().await?;

    let result = StationPipeline::new(config, source, sink)
        .run(code, Some(series_id), options)
        .await?;

    log_summary(std::iter::once((code, &result)), options, start_time);
    Ok(vec![result])
}

fn log_summary<'r>(
    results: impl Iterator<Item = (&'r str, &'r StationResult)>,
    options: &RunOptions,
    start_time: chrono::DateTime<Local>,
) {
    let mut stations = 0usize;
    let mut records = 0usize;
    let mut empty = Vec::new();
    for (code, result) in results {
        stations += 1;
        records += result.len();
        if result.is_empty() {
            empty.push(code);
        }
    }

    let verb = if options.diagnostic { "inspected" } else { "created" };
    log::info!(
        "Sync finished in {}s: {} stations, {} observations {}",
        (Local::now() - start_time).num_seconds(),
        stations,
        records,
        verb
    );
    if !empty.is_empty() {
        log::info!("    Stations with empty results: {}", empty.join(", "));
    }
}
