// src/pipeline/station.rs

//! Per-station fetch → normalize → filter → upload pipeline.

use chrono::{Local, NaiveDateTime};

use crate::error::Result;
use crate::models::{Config, Observation, ObservationKind, StationResult};
use crate::services::{ObservationSink, UpstreamSource};

use super::fetch::ReadingFetcher;
use super::normalize::{filter_valid, normalize};

/// Date range and mode shared by every station in a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Fetch and normalize only, never upload
    pub diagnostic: bool,
    /// Instant used for "no begin" fetches and as the default end
    pub now: NaiveDateTime,
}

impl RunOptions {
    pub fn new(begin: Option<NaiveDateTime>, end: Option<NaiveDateTime>, diagnostic: bool) -> Self {
        Self {
            begin,
            end,
            diagnostic,
            now: Local::now().naive_local(),
        }
    }
}

/// Runs one station against shared upstream and sink handles.
pub struct StationPipeline<'a> {
    config: &'a Config,
    source: &'a dyn UpstreamSource,
    sink: &'a dyn ObservationSink,
}

impl<'a> StationPipeline<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn UpstreamSource,
        sink: &'a dyn ObservationSink,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Run the pipeline for `code`.
    ///
    /// Unknown stations and fetch failures are returned as errors. Upload
    /// failures are logged and reported as [`StationResult::Empty`].
    pub async fn run(
        &self,
        code: &str,
        series_id: Option<i64>,
        options: &RunOptions,
    ) -> Result<StationResult> {
        let series_id = match series_id {
            Some(id) => id,
            None => self.config.series_id(code)?,
        };

        let readings = ReadingFetcher::from_config(self.source, self.config)
            .fetch(code, options.begin, options.end, options.now)
            .await?;

        let observations = normalize(&readings, series_id, &self.config.timestamp_suffix());

        if options.diagnostic {
            log::info!(
                "Got {} observations for series_id {}, station {}",
                observations.len(),
                series_id,
                code
            );
            return Ok(StationResult::Inspected(observations));
        }

        let observations = filter_valid(observations);
        if observations.is_empty() {
            log::warn!(
                "{}: no valid observations for series {}. Skipping upload",
                code,
                series_id
            );
            return Ok(StationResult::Empty);
        }

        Ok(self.upload(code, series_id, &observations).await)
    }

    /// Upload a batch; any failure degrades to an empty result.
    async fn upload(&self, code: &str, series_id: i64, observations: &[Observation]) -> StationResult {
        match self
            .sink
            .create_observations(observations, series_id, ObservationKind::Puntual)
            .await
        {
            Ok(created) => {
                log::info!(
                    "{}: created {} of {} observations in series {}",
                    code,
                    created.len(),
                    observations.len(),
                    series_id
                );
                StationResult::Created(created)
            }
            Err(e) => {
                log::warn!("{}: upload failed: {}", code, e);
                StationResult::Empty
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RawReading;
    use crate::services::fakes::{FakeSink, FakeUpstream};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn options(diagnostic: bool) -> RunOptions {
        RunOptions {
            begin: None,
            end: None,
            diagnostic,
            now: now(),
        }
    }

    fn upstream_with(readings: Vec<RawReading>) -> FakeUpstream {
        FakeUpstream::new().with_window("SFER", "202502070000", readings)
    }

    #[tokio::test]
    async fn test_uploads_valid_observations() {
        let config = Config::default();
        let upstream = upstream_with(vec![
            RawReading::new("2025-02-07T00:00:00", Some(1.2)),
            RawReading::new("2025-02-07T01:00:00", None),
        ]);
        let sink = FakeSink::new();

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options(false))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        let uploads = sink.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, 52);
        assert_eq!(uploads[0].1[0].timestart, "2025-02-07T00:00:00.000-0300");
    }

    #[tokio::test]
    async fn test_all_null_returns_empty_without_upload() {
        let config = Config::default();
        let upstream = upstream_with(vec![RawReading::new("202502070000", None)]);
        let sink = FakeSink::new();

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options(false))
            .await
            .unwrap();

        assert_eq!(result, StationResult::Empty);
        assert!(sink.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_diagnostic_returns_unfiltered_without_upload() {
        let config = Config::default();
        let upstream = upstream_with(vec![
            RawReading::new("202502070000", None),
            RawReading::new("202502070100", Some(0.4)),
        ]);
        let sink = FakeSink::new();

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options(true))
            .await
            .unwrap();

        match result {
            StationResult::Inspected(obs) => {
                assert_eq!(obs.len(), 2);
                assert_eq!(obs[0].valor, None);
            }
            other => panic!("expected inspected observations, got {other:?}"),
        }
        assert!(sink.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_is_contained() {
        let config = Config::default();
        let upstream = upstream_with(vec![RawReading::new("202502070000", Some(1.2))]);
        let sink = FakeSink::new().failing_for(52);

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options(false))
            .await
            .unwrap();

        assert_eq!(result, StationResult::Empty);
        assert_eq!(sink.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_station_fails_before_network() {
        let config = Config::default();
        let upstream = FakeUpstream::new();
        let sink = FakeSink::new();

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("XXXX", None, &options(false))
            .await;

        assert!(matches!(result, Err(AppError::UnknownStation(code)) if code == "XXXX"));
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_series_id_skips_lookup() {
        let config = Config::default();
        let upstream = FakeUpstream::new().with_window(
            "XXXX",
            "202502070000",
            vec![RawReading::new("202502070000", Some(3.0))],
        );
        let sink = FakeSink::new();

        StationPipeline::new(&config, &upstream, &sink)
            .run("XXXX", Some(999), &options(false))
            .await
            .unwrap();

        let uploads = sink.uploads();
        assert_eq!(uploads[0].0, 999);
        assert_eq!(uploads[0].1[0].series_id, 999);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let config = Config::default();
        let upstream = FakeUpstream::new().failing_for("SFER", 404);
        let sink = FakeSink::new();

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options(false))
            .await;

        assert!(matches!(result, Err(AppError::Upstream { status: 404, .. })));
        assert!(sink.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_first_seen_null_is_not_corrected_by_later_window() {
        // Open question: a later window's value for a timestamp first seen as
        // null is discarded, so that timestamp is never uploaded.
        let config = Config::default();
        let upstream = FakeUpstream::new()
            .with_window("SFER", "202502070000", vec![RawReading::new("202502070500", None)])
            .with_window(
                "SFER",
                "202502071000",
                vec![RawReading::new("202502070500", Some(0.9))],
            );
        let sink = FakeSink::new();
        let options = RunOptions {
            begin: Some(now()),
            end: Some(now() + chrono::Duration::hours(10)),
            diagnostic: false,
            now: now(),
        };

        let result = StationPipeline::new(&config, &upstream, &sink)
            .run("SFER", None, &options)
            .await
            .unwrap();

        assert_eq!(result, StationResult::Empty);
        assert!(sink.uploads().is_empty());
    }
}
