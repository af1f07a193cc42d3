// src/pipeline/fetch.rs

//! Deduplicating reading fetcher.

use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};

use crate::error::Result;
use crate::models::{Config, MergedReadingSet, RawReading};
use crate::services::UpstreamSource;

use super::window::plan_windows;

/// Drives window planning against an upstream source for one station.
pub struct ReadingFetcher<'a> {
    source: &'a dyn UpstreamSource,
    step: Duration,
    delay: StdDuration,
}

impl<'a> ReadingFetcher<'a> {
    pub fn new(source: &'a dyn UpstreamSource, step: Duration) -> Self {
        Self {
            source,
            step,
            delay: StdDuration::ZERO,
        }
    }

    /// Fetcher using the step and request pause from configuration.
    pub fn from_config(source: &'a dyn UpstreamSource, config: &Config) -> Self {
        Self {
            source,
            step: config.window_step(),
            delay: config.request_delay(),
        }
    }

    /// Fetch readings for `code`.
    ///
    /// - No `begin`: one request at `now`, readings returned as received.
    /// - `begin <= end` (end defaults to `now`): one request per window,
    ///   merged first-seen-wins on `fecha`.
    /// - `begin > end`: one request at `begin`.
    ///
    /// The first failing request aborts the whole fetch.
    pub async fn fetch(
        &self,
        code: &str,
        begin: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<Vec<RawReading>> {
        let Some(begin) = begin else {
            return self.source.readings_at(code, now).await;
        };
        let end = end.unwrap_or(now);

        let mut windows = plan_windows(begin, end, self.step).peekable();
        if windows.peek().is_none() {
            log::warn!(
                "{}: begin {} is after end {}; fetching a single window at begin",
                code,
                begin,
                end
            );
            return self.source.readings_at(code, begin).await;
        }

        let mut merged = MergedReadingSet::new();
        let mut window_count = 0usize;
        let mut received = 0usize;

        while let Some(instant) = windows.next() {
            let batch = self.source.readings_at(code, instant).await?;
            received += batch.len();
            let added = merged.extend(batch);
            window_count += 1;
            log::debug!("{}: window {} added {} new readings", code, instant, added);

            if !self.delay.is_zero() && windows.peek().is_some() {
                tokio::time::sleep(self.delay).await;
            }
        }

        log::debug!(
            "{}: {} windows, {} readings received, {} unique",
            code,
            window_count,
            received,
            merged.len()
        );
        Ok(merged.into_readings())
    }
}
