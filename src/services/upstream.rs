// src/services/upstream.rs

//! Upstream read API (SIHN hourly heights).
//!
//! The pipeline only sees the [`UpstreamSource`] trait. [`SihnClient`] talks
//! to the live service through one cookie-keeping session; [`FileSource`]
//! replays a saved `lecturas` document.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Response, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{Config, Lecturas, RawReading};
use crate::utils::{format_window, http, join_url};

/// A source of raw tide-gauge readings.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Prepare the shared session. Called once per run, before any read.
    async fn bootstrap(&self) -> Result<()>;

    /// Readings the service returns around `instant` for a station.
    async fn readings_at(&self, code: &str, instant: NaiveDateTime) -> Result<Vec<RawReading>>;
}

/// Live client for the `ValoresGrafico` endpoint.
pub struct SihnClient {
    client: Client,
    source_url: String,
    api_url: String,
    data_path: String,
    retries: u32,
}

impl SihnClient {
    /// Create a client with a fresh cookie session.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(http::create_session_client(config)?, config))
    }

    /// Create a client around an existing HTTP session.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            source_url: config.source_url.clone(),
            api_url: config.api_url.clone(),
            data_path: config.data_path.clone(),
            retries: config.retries,
        }
    }

    /// URL of the readings for one station around one instant.
    pub fn readings_url(&self, code: &str, instant: NaiveDateTime) -> String {
        join_url(
            &self.api_url,
            &[&self.data_path, code, &format_window(instant)],
        )
    }

    /// Send a GET, retrying only when no response came back at all.
    async fn get_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        "Request to {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.retries
                    );
                }
                Err(e) => return Err(AppError::Http(e)),
            }
        }
    }
}

#[async_trait]
impl UpstreamSource for SihnClient {
    async fn bootstrap(&self) -> Result<()> {
        log::debug!("Bootstrapping upstream session at {}", self.source_url);
        let response = self.get_with_retry(&self.source_url).await?;
        let status = response.status();
        if status.is_success() {
            log::info!("Upstream session ready ({})", status);
        } else {
            log::warn!(
                "Session bootstrap at {} answered {}; continuing without cookies",
                self.source_url,
                status
            );
        }
        Ok(())
    }

    async fn readings_at(&self, code: &str, instant: NaiveDateTime) -> Result<Vec<RawReading>> {
        let url = self.readings_url(code, instant);
        log::debug!("GET {}", url);

        let response = self.get_with_retry(&url).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                url,
            });
        }

        let body: Lecturas = response.json().await?;
        log::debug!("{} readings for {} at {}", body.lecturas.len(), code, instant);
        Ok(body.lecturas)
    }
}

/// Replays a saved upstream response for every requested instant.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    readings: Vec<RawReading>,
}

impl FileSource {
    pub fn new(readings: Vec<RawReading>) -> Self {
        Self { readings }
    }

    /// Load a `{"lecturas": [...]}` document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let lecturas = Lecturas::load(path)?;
        log::info!(
            "Loaded {} readings from {}",
            lecturas.lecturas.len(),
            path.display()
        );
        Ok(Self::new(lecturas.lecturas))
    }
}

#[async_trait]
impl UpstreamSource for FileSource {
    async fn bootstrap(&self) -> Result<()> {
        Ok(())
    }

    async fn readings_at(&self, _code: &str, _instant: NaiveDateTime) -> Result<Vec<RawReading>> {
        Ok(self.readings.clone())
    }
}
