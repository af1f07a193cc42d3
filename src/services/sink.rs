// src/services/sink.rs

//! Downstream write API (a5 observations).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, CreatedObservation, Observation, ObservationKind};
use crate::utils::{http, join_url};

/// A destination that stores observation batches.
///
/// Implementations report every failure as `AppError::Upload` or
/// `AppError::EmptyBatch`.
#[async_trait]
pub trait ObservationSink: Send + Sync {
    async fn create_observations(
        &self,
        observations: &[Observation],
        series_id: i64,
        kind: ObservationKind,
    ) -> Result<Vec<CreatedObservation>>;
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    observaciones: &'a [Observation],
}

/// Bearer-token client for `POST /obs/{kind}/series/{id}/observaciones`.
pub struct A5Client {
    client: Client,
    base_url: String,
    token: String,
}

impl A5Client {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::create_api_client(config)?,
            base_url: config.api.url.clone(),
            token: config.api.token.clone(),
        })
    }

    /// Batch-create endpoint for a series.
    pub fn observations_url(&self, series_id: i64, kind: ObservationKind) -> String {
        join_url(
            &self.base_url,
            &[
                "obs",
                kind.as_str(),
                "series",
                &series_id.to_string(),
                "observaciones",
            ],
        )
    }
}

#[async_trait]
impl ObservationSink for A5Client {
    async fn create_observations(
        &self,
        observations: &[Observation],
        series_id: i64,
        kind: ObservationKind,
    ) -> Result<Vec<CreatedObservation>> {
        if observations.is_empty() {
            return Err(AppError::EmptyBatch(series_id));
        }

        let url = self.observations_url(series_id, kind);
        log::debug!("POST {} ({} observations)", url, observations.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&CreateRequest { observaciones: observations })
            .send()
            .await
            .map_err(|e| AppError::upload(series_id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upload(
                series_id,
                format!("server answered {status}: {}", body.trim()),
            ));
        }

        response
            .json::<Vec<CreatedObservation>>()
            .await
            .map_err(|e| AppError::upload(series_id, format!("unreadable response: {e}")))
    }
}
