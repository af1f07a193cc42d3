// src/pipeline/normalize.rs

//! Reading → observation transform and null filter.

use crate::models::{Observation, RawReading};

/// Turn raw readings into point observations for a series.
///
/// `suffix` is appended to `fecha` as-is; no timezone conversion happens.
/// Null heights are kept.
pub fn normalize(readings: &[RawReading], series_id: i64, suffix: &str) -> Vec<Observation> {
    readings
        .iter()
        .map(|reading| {
            let timestamp = format!("{}{}", reading.fecha, suffix);
            Observation {
                timestart: timestamp.clone(),
                timeend: timestamp,
                valor: reading.altura,
                series_id,
            }
        })
        .collect()
}

/// Drop observations without a measured value.
pub fn filter_valid(observations: Vec<Observation>) -> Vec<Observation> {
    observations
        .into_iter()
        .filter(|obs| obs.valor.is_some())
        .collect()
}
