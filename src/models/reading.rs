//! Upstream reading structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One upstream sample from the hourly heights endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawReading {
    /// Upstream timestamp, kept verbatim
    pub fecha: String,

    /// Water level; `null` when the gauge reported nothing
    #[serde(default)]
    pub altura: Option<f64>,
}

impl RawReading {
    pub fn new(fecha: impl Into<String>, altura: Option<f64>) -> Self {
        Self {
            fecha: fecha.into(),
            altura,
        }
    }
}

/// Body of a `ValoresGrafico` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lecturas {
    #[serde(default)]
    pub lecturas: Vec<RawReading>,
}

impl Lecturas {
    /// Load a saved response document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Readings merged across overlapping windows.
///
/// Keeps first-seen order and drops any later reading whose `fecha` was
/// already recorded, even if the earlier one had no `altura`.
#[derive(Debug, Default)]
pub struct MergedReadingSet {
    readings: Vec<RawReading>,
    seen: HashSet<String>,
}

impl MergedReadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one window's readings, returning how many were new.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = RawReading>) -> usize {
        let before = self.readings.len();
        for reading in batch {
            if self.seen.insert(reading.fecha.clone()) {
                self.readings.push(reading);
            }
        }
        self.readings.len() - before
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn into_readings(self) -> Vec<RawReading> {
        self.readings
    }
}
