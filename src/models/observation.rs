//! Downstream observation structures.

use serde::{Deserialize, Serialize, Serializer};

/// Observation kind accepted by the a5 write API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    Puntual,
    Areal,
}

impl ObservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationKind::Puntual => "puntual",
            ObservationKind::Areal => "areal",
        }
    }
}

/// A point-in-time observation in the a5 schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub timestart: String,
    pub timeend: String,
    pub valor: Option<f64>,
    pub series_id: i64,
}

/// A record acknowledged by the write API.
///
/// Only the fields used for logging are typed; anything else the server
/// returns is carried through to the output untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeend: Option<String>,
    #[serde(default)]
    pub valor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of one station pipeline run.
///
/// Serializes as a plain JSON array. `Empty` covers both "nothing valid to
/// upload" and "upload failed"; callers cannot tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum StationResult {
    /// Diagnostic mode: normalized, unfiltered observations
    Inspected(Vec<Observation>),
    /// Records created by the write API
    Created(Vec<CreatedObservation>),
    /// No upload took place, or it failed
    Empty,
}

impl StationResult {
    pub fn len(&self) -> usize {
        match self {
            StationResult::Inspected(obs) => obs.len(),
            StationResult::Created(created) => created.len(),
            StationResult::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for StationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StationResult::Inspected(obs) => obs.serialize(serializer),
            StationResult::Created(created) => created.serialize(serializer),
            StationResult::Empty => serializer.collect_seq(std::iter::empty::<Observation>()),
        }
    }
}
