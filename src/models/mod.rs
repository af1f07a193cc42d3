// src/models/mod.rs

//! Domain models for the sync application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod observation;
mod reading;

// Re-export all public types
pub use config::{ApiConfig, Config, Station, StationMap};
pub use observation::{CreatedObservation, Observation, ObservationKind, StationResult};
pub use reading::{Lecturas, MergedReadingSet, RawReading};
