//! Service layer for the sync application.
//!
//! This module contains the network seams:
//! - Upstream readings (`UpstreamSource`, `SihnClient`, `FileSource`)
//! - Downstream observations (`ObservationSink`, `A5Client`)

mod sink;
mod upstream;

#[cfg(test)]
pub(crate) mod fakes;

pub use sink::{A5Client, ObservationSink};
pub use upstream::{FileSource, SihnClient, UpstreamSource};
