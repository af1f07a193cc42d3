//! Pipeline entry points for sync operations.
//!
//! - `run_all`: Sync every configured station over one upstream session
//! - `run_one`: Sync a single station
//!
//! Stages, leaf-first: `window` plans fetch instants, `fetch` merges the
//! readings, `normalize` converts and filters them, `station` uploads.

pub mod fetch;
pub mod fleet;
pub mod normalize;
pub mod station;
pub mod window;

pub use fetch::ReadingFetcher;
pub use fleet::{run_all, run_one};
pub use normalize::{filter_valid, normalize};
pub use station::{RunOptions, StationPipeline};
pub use window::{Windows, plan_windows};
