//! Utility functions and helpers.

pub mod dates;
pub mod http;

pub use dates::{days_before, format_window, parse_datetime};
pub use http::join_url;
