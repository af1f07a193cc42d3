// src/pipeline/window.rs

//! Fetch window planning.
//!
//! The upstream endpoint answers with readings around a single instant, so a
//! date range is covered by requesting `begin, begin + step, ...` while the instant
//! is still `<= end`.

use chrono::{Duration, NaiveDateTime};

/// Lazy, finite sequence of window instants.
#[derive(Debug, Clone)]
pub struct Windows {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    step: Duration,
}

/// Plan windows from `begin` to `end` (inclusive) every `step`.
///
/// Yields nothing when `begin > end`. A non-positive step yields `begin` once.
pub fn plan_windows(begin: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Windows {
    Windows {
        next: Some(begin),
        end,
        step,
    }
}

impl Iterator for Windows {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        let current = self.next.filter(|t| *t <= self.end)?;
        self.next = if self.step > Duration::zero() {
            current.checked_add_signed(self.step)
        } else {
            None
        };
        Some(current)
    }
}
