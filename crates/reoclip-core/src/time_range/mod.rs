//! Requested time ranges and their split into calendar-day slices.
//!
//! The camera's Search command only returns per-clip entries when the query
//! window stays inside one calendar day; wider windows come back as a coarse
//! per-day bitmap. Every search therefore goes through a `DaySlice`.
//!
//! All instants are camera-local wall-clock time (`NaiveDateTime`): the
//! camera API speaks its own local time and no zone conversion happens.

mod parse;
mod slices;

pub use parse::parse_datetime;
pub use slices::{DaySlice, DaySlices};

use chrono::NaiveDateTime;

use crate::error::FetchError;

/// A half-open `[start, end)` range of camera-local instants, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, FetchError> {
        if start >= end {
            return Err(FetchError::Validation(format!(
                "start time {} must be before end time {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Lazy, restartable sequence of day slices covering this range.
    /// Call again (or clone the iterator) to start over.
    pub fn days(&self) -> DaySlices {
        DaySlices::new(self.start, self.end)
    }
}

impl IntoIterator for &TimeRange {
    type Item = DaySlice;
    type IntoIter = DaySlices;

    fn into_iter(self) -> DaySlices {
        self.days()
    }
}
