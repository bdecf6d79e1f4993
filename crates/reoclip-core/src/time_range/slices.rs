//! Day slices: the unit of granularity the camera's search honors.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::iter::FusedIterator;

/// A half-open `[start, end)` sub-range that lies inside one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaySlice {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DaySlice {
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// The calendar day this slice belongs to.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Closed, whole-second window to send to the camera.
    ///
    /// The API takes inclusive second-granularity bounds, so the end is the
    /// last whole second that starts before the exclusive `end` (a slice
    /// ending at midnight queries up to 23:59:59 of its own day).
    pub fn query_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = truncate_to_second(self.start);
        let end = truncate_to_second(self.end - Duration::nanoseconds(1)).max(start);
        (start, end)
    }

    /// True if a clip spanning `[clip_start, clip_end)` overlaps this slice.
    /// A zero-length clip counts when its start lies inside the slice.
    pub fn overlaps(&self, clip_start: NaiveDateTime, clip_end: NaiveDateTime) -> bool {
        if clip_end <= clip_start {
            return clip_start >= self.start && clip_start < self.end;
        }
        clip_start < self.end && clip_end > self.start
    }
}

fn truncate_to_second(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}

/// Iterator over the day slices of a range. Cheap to clone; a clone
/// continues from the same position independently.
#[derive(Debug, Clone)]
pub struct DaySlices {
    cursor: NaiveDateTime,
    end: NaiveDateTime,
}

impl DaySlices {
    pub(super) fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { cursor: start, end }
    }

    fn remaining(&self) -> usize {
        if self.cursor >= self.end {
            return 0;
        }
        // A range ending exactly at midnight does not touch the day that starts there.
        let last_day = if self.end.time() == NaiveTime::MIN {
            self.end.date() - Duration::days(1)
        } else {
            self.end.date()
        };
        let days = (last_day - self.cursor.date()).num_days();
        usize::try_from(days + 1).unwrap_or(0)
    }
}

impl Iterator for DaySlices {
    type Item = DaySlice;

    fn next(&mut self) -> Option<DaySlice> {
        if self.cursor >= self.end {
            return None;
        }
        let next_midnight = self
            .cursor
            .date()
            .succ_opt()
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(self.end);
        let slice_end = next_midnight.min(self.end);
        let slice = DaySlice {
            start: self.cursor,
            end: slice_end,
        };
        self.cursor = slice_end;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for DaySlices {}

impl FusedIterator for DaySlices {}
