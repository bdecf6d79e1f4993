//! Normalized clip metadata produced by the recording locator.

use chrono::{NaiveDate, NaiveDateTime};

/// One recorded clip on the camera.
///
/// `id` is the camera's file name/path and is the deduplication key: the same
/// clip reported by two overlapping day searches has the same `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRecord {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Size in bytes as reported by the camera, when it reports one.
    pub size_hint: Option<u64>,
    /// Day of the slice whose search first reported this clip.
    pub source_day: NaiveDate,
}

impl ClipRecord {
    /// Clip length in whole seconds (0 if the camera reported end <= start).
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds().max(0)
    }
}
