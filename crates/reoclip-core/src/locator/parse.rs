//! Search response -> clip records, with degraded-response detection.

use chrono::{NaiveDate, NaiveDateTime};

use crate::camera::types::{SearchResult, VodFile};
use crate::clip::ClipRecord;
use crate::error::FetchError;

/// Parses the reply to a search over the closed window `[start, end]`.
///
/// The day bitmap flags whole days, so within a single day a reply without
/// file entries is simply an empty hour range. A window spanning days gets no
/// file entries from the camera at all; it is degraded when a day inside the
/// window is flagged.
pub(crate) fn clips_from_result(
    start: NaiveDateTime,
    end: NaiveDateTime,
    result: &SearchResult,
) -> Result<Vec<ClipRecord>, FetchError> {
    let files = result.files.as_deref().unwrap_or_default();
    if files.is_empty() {
        let (first_day, last_day) = (start.date(), end.date());
        if first_day == last_day {
            return Ok(Vec::new());
        }
        let flagged_days = result
            .flagged_days()
            .into_iter()
            .filter(|d| *d >= first_day && *d <= last_day)
            .count();
        if flagged_days > 0 {
            return Err(FetchError::DegradedResponse {
                start,
                end,
                flagged_days,
            });
        }
        return Ok(Vec::new());
    }

    let source_day = start.date();
    Ok(files
        .iter()
        .filter_map(|f| clip_from_file(f, source_day))
        .collect())
}

fn clip_from_file(file: &VodFile, source_day: NaiveDate) -> Option<ClipRecord> {
    if file.name.trim().is_empty() {
        tracing::warn!(day = %source_day, "search entry without a file name; skipped");
        return None;
    }
    let (Some(start), Some(end)) = (file.start_time.to_naive(), file.end_time.to_naive()) else {
        tracing::warn!(name = %file.name, "search entry with invalid timestamps; skipped");
        return None;
    };
    Some(ClipRecord {
        id: file.name.clone(),
        start,
        end,
        size_hint: file.size.filter(|n| *n > 0),
        source_day,
    })
}
