//! Raw response shapes of the camera's JSON API.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Timestamp as the camera sends and expects it (camera-local wall clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTime {
    pub year: i32,
    pub mon: u32,
    pub day: u32,
    pub hour: u32,
    pub min: u32,
    pub sec: u32,
}

impl ApiTime {
    pub fn from_naive(t: NaiveDateTime) -> Self {
        Self {
            year: t.year(),
            mon: t.month(),
            day: t.day(),
            hour: t.hour(),
            min: t.minute(),
            sec: t.second(),
        }
    }

    /// `None` when the camera sent an impossible date or time.
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.mon, self.day)?.and_hms_opt(
            self.hour,
            self.min,
            self.sec,
        )
    }
}

/// `value.SearchResult` of a Search command.
///
/// A per-day query carries `File` entries. A query spanning several days
/// comes back with only the `Status` bitmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub channel: u8,
    #[serde(rename = "Status", default)]
    pub status: Vec<DayStatus>,
    #[serde(rename = "File", default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<VodFile>>,
}

impl SearchResult {
    /// Days the bitmap flags as having at least one recording.
    pub fn flagged_days(&self) -> Vec<NaiveDate> {
        self.status.iter().flat_map(|s| s.recorded_days()).collect()
    }
}

/// One month of the per-day presence bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub year: i32,
    pub mon: u32,
    /// One character per day of the month, `'1'` = has recordings.
    pub table: String,
}

impl DayStatus {
    pub fn recorded_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.table
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '1')
            .filter_map(move |(i, _)| {
                NaiveDate::from_ymd_opt(self.year, self.mon, u32::try_from(i + 1).ok()?)
            })
    }
}

/// One recorded file entry from a per-day search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VodFile {
    /// Camera path, e.g. `Mp4Record/2024-01-01/RecM01_20240101_080000_081500_...mp4`.
    pub name: String,
    /// Some firmwares send the size as a number, others as a string.
    #[serde(default, deserialize_with = "size_from_number_or_string")]
    pub size: Option<u64>,
    #[serde(rename = "StartTime")]
    pub start_time: ApiTime,
    #[serde(rename = "EndTime")]
    pub end_time: ApiTime,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<String>,
}

fn size_from_number_or_string<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// `value.DevInfo` of GetDevInfo; only what the CLI reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "firmVer", default)]
    pub firmware: String,
    #[serde(rename = "channelNum", default)]
    pub channel_count: u32,
}
