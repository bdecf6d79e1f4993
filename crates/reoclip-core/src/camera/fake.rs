//! In-memory camera used by unit tests.
//!
//! Behaves like the real search endpoint: a window inside one day returns
//! per-clip entries, a window spanning days returns only the day bitmap.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::sync::Mutex;

use super::types::{ApiTime, DayStatus, SearchResult, VodFile};
use super::{CameraClient, CameraError};
use crate::retry::TransportError;

#[derive(Clone)]
pub(crate) struct FakeClip {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub body: Vec<u8>,
    /// Size the search reports; defaults to the body length.
    pub reported_size: Option<u64>,
}

#[derive(Default)]
pub(crate) struct FakeCamera {
    clips: Vec<FakeClip>,
    /// Days whose search fails with a transport error.
    failing_days: HashSet<NaiveDate>,
    reject_auth: bool,
    /// Remaining forced failures per clip name; each writes half the body first.
    download_faults: Mutex<HashMap<String, u32>>,
    pub searches: Mutex<Vec<(NaiveDateTime, NaiveDateTime)>>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, name: &str, start: NaiveDateTime, end: NaiveDateTime, body: &[u8]) -> Self {
        self.clips.push(FakeClip {
            name: name.to_string(),
            start,
            end,
            body: body.to_vec(),
            reported_size: Some(body.len() as u64),
        });
        self
    }

    /// Clip whose search entry carries no size.
    pub fn with_unsized_clip(mut self, name: &str, start: NaiveDateTime, end: NaiveDateTime, body: &[u8]) -> Self {
        self.clips.push(FakeClip {
            name: name.to_string(),
            start,
            end,
            body: body.to_vec(),
            reported_size: None,
        });
        self
    }

    pub fn failing_search_on(mut self, day: NaiveDate) -> Self {
        self.failing_days.insert(day);
        self
    }

    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// The next `times` downloads of `name` drop the connection mid-body.
    pub fn failing_download(self, name: &str, times: u32) -> Self {
        self.download_faults
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    /// Month tables for every month the window touches, flagging each day
    /// with a recording regardless of the hours asked for.
    fn bitmap(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<DayStatus> {
        let mut months: BTreeMap<(i32, u32), Vec<u8>> = [start, end]
            .iter()
            .map(|t| ((t.year(), t.month()), vec![b'0'; 31]))
            .collect();
        for c in &self.clips {
            let d = c.start.date();
            if let Some(table) = months.get_mut(&(d.year(), d.month())) {
                table[d.day0() as usize] = b'1';
            }
        }
        months
            .into_iter()
            .map(|((year, mon), table)| DayStatus {
                year,
                mon,
                table: String::from_utf8(table).unwrap(),
            })
            .collect()
    }
}

impl CameraClient for FakeCamera {
    fn search(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<SearchResult, CameraError> {
        self.searches.lock().unwrap().push((start, end));
        if self.reject_auth {
            return Err(CameraError::Auth("login failed (rspCode -7)".to_string()));
        }
        if self.failing_days.contains(&start.date()) {
            return Err(TransportError::Http(500).into());
        }
        let status = self.bitmap(start, end);
        if start.date() != end.date() {
            return Ok(SearchResult {
                channel: 0,
                status,
                files: None,
            });
        }
        let files: Vec<VodFile> = self
            .clips
            .iter()
            .filter(|c| c.start <= end && c.end > start)
            .map(|c| VodFile {
                name: c.name.clone(),
                size: c.reported_size,
                start_time: ApiTime::from_naive(c.start),
                end_time: ApiTime::from_naive(c.end),
                stream_type: Some("main".to_string()),
            })
            .collect();
        Ok(SearchResult {
            channel: 0,
            status,
            files: if files.is_empty() { None } else { Some(files) },
        })
    }

    fn download(&self, clip_id: &str, sink: &mut dyn Write) -> Result<u64, CameraError> {
        self.downloads.lock().unwrap().push(clip_id.to_string());
        if self.reject_auth {
            return Err(CameraError::Auth("HTTP 401".to_string()));
        }
        let clip = self
            .clips
            .iter()
            .find(|c| c.name == clip_id)
            .ok_or(CameraError::Transport(TransportError::Http(404)))?;

        let fault = {
            let mut faults = self.download_faults.lock().unwrap();
            match faults.get_mut(clip_id) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        };
        if fault {
            let half = clip.body.len() / 2;
            sink.write_all(&clip.body[..half]).map_err(CameraError::Sink)?;
            return Err(TransportError::PartialTransfer {
                expected: clip.body.len() as u64,
                received: half as u64,
            }
            .into());
        }
        sink.write_all(&clip.body).map_err(CameraError::Sink)?;
        Ok(clip.body.len() as u64)
    }
}
