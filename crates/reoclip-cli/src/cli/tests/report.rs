//! Progress lines and summary rendering.

use crate::cli::report::{event_line, render_summary};
use reoclip_core::clip::ClipRecord;
use reoclip_core::error::FetchError;
use reoclip_core::locator::SliceFailure;
use reoclip_core::orchestrator::{ClipFailure, DownloadSummary};
use reoclip_core::progress::{ClipOutcome, ProgressEvent};
use reoclip_core::retry::TransportError;
use reoclip_core::run::RunSummary;
use reoclip_core::time_range::{parse_datetime, TimeRange};
use std::path::{Path, PathBuf};

#[test]
fn clip_lines_count_from_one() {
    let line = event_line(&ProgressEvent::ClipStarted {
        index: 0,
        total: 4,
        file_name: "20240101_080000_a.mp4".into(),
    });
    assert_eq!(line, "Downloading [1/4]: 20240101_080000_a.mp4...");
}

#[test]
fn finished_lines() {
    let path = PathBuf::from("/out/x.mp4");
    let saved = event_line(&ProgressEvent::ClipFinished {
        index: 0,
        total: 1,
        path: path.clone(),
        outcome: ClipOutcome::Downloaded { bytes: 10, attempts: 1 },
    });
    assert_eq!(saved, "  Saved to: /out/x.mp4");
    let retried = event_line(&ProgressEvent::ClipFinished {
        index: 0,
        total: 1,
        path: path.clone(),
        outcome: ClipOutcome::Downloaded { bytes: 10, attempts: 3 },
    });
    assert!(retried.ends_with("(after 3 attempts)"));
    let skipped = event_line(&ProgressEvent::ClipFinished {
        index: 0,
        total: 1,
        path,
        outcome: ClipOutcome::Skipped,
    });
    assert!(skipped.starts_with("  Already downloaded"));
}

#[test]
fn summary_lists_failures() {
    let start = parse_datetime("2024-01-01").unwrap();
    let end = parse_datetime("2024-01-03").unwrap();
    let day2 = TimeRange::new(start, end).unwrap().days().nth(1).unwrap();
    let clip = ClipRecord {
        id: "Mp4Record/2024-01-01/a.mp4".into(),
        start,
        end: parse_datetime("2024-01-01 00:05").unwrap(),
        size_hint: None,
        source_day: start.date(),
    };
    let summary = RunSummary {
        device_name: Some("Driveway".into()),
        days: 2,
        days_searched: 2,
        slice_failures: vec![SliceFailure {
            slice: day2,
            error: FetchError::Transport(TransportError::Http(500)),
        }],
        clips_found: 1,
        download: DownloadSummary {
            failed: 1,
            failures: vec![ClipFailure {
                clip,
                destination: PathBuf::from("/out/a.mp4"),
                attempts: 5,
                error: FetchError::Transport(TransportError::Http(503)),
            }],
            ..DownloadSummary::default()
        },
        cancelled: false,
    };
    let text = render_summary(&summary, Path::new("/out"));
    assert!(text.contains("Camera: Driveway"));
    assert!(text.contains("Searched 2/2 day(s), found 1 recording(s)"));
    assert!(text.contains("Downloaded 0, skipped 0, failed 1 (0 B) into /out"));
    assert!(text.contains("  2024-01-02: HTTP 500"));
    assert!(text.contains("  Mp4Record/2024-01-01/a.mp4: HTTP 503 (5 attempt(s))"));
    assert!(!text.contains("cancelled"));
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn summary_mentions_cancellation() {
    let summary = RunSummary {
        days: 1,
        cancelled: true,
        download: DownloadSummary {
            not_started: 4,
            cancelled: true,
            ..DownloadSummary::default()
        },
        ..RunSummary::default()
    };
    let text = render_summary(&summary, Path::new("./downloads"));
    assert!(text.contains("Download cancelled by user; 4 clip(s) not started"));
    assert_eq!(summary.exit_code(), 130);
}
