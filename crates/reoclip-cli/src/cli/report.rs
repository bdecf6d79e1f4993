//! User-facing progress lines and the end-of-run summary.

use reoclip_core::progress::{ClipOutcome, ProgressEvent};
use reoclip_core::run::RunSummary;
use std::fmt::Write as _;
use std::path::Path;

pub fn event_line(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::SliceSearched { day, clips } => {
            format!("Searching {}: {} recording(s)", day, clips)
        }
        ProgressEvent::SliceFailed { day, reason } => {
            format!("Searching {}: failed, skipped ({})", day, reason)
        }
        ProgressEvent::ClipsLocated { total } => format!("\nTotal found: {} recording(s)", total),
        ProgressEvent::ClipStarted {
            index,
            total,
            file_name,
        } => format!("Downloading [{}/{}]: {}...", index + 1, total, file_name),
        ProgressEvent::ClipFinished { path, outcome, .. } => match outcome {
            ClipOutcome::Downloaded { attempts, .. } if *attempts > 1 => {
                format!("  Saved to: {} (after {} attempts)", path.display(), attempts)
            }
            ClipOutcome::Downloaded { .. } => format!("  Saved to: {}", path.display()),
            ClipOutcome::Skipped => format!("  Already downloaded: {}", path.display()),
            ClipOutcome::Failed { reason } => format!("  Failed: {}", reason),
        },
    }
}

pub fn render_summary(summary: &RunSummary, output_dir: &Path) -> String {
    let dl = &summary.download;
    let mut out = String::new();
    let _ = writeln!(out);
    if let Some(name) = &summary.device_name {
        let _ = writeln!(out, "Camera: {}", name);
    }
    let _ = writeln!(
        out,
        "Searched {}/{} day(s), found {} recording(s)",
        summary.days_searched, summary.days, summary.clips_found
    );
    let _ = writeln!(
        out,
        "Downloaded {}, skipped {}, failed {} ({}) into {}",
        dl.succeeded,
        dl.skipped,
        dl.failed,
        human_bytes(dl.bytes_written),
        output_dir.display()
    );

    if !summary.slice_failures.is_empty() {
        let _ = writeln!(out, "Days that could not be searched:");
        for f in &summary.slice_failures {
            let _ = writeln!(out, "  {}: {}", f.slice.day(), f.error);
        }
    }
    if !dl.failures.is_empty() {
        let _ = writeln!(out, "Clips that failed:");
        for f in &dl.failures {
            let _ = writeln!(
                out,
                "  {}: {} ({} attempt(s))",
                f.clip.id, f.error, f.attempts
            );
        }
    }
    if summary.cancelled {
        let _ = writeln!(
            out,
            "Download cancelled by user; {} clip(s) not started",
            dl.not_started
        );
    }
    out
}

fn human_bytes(n: u64) -> String {
    const MIB: f64 = 1_048_576.0;
    if n >= 1_048_576 {
        format!("{:.1} MiB", n as f64 / MIB)
    } else if n >= 1024 {
        format!("{:.1} KiB", n as f64 / 1024.0)
    } else {
        format!("{} B", n)
    }
}
