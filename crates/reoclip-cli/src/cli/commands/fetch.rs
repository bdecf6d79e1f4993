//! `reoclip --ip ... --start-time ... --end-time ...` – search and download.

use anyhow::{Context, Result};
use reoclip_core::config::ReoclipConfig;
use reoclip_core::control::CancelToken;
use reoclip_core::progress::ProgressEvent;
use reoclip_core::run::{self, RunRequest, EXIT_CANCELLED};
use reoclip_core::time_range::parse_datetime;

use crate::cli::{report, Cli};

pub async fn run_fetch(cli: &Cli, cfg: ReoclipConfig) -> Result<i32> {
    let start = parse_datetime(&cli.start_time).context("--start-time")?;
    let end = parse_datetime(&cli.end_time).context("--end-time")?;
    let req = RunRequest {
        host: cli.ip.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        start,
        end,
        output_dir: cli.output.clone(),
    };
    tracing::info!(host = %req.host, %start, %end, output = %req.output_dir.display(), "fetch requested");

    println!("Connecting to camera at {}...", req.host);

    // First Ctrl-C lets the current clip finish into its temp file; a second
    // one exits immediately.
    let cancel = CancelToken::new();
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current transfer (Ctrl-C again to quit now)...");
            ctrlc_cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Download cancelled by user");
                std::process::exit(EXIT_CANCELLED);
            }
        }
    });

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            println!("{}", report::event_line(&event));
        }
    });

    let output_dir = req.output_dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        run::run(&req, &cfg, Some(&cancel), Some(&progress_tx))
    })
    .await
    .context("fetch task panicked")?;
    let _ = printer.await;

    let summary = result?;
    print!("{}", report::render_summary(&summary, &output_dir));
    tracing::info!(exit_code = summary.exit_code(), "fetch finished");
    Ok(summary.exit_code())
}
