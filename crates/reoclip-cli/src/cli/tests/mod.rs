//! CLI parse and report tests.

use super::Cli;
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) const REQUIRED: [&str; 11] = [
    "reoclip",
    "--ip",
    "192.168.1.50",
    "--username",
    "admin",
    "--password",
    "secret",
    "--start-time",
    "2024-01-01",
    "--end-time",
    "2024-01-03",
];

mod report;
