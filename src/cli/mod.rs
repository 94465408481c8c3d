//! Command-line parsing for the report builder.
//!
//! The goal of this module is to keep **argument parsing** and **file
//! discovery** separate from the ingest/merge pipeline.

use std::path::PathBuf;

use clap::Parser;

pub mod discover;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "dj",
    version,
    about = "Consolidates Brookfield DV2 viscometer run exports into a single joined report"
)]
pub struct Cli {
    /// Directory containing the instrument's CSV exports (scanned
    /// recursively).
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Joined report file name.
    #[arg(short, long, value_name = "FILE", default_value = "dj_joined.csv")]
    pub output: PathBuf,

    /// Also dump every ingested record as-is, optionally to FILE.
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "dj_dump.csv"
    )]
    pub dump: Option<PathBuf>,
}
