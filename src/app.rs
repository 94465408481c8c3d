//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - scans the target directory and runs the read/merge pipeline
//! - writes the joined report and the optional raw dump

use clap::Parser;
use log::info;

use crate::cli::Cli;
use crate::domain::JoinConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dj` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = join_config_from_args(&cli);

    let run = pipeline::run_join(&config)?;

    // Dump first; a later failure in the joined write leaves the dump
    // behind (not transactional).
    if let Some(path) = &config.dump {
        info!(
            "Dumping {} raw record(s) to '{}'",
            run.records.len(),
            path.display()
        );
        crate::io::export::write_dump(path, &run.records)?;
    }

    info!(
        "Writing {} merged row(s) to '{}'",
        run.points.len(),
        config.output.display()
    );
    crate::io::export::write_joined(&config.output, &run.points)?;

    Ok(())
}

pub fn join_config_from_args(cli: &Cli) -> JoinConfig {
    JoinConfig {
        directory: cli.directory.clone(),
        output: cli.output.clone(),
        dump: cli.dump.clone(),
    }
}
