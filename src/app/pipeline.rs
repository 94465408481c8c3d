//! Shared ingest/merge pipeline.
//!
//! Keeping this in one place separates the workflow
//! (scan -> read -> merge) from presentation and file writing, and
//! lets tests drive a whole run without going through `main`.

use std::path::Path;

use log::info;

use crate::cli::discover;
use crate::domain::{JoinConfig, MergedPoint, Record};
use crate::error::AppError;
use crate::io::reader;
use crate::merge;

/// All computed outputs of a single `dj` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Raw per-file records, in processed (ascending path) order.
    pub records: Vec<Record>,
    /// Merged rows, in ascending (speed, shear rate) order.
    pub points: Vec<MergedPoint>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_join(config: &JoinConfig) -> Result<RunOutput, AppError> {
    info!(
        "Processing files in directory '{}'",
        config.directory.display()
    );
    let files = discover::collect_files(&config.directory)?;
    if files.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No instrument CSV exports found under '{}'.",
                config.directory.display()
            ),
        ));
    }

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        info!("Reading measurement data from '{}'", file_name(path));
        records.push(reader::read_record(path)?);
    }

    let points = merge::calculate_rates(&records)?;

    Ok(RunOutput { records, points })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use encoding_rs::WINDOWS_1251;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> JoinConfig {
        JoinConfig {
            directory: dir.path().to_path_buf(),
            output: dir.path().join("dj_joined.csv"),
            dump: None,
        }
    }

    fn write_export(dir: &TempDir, name: &str, stamp: &str, speed: i64, rate: f64, visc: f64) {
        let content = format!(
            ",,,\n,,,\n,,,\n,,,\n,,,\n,,,\n,,,\n\
             Запуск,строка,{stamp}\n\
             ,,,\n\
             Speed,Shear Rate,Viscosity,Shear Stress\n\
             {speed},{rate},{visc},0.5\n"
        );
        let (bytes, _, _) = WINDOWS_1251.encode(&content);
        fs::write(dir.path().join(name), &bytes).unwrap();
    }

    #[test]
    fn end_to_end_run_merges_strokes_across_files() {
        let dir = TempDir::new().unwrap();
        // Capture order deliberately disagrees with file-name order.
        write_export(&dir, "a.csv", "28.01.2023,10:03:00", 100, 50.0, 5.0);
        write_export(&dir, "b.csv", "28.01.2023,10:02:00", 200, 80.0, 2.0);
        write_export(&dir, "c.csv", "28.01.2023,10:01:00", 100, 50.0, 1.0);

        let run = run_join(&config(&dir)).unwrap();
        assert_eq!(run.records.len(), 3);
        assert_eq!(run.points.len(), 2);

        // (100, 50): forward from the earliest capture, reverse from the latest.
        assert_eq!(run.points[0].forward.viscosity, Value::Float(1.0));
        assert_eq!(
            run.points[0].reverse.as_ref().unwrap().viscosity,
            Value::Float(5.0)
        );
        // (200, 80) is the peak: duplicated single reading.
        assert_eq!(
            run.points[1].reverse.as_ref().unwrap().viscosity,
            Value::Float(2.0)
        );
    }

    #[test]
    fn own_outputs_in_the_scan_directory_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_export(&dir, "a.csv", "28.01.2023,10:01:00", 100, 50.0, 1.0);
        // A previous run's outputs; ingesting them would be circular.
        fs::write(dir.path().join("dj_joined.csv"), b"stale").unwrap();
        fs::write(dir.path().join("dj_dump.csv"), b"stale").unwrap();

        let run = run_join(&config(&dir)).unwrap();
        assert_eq!(run.records.len(), 1);
    }

    #[test]
    fn empty_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = run_join(&config(&dir)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn one_bad_file_fails_the_whole_batch() {
        let dir = TempDir::new().unwrap();
        write_export(&dir, "good.csv", "28.01.2023,10:01:00", 100, 50.0, 1.0);
        fs::write(dir.path().join("bad.csv"), b"a,b\n1,2\n").unwrap();

        let err = run_join(&config(&dir)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
