//! Instrument export ingest.
//!
//! Each export is a semi-structured CSV: a preamble of metadata rows
//! (the 8th row carries the capture date and time), measurement block
//! rows, and a trailing header/value row pair naming the instrument's
//! channels. Only the timestamp and the trailing pair are extracted;
//! everything in between is instrument chatter.
//!
//! Malformed exports are fatal: the batch is only meaningful when
//! every run contributes its record, so there is no skip-and-continue.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1251;

use crate::domain::{Record, Value};
use crate::error::AppError;
use crate::io::dialect::{self, Dialect};

/// Grid row (0-based) holding the capture date and time cells.
const TIMESTAMP_ROW: usize = 7;
/// Cell positions of the date and time strings within that row.
const DATE_CELL: usize = 2;
const TIME_CELL: usize = 3;

/// Capture timestamp renditions seen across firmware revisions.
///
/// Tried in order; the set is deterministic on purpose (no
/// guess-the-locale heuristics).
const DT_FORMATS: [&str; 8] = [
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %H:%M:%S",
];

/// Read one instrument export into a measurement record.
pub fn read_record(path: &Path) -> Result<Record, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;

    // Single-byte Cyrillic; decoding cannot fail, every byte maps.
    let (content, _, _) = WINDOWS_1251.decode(&bytes);

    let grid = parse_grid(&content, dialect::sniff(&content))
        .map_err(|e| AppError::new(3, format!("'{}': malformed CSV: {e}", path.display())))?;

    record_from_grid(path, &grid)
}

/// Parse the full content as a headerless 2D grid of text cells.
fn parse_grid(content: &str, dialect: Dialect) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let row = result?;
        grid.push(row.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

fn record_from_grid(path: &Path, grid: &[Vec<String>]) -> Result<Record, AppError> {
    if grid.len() < TIMESTAMP_ROW + 1 {
        return Err(AppError::new(
            3,
            format!(
                "'{}': truncated export ({} rows, expected at least {})",
                path.display(),
                grid.len(),
                TIMESTAMP_ROW + 1
            ),
        ));
    }

    let dt = parse_timestamp(path, &grid[TIMESTAMP_ROW])?;

    let names = &grid[grid.len() - 2];
    let values = &grid[grid.len() - 1];
    if names.len() != values.len() {
        return Err(AppError::new(
            3,
            format!(
                "'{}': trailing header/value rows disagree ({} names vs {} values)",
                path.display(),
                names.len(),
                values.len()
            ),
        ));
    }

    let fields = names
        .iter()
        .zip(values)
        .map(|(name, value)| (name.clone(), Value::coerce(value)))
        .collect();

    Ok(Record::new(dt, fields))
}

fn parse_timestamp(path: &Path, row: &[String]) -> Result<NaiveDateTime, AppError> {
    let (Some(date), Some(time)) = (row.get(DATE_CELL), row.get(TIME_CELL)) else {
        return Err(AppError::new(
            3,
            format!(
                "'{}': capture date/time cells missing from row {}",
                path.display(),
                TIMESTAMP_ROW + 1
            ),
        ));
    };

    let stamp = format!("{date} {time}");
    parse_datetime(&stamp).ok_or_else(|| {
        AppError::new(
            3,
            format!("'{}': unparseable capture timestamp '{stamp}'", path.display()),
        )
    })
}

fn parse_datetime(stamp: &str) -> Option<NaiveDateTime> {
    DT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stamp, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write a windows-1251 encoded export and return its path.
    fn write_export(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let (bytes, _, _) = WINDOWS_1251.encode(content);
        let path = dir.path().join(name);
        fs::write(&path, &bytes).unwrap();
        path
    }

    /// A minimal but structurally faithful export: metadata preamble,
    /// timestamp on row 8, then the trailing header/value pair.
    fn sample_export(delimiter: char) -> String {
        let d = delimiter;
        format!(
            "Вискозиметр{d}DV2T{d}{d}\n\
             Образец{d}проба 7{d}{d}\n\
             {d}{d}{d}\n\
             Оператор{d}АЗ{d}{d}\n\
             {d}{d}{d}\n\
             {d}{d}{d}\n\
             {d}{d}{d}\n\
             Запуск{d}строка{d}28.01.2023{d}10:15:30\n\
             {d}{d}{d}\n\
             Speed{d}Shear Rate{d}Viscosity{d}Shear Stress\n\
             100{d}50{d}12.5{d}3.1\n"
        )
    }

    #[test]
    fn reads_comma_delimited_export() {
        let dir = TempDir::new().unwrap();
        let path = write_export(&dir, "run1.csv", &sample_export(','));

        let record = read_record(&path).unwrap();
        let expected_dt = NaiveDate::from_ymd_opt(2023, 1, 28)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap();
        assert_eq!(record.dt, expected_dt);
        assert_eq!(record.get("Speed"), Some(&Value::Int(100)));
        assert_eq!(record.get("Shear Rate"), Some(&Value::Int(50)));
        assert_eq!(record.get("Viscosity"), Some(&Value::Float(12.5)));
        assert_eq!(record.get("Shear Stress"), Some(&Value::Float(3.1)));
    }

    #[test]
    fn reads_semicolon_delimited_export() {
        let dir = TempDir::new().unwrap();
        let path = write_export(&dir, "run2.csv", &sample_export(';'));

        let record = read_record(&path).unwrap();
        assert_eq!(record.get("Viscosity"), Some(&Value::Float(12.5)));
    }

    #[test]
    fn cyrillic_labels_survive_decoding() {
        let dir = TempDir::new().unwrap();
        let mut content = sample_export(',');
        content = content.replace("Shear Stress", "Напряжение сдвига");
        let path = write_export(&dir, "run3.csv", &content);

        let record = read_record(&path).unwrap();
        assert_eq!(record.get("Напряжение сдвига"), Some(&Value::Float(3.1)));
    }

    #[test]
    fn truncated_export_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_export(&dir, "short.csv", "a,b\n1,2\n");

        let err = read_record(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn ragged_trailing_rows_are_fatal() {
        let dir = TempDir::new().unwrap();
        let mut content = sample_export(',');
        // Drop the last value so names and values disagree in length.
        content = content.replace("100,50,12.5,3.1\n", "100,50,12.5\n");
        let path = write_export(&dir, "ragged.csv", &content);

        let err = read_record(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("disagree"));
    }

    #[test]
    fn unparseable_timestamp_is_fatal() {
        let dir = TempDir::new().unwrap();
        let content = sample_export(',').replace("28.01.2023", "вчера");
        let path = write_export(&dir, "baddate.csv", &content);

        let err = read_record(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn missing_file_is_fatal_with_exit_2() {
        let dir = TempDir::new().unwrap();
        let err = read_record(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn timestamp_formats_cover_firmware_variants() {
        for stamp in [
            "28.01.2023 10:15:30",
            "28.01.2023 10:15",
            "28/01/2023 10:15:30",
            "2023-01-28 10:15:30",
            "01/28/23 10:15:30",
        ] {
            assert!(parse_datetime(stamp).is_some(), "failed on '{stamp}'");
        }
        assert!(parse_datetime("28th of January").is_none());
    }
}
