//! Joined report and raw dump writers.
//!
//! Consumers open the joined report in Russian-locale spreadsheets, so
//! floats are written with a comma decimal separator; integers and
//! text pass through untouched. Both writers truncate and fully
//! rewrite their target; there is no partial-write recovery.

use std::fs::File;
use std::path::Path;

use crate::domain::{MergedPoint, Record, Value};
use crate::error::AppError;

/// Column labels of the joined report, in the instrument's own report
/// language.
pub const JOINED_HEADER: [&str; 6] = [
    "Скорость, об/мин",
    "Скорость сдвига, с^-1",
    "Вязкость, прямой ход; сПз",
    "Напряжение сдвига, прямой ход; дин/см^2",
    "Вязкость, обратный ход; сПз",
    "Напряжение сдвига, обратный ход; дин/см^2",
];

/// Name of the synthetic capture-timestamp column in the dump.
const DT_COLUMN: &str = "DT";

/// Dump rendition of the capture timestamp.
const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write the joined report: fixed header, one row per measurement
/// point. Rows are 4 cells wide when only the forward stroke was
/// observed and 6 when both were.
pub fn write_joined(path: &Path, points: &[MergedPoint]) -> Result<(), AppError> {
    let mut writer = csv_writer(path)?;

    writer
        .write_record(JOINED_HEADER)
        .map_err(|e| write_error(path, e))?;

    for point in points {
        let cells: Vec<String> = point.cells().iter().map(stringify).collect();
        writer
            .write_record(&cells)
            .map_err(|e| write_error(path, e))?;
    }

    writer.flush().map_err(|e| write_error(path, e))
}

/// Dump raw records as read, one row per source file in processed
/// order.
///
/// The header is the first record's field set with the capture
/// timestamp first. Later records are serialized by field name: a
/// record missing one of those names yields an empty cell, and fields
/// the first record does not carry are not emitted.
pub fn write_dump(path: &Path, records: &[Record]) -> Result<(), AppError> {
    let Some(first) = records.first() else {
        return Err(AppError::new(3, "No measurement records to dump."));
    };

    let mut writer = csv_writer(path)?;

    let mut header = vec![DT_COLUMN];
    header.extend(first.field_names());
    writer
        .write_record(&header)
        .map_err(|e| write_error(path, e))?;

    for record in records {
        let mut row = Vec::with_capacity(header.len());
        row.push(record.dt.format(DT_FORMAT).to_string());
        for name in first.field_names() {
            row.push(record.get(name).map(stringify).unwrap_or_default());
        }
        writer
            .write_record(&row)
            .map_err(|e| write_error(path, e))?;
    }

    writer.flush().map_err(|e| write_error(path, e))
}

/// Render a cell for spreadsheet consumption.
///
/// Floats swap the decimal point for a comma; everything else is the
/// plain textual form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string().replace('.', ","),
        Value::Text(t) => t.clone(),
    }
}

/// CRLF-terminated comma writer; `flexible` because joined rows are 4
/// or 6 cells wide under a 6-column header.
fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::new(2, format!("Failed to write '{}': {e}", path.display()))
}
