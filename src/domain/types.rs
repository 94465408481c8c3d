//! Shared domain types.
//!
//! These types are intentionally kept lightweight: records are built
//! once by the reader, consumed read-only by the merger, and
//! serialized by the writers. Nothing persists across runs.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::NaiveDateTime;

/// A single CSV cell after best-effort numeric coercion.
///
/// Integer parse is attempted first, then float; anything else stays
/// text. Decimal points only: the instrument does not emit
/// locale-formatted numbers, locale adaptation happens on output.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerce a textual cell into the most specific value.
    pub fn coerce(cell: &str) -> Value {
        if let Ok(i) = cell.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(cell.to_string())
    }
}

impl Ord for Value {
    /// Total order over mixed cells: numerics compare numerically
    /// (across `Int`/`Float`), any numeric sorts before any text, text
    /// compares lexicographically. Float comparisons use `total_cmp`
    /// so the order is total even for pathological inputs.
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Int(_) | Float(_), Text(_)) => Ordering::Less,
            (Text(_), Int(_) | Float(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// Identifies one physical measurement point: (speed, shear rate),
/// independent of which stroke produced the reading.
///
/// Ordering is speed first, shear rate second; this is also the final
/// report row order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PointKey {
    pub speed: Value,
    pub shear_rate: Value,
}

/// The measured pair a single stroke produces at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeReading {
    pub viscosity: Value,
    pub shear_stress: Value,
}

/// One output row of the joined report.
///
/// `reverse` is absent when only the forward stroke was observed; the
/// writer emits 4 cells in that case and 6 otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPoint {
    pub key: PointKey,
    pub forward: StrokeReading,
    pub reverse: Option<StrokeReading>,
}

impl MergedPoint {
    /// Flatten into the writer's cell sequence (4 or 6 values).
    pub fn cells(&self) -> Vec<Value> {
        let mut cells = vec![
            self.key.speed.clone(),
            self.key.shear_rate.clone(),
            self.forward.viscosity.clone(),
            self.forward.shear_stress.clone(),
        ];
        if let Some(reverse) = &self.reverse {
            cells.push(reverse.viscosity.clone());
            cells.push(reverse.shear_stress.clone());
        }
        cells
    }
}

/// One ingested instrument file: capture timestamp plus the fields the
/// export's trailing header row names.
///
/// Field order is preserved as read so the raw dump reproduces the
/// instrument's own column order.
#[derive(Debug, Clone)]
pub struct Record {
    pub dt: NaiveDateTime,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(dt: NaiveDateTime, fields: Vec<(String, Value)>) -> Record {
        Record { dt, fields }
    }

    /// Look up a field by its header name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Field names in instrument column order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct JoinConfig {
    /// Directory scanned (recursively) for instrument exports.
    pub directory: PathBuf,
    /// Joined report destination.
    pub output: PathBuf,
    /// Raw dump destination; `None` means no dump is written.
    pub dump: Option<PathBuf>,
}
