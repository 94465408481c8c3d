//! Forward/reverse stroke merging.
//!
//! The instrument measures each (speed, shear rate) point twice: once
//! on the rising speed ramp, once on the falling ramp. Exports carry
//! no stroke flag, so the two readings are told apart by capture
//! order: at a given point the earlier reading is the forward stroke,
//! the later one the reverse stroke. The ramp's peak point is the
//! exception: the two ramps meet there and it is measured exactly
//! once, so its single reading stands in for both strokes.

use std::collections::BTreeMap;

use crate::domain::{MergedPoint, PointKey, Record, StrokeReading, Value};
use crate::error::AppError;

/// Field names the join consumes from each record.
pub mod field {
    pub const SPEED: &str = "Speed";
    pub const SHEAR_RATE: &str = "Shear Rate";
    pub const VISCOSITY: &str = "Viscosity";
    pub const SHEAR_STRESS: &str = "Shear Stress";
}

/// Per-point accumulation state. Absence from the fold map is the
/// implicit empty state.
#[derive(Debug, Clone)]
enum PointState {
    /// Only the forward-stroke reading has been seen.
    ForwardOnly(StrokeReading),
    /// Both strokes accounted for; further readings carry no new
    /// information and are dropped.
    Complete(StrokeReading, StrokeReading),
}

impl PointState {
    /// Fold in the next chronological reading at a non-peak point.
    ///
    /// The second occurrence of a point is taken to be the
    /// reverse-stroke reading. That is positional knowledge about the
    /// ramp schedule, not something the data states; if the instrument
    /// ever grows an explicit stroke flag, this is the one place to
    /// consult it.
    fn observe(state: Option<PointState>, reading: StrokeReading) -> PointState {
        match state {
            None => PointState::ForwardOnly(reading),
            Some(PointState::ForwardOnly(forward)) => PointState::Complete(forward, reading),
            Some(complete @ PointState::Complete(..)) => complete,
        }
    }

    /// The peak point's single reading populates both stroke slots,
    /// replacing any earlier partial state for that key.
    fn peak(reading: StrokeReading) -> PointState {
        PointState::Complete(reading.clone(), reading)
    }

    fn into_merged(self, key: PointKey) -> MergedPoint {
        match self {
            PointState::ForwardOnly(forward) => MergedPoint {
                key,
                forward,
                reverse: None,
            },
            PointState::Complete(forward, reverse) => MergedPoint {
                key,
                forward,
                reverse: Some(reverse),
            },
        }
    }
}

/// Merge per-file records into one row per measurement point.
///
/// Records are folded in capture order (ascending `DT`); output rows
/// come back in ascending (speed, shear rate) order regardless of how
/// the files were processed.
pub fn calculate_rates(records: &[Record]) -> Result<Vec<MergedPoint>, AppError> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|record| record.dt);

    let mut readings = Vec::with_capacity(sorted.len());
    for record in sorted {
        readings.push((point_key(record)?, stroke_reading(record)?));
    }

    let Some(peak) = readings.iter().map(|(key, _)| key).max().cloned() else {
        return Err(AppError::new(3, "No measurement records to merge."));
    };

    let mut merged: BTreeMap<PointKey, PointState> = BTreeMap::new();
    for (key, reading) in readings {
        let state = if key == peak {
            PointState::peak(reading)
        } else {
            PointState::observe(merged.remove(&key), reading)
        };
        merged.insert(key, state);
    }

    Ok(merged
        .into_iter()
        .map(|(key, state)| state.into_merged(key))
        .collect())
}

fn point_key(record: &Record) -> Result<PointKey, AppError> {
    Ok(PointKey {
        speed: required_field(record, field::SPEED)?,
        shear_rate: required_field(record, field::SHEAR_RATE)?,
    })
}

fn stroke_reading(record: &Record) -> Result<StrokeReading, AppError> {
    Ok(StrokeReading {
        viscosity: required_field(record, field::VISCOSITY)?,
        shear_stress: required_field(record, field::SHEAR_STRESS)?,
    })
}

fn required_field(record: &Record, name: &str) -> Result<Value, AppError> {
    record.get(name).cloned().ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "Record captured {} is missing the '{name}' channel.",
                record.dt
            ),
        )
    })
}
