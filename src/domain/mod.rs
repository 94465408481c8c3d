//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - coerced CSV cell values (`Value`)
//! - per-file measurement records (`Record`)
//! - merge keys and output rows (`PointKey`, `StrokeReading`, `MergedPoint`)
//! - resolved run configuration (`JoinConfig`)

pub mod types;

pub use types::*;
