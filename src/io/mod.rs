//! Input/output helpers.
//!
//! - per-file CSV dialect detection (`dialect`)
//! - instrument export ingest (`reader`)
//! - joined report + raw dump writers (`export`)

pub mod dialect;
pub mod export;
pub mod reader;

pub use dialect::*;
pub use export::*;
pub use reader::*;
