//! `datajoin` library crate.
//!
//! The binary (`dj`) is a thin wrapper around this library so that:
//!
//! - the ingest/merge pipeline is testable without spawning processes
//! - modules are reusable (e.g., future batch services, notebooks)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod merge;
