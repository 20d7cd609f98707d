//! callscan-ingest library interface
//!
//! Scans a directory of call recordings, keeps those whose filename carries
//! the target classification code, extracts per-file metadata in parallel
//! batches, and merges each batch into a CSV report.

pub mod config;
pub mod models;
pub mod services;

pub use crate::config::IngestConfig;
pub use crate::services::{RunOrchestrator, RunStatus};
