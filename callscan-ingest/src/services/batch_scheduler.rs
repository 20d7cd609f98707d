//! Batch partitioning and per-batch parallel extraction
//!
//! The filtered file list is cut into fixed-size batches. Each batch gets its
//! own rayon pool (created here, dropped when the batch finishes), every file
//! is extracted on that pool, and the per-file `Result`s are joined back and
//! split into records and failures. A failing file never aborts its batch.

use crate::models::{Batch, FileRecord};
use crate::services::metadata_extractor::{ExtractError, MetadataExtractor};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Upper bound on worker threads per batch
pub const MAX_WORKERS: usize = 8;

/// Default number of files per batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Completed files between intra-batch progress lines
const PROGRESS_INTERVAL: usize = 100;

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Default worker count: available cores, capped at [`MAX_WORKERS`]
pub fn default_worker_count() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}

/// Cut `files` into batches of `batch_size` (last one may be shorter)
///
/// Batch indices start at 1. A zero batch size is treated as 1.
pub fn partition(files: &[String], batch_size: usize) -> Vec<Batch> {
    files
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(i, chunk)| Batch {
            index: i + 1,
            files: chunk.to_vec(),
        })
        .collect()
}

/// Result of extracting one batch
#[derive(Debug)]
pub struct BatchOutput {
    /// Successful records, in no particular order
    pub records: Vec<FileRecord>,
    /// Files dropped because extraction failed
    pub failures: Vec<(String, ExtractError)>,
    /// Wall time spent extracting
    pub elapsed: Duration,
}

/// Runs batches on a bounded, per-batch worker pool
#[derive(Clone)]
pub struct BatchScheduler {
    extractor: MetadataExtractor,
    workers: usize,
}

impl BatchScheduler {
    pub fn new(extractor: MetadataExtractor, workers: usize) -> Self {
        Self {
            extractor,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extract every file of `batch` in parallel and join the results
    pub fn run_batch(&self, dir: &Path, batch: &Batch) -> Result<BatchOutput, SchedulerError> {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("callscan-worker-{}", i))
            .build()?;

        let completed = AtomicUsize::new(0);
        let valid = AtomicUsize::new(0);
        let total = batch.len();

        let results: Vec<(String, Result<FileRecord, ExtractError>)> = pool.install(|| {
            batch
                .files
                .par_iter()
                .map(|name| {
                    let result = self.extract_contained(dir, name);
                    if result.is_ok() {
                        valid.fetch_add(1, Ordering::Relaxed);
                    }
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % PROGRESS_INTERVAL == 0 {
                        tracing::info!(
                            batch = batch.index,
                            "Progress: {}/{} - {} valid",
                            done,
                            total,
                            valid.load(Ordering::Relaxed)
                        );
                    }
                    (name.clone(), result)
                })
                .collect()
        });

        let mut records = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (name, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!(batch = batch.index, file = %name, error = %e, "Dropping file");
                    failures.push((name, e));
                }
            }
        }

        tracing::info!(
            batch = batch.index,
            "Batch extracted: {}/{} valid files",
            records.len(),
            total
        );

        Ok(BatchOutput {
            records,
            failures,
            elapsed: start.elapsed(),
        })
    }

    /// Extract one file, turning a panic into a per-file failure
    fn extract_contained(&self, dir: &Path, name: &str) -> Result<FileRecord, ExtractError> {
        match catch_unwind(AssertUnwindSafe(|| self.extractor.extract(dir, name))) {
            Ok(result) => result,
            Err(panic_payload) => {
                let panic_msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::warn!(file = %name, panic = %panic_msg, "Extraction panicked, dropping file");
                Err(ExtractError::Panicked(name.to_string(), panic_msg))
            }
        }
    }
}
