//! Per-batch and per-run statistics
//!
//! Throughput is records per second of the batch's wall time; the ETA is a
//! straight-line projection of the last batch's time over the batches left.

use crate::services::report_writer::PersistOutcome;
use std::path::PathBuf;
use std::time::Duration;

/// How a batch's records were persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Saved(PersistOutcome),
    /// Neither the report nor a backup could be written
    Failed(String),
}

/// Outcome of one batch, handed to observers
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 1-based batch index
    pub index: usize,
    pub total_batches: usize,
    /// Files submitted to the workers
    pub files: usize,
    /// Records extracted successfully
    pub records: usize,
    /// Files dropped during extraction
    pub failures: usize,
    pub status: BatchStatus,
    /// Extraction plus persistence
    pub elapsed: Duration,
}

impl BatchReport {
    /// Records per second for this batch
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }

    /// Estimated time for the remaining batches, `None` after the last one
    pub fn eta(&self) -> Option<Duration> {
        let remaining = self.total_batches.saturating_sub(self.index);
        (remaining > 0).then(|| linear_eta(remaining, self.elapsed))
    }
}

/// Remaining time assuming every batch takes as long as `last_batch`
pub fn linear_eta(batches_remaining: usize, last_batch: Duration) -> Duration {
    last_batch.saturating_mul(batches_remaining.min(u32::MAX as usize) as u32)
}

/// Final result of a run that had files to process
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files accepted by the scanner
    pub files_found: usize,
    pub batches: usize,
    /// Records extracted across all batches
    pub records_extracted: usize,
    /// Files dropped during extraction
    pub files_failed: usize,
    /// Rows in the final report as read back from disk
    pub report_rows: usize,
    /// Backup files written when merges failed
    pub fallbacks: Vec<PathBuf>,
    /// Batches whose records could not be written anywhere
    pub failed_batches: Vec<usize>,
    /// Report rows per file type, most frequent first
    pub by_type: Vec<(String, usize)>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// True when batches ran but none of them was saved anywhere
    pub fn all_batches_failed(&self) -> bool {
        self.batches > 0 && self.failed_batches.len() == self.batches
    }
}
