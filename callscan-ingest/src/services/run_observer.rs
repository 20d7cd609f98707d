//! Progress and summary reporting
//!
//! Observers only watch; nothing they do feeds back into the run.

use crate::models::Batch;
use crate::services::file_scanner::ScanResult;
use crate::services::report_writer::PersistOutcome;
use crate::services::run_orchestrator::statistics::{BatchReport, BatchStatus, RunSummary};
use std::path::Path;

/// Receives run milestones in order
pub trait RunObserver: Send + Sync {
    fn scan_complete(&self, _scan: &ScanResult, _total_batches: usize) {}

    fn nothing_to_do(&self, _source: &Path) {}

    fn batch_started(&self, _batch: &Batch, _total_batches: usize) {}

    fn batch_complete(&self, _report: &BatchReport) {}

    fn run_complete(&self, _summary: &RunSummary) {}
}

/// Observer that reports through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn scan_complete(&self, scan: &ScanResult, total_batches: usize) {
        tracing::info!(
            files = scan.files.len(),
            audio_entries = scan.audio_entries,
            by_format = ?scan.by_format,
            "Filtered audio files"
        );
        if total_batches > 0 {
            tracing::info!("Total batches to process: {}", total_batches);
        }
    }

    fn nothing_to_do(&self, source: &Path) {
        tracing::warn!(
            source = %source.display(),
            "No files match the criteria, nothing to do"
        );
    }

    fn batch_started(&self, batch: &Batch, total_batches: usize) {
        tracing::info!(
            "Processing batch {}/{} ({} files) in parallel",
            batch.index,
            total_batches,
            batch.len()
        );
    }

    fn batch_complete(&self, report: &BatchReport) {
        match &report.status {
            BatchStatus::Saved(PersistOutcome::Fallback { path, .. }) => tracing::warn!(
                batch = report.index,
                backup = %path.display(),
                "Batch saved to backup file"
            ),
            BatchStatus::Saved(_) => {}
            BatchStatus::Failed(e) => tracing::error!(
                batch = report.index,
                error = %e,
                "Batch could not be saved"
            ),
        }

        tracing::info!(
            "Batch {}: {:.1}s ({:.1} files/second)",
            report.index,
            report.elapsed.as_secs_f64(),
            report.throughput()
        );
        if let Some(eta) = report.eta() {
            tracing::info!("Estimated: {:.1} minutes remaining", eta.as_secs_f64() / 60.0);
        }
    }

    fn run_complete(&self, summary: &RunSummary) {
        tracing::info!(
            records = summary.records_extracted,
            report_rows = summary.report_rows,
            failed_files = summary.files_failed,
            minutes = %format!("{:.1}", summary.elapsed.as_secs_f64() / 60.0),
            "Processing complete"
        );
        for (file_type, count) in &summary.by_type {
            tracing::info!("  {}: {} files", file_type, count);
        }
        for path in &summary.fallbacks {
            tracing::warn!(backup = %path.display(), "Rows held in backup file, not in report");
        }
        if !summary.failed_batches.is_empty() {
            tracing::error!(batches = ?summary.failed_batches, "Batches not saved");
        }
    }
}
