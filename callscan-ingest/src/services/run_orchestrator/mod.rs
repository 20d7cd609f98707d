//! Run orchestration
//!
//! Sequence: scan + filter -> partition -> for each batch in order:
//! extract (parallel, on a blocking thread) then persist (sequential) ->
//! read the report back for the per-type tally.
//!
//! Batch N+1 does not start until batch N's records have been handed to the
//! writer. The "first batch" flag means "the report has not been created yet
//! in this run", so it only ever goes from true to false.

pub mod statistics;

use crate::config::IngestConfig;
use crate::services::batch_scheduler::{partition, BatchScheduler, SchedulerError};
use crate::services::file_scanner::{FileScanner, ScanError};
use crate::services::filename_parser::FilenameParser;
use crate::services::metadata_extractor::{DurationProbe, MetadataExtractor};
use crate::services::report_writer::{PersistOutcome, ReportWriter};
use crate::services::run_observer::{LogObserver, RunObserver};
use statistics::{BatchReport, BatchStatus, RunSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Final status of [`RunOrchestrator::execute`]
#[derive(Debug, Clone)]
pub enum RunStatus {
    Completed(RunSummary),
    /// No file matched the criteria; the report was not touched
    NothingToDo,
    Failed(String),
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunStatus::Failed(_))
    }
}

/// Drives one indexing run
pub struct RunOrchestrator {
    config: IngestConfig,
    scanner: FileScanner,
    scheduler: BatchScheduler,
    writer: ReportWriter,
    observer: Arc<dyn RunObserver>,
}

impl RunOrchestrator {
    /// Build the pipeline; `probe` is the duration capability chosen at startup
    pub fn new(config: IngestConfig, probe: Option<Arc<dyn DurationProbe>>) -> Self {
        let parser = FilenameParser::new(config.target_code.clone());
        let scanner = FileScanner::with_extensions(parser.clone(), config.extensions.clone());
        let scheduler = BatchScheduler::new(MetadataExtractor::new(parser, probe), config.workers);
        let writer = ReportWriter::new(config.output_path.clone());

        Self {
            config,
            scanner,
            scheduler,
            writer,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run and convert every error into a reported status
    pub async fn execute(&self) -> RunStatus {
        match self.run().await {
            Ok(Some(summary)) => {
                self.observer.run_complete(&summary);
                if summary.all_batches_failed() {
                    let msg = format!(
                        "None of the {} batches could be saved (last target {})",
                        summary.batches,
                        self.writer.path().display()
                    );
                    tracing::error!("{}", msg);
                    return RunStatus::Failed(msg);
                }
                RunStatus::Completed(summary)
            }
            Ok(None) => RunStatus::NothingToDo,
            Err(e) => {
                tracing::error!(error = %e, "Processing failed");
                RunStatus::Failed(e.to_string())
            }
        }
    }

    /// Run the pipeline; `Ok(None)` when no file matched
    pub async fn run(&self) -> Result<Option<RunSummary>, RunError> {
        let start = Instant::now();
        let source = absolute_source(&self.config.source_dir);

        tracing::info!(
            source = %source.display(),
            output = %self.config.output_path.display(),
            batch_size = self.config.batch_size,
            code = %self.config.target_code,
            workers = self.scheduler.workers(),
            "Starting run"
        );

        let scanner = self.scanner.clone();
        let scan_dir = source.clone();
        let scan = tokio::task::spawn_blocking(move || scanner.scan_with_stats(&scan_dir)).await??;

        let batches = partition(&scan.files, self.config.batch_size);
        self.observer.scan_complete(&scan, batches.len());

        if batches.is_empty() {
            self.observer.nothing_to_do(&source);
            return Ok(None);
        }

        let total_batches = batches.len();
        let mut summary = RunSummary {
            files_found: scan.files.len(),
            batches: total_batches,
            ..Default::default()
        };
        let mut report_created = false;

        for batch in batches {
            let batch_start = Instant::now();
            let index = batch.index;
            let files = batch.len();
            self.observer.batch_started(&batch, total_batches);

            let scheduler = self.scheduler.clone();
            let dir = source.clone();
            let output =
                tokio::task::spawn_blocking(move || scheduler.run_batch(&dir, &batch)).await??;

            let records = output.records;
            let extracted = records.len();
            let failures = output.failures.len();

            let writer = self.writer.clone();
            let is_first = !report_created;
            let persisted =
                tokio::task::spawn_blocking(move || writer.persist(&records, index, is_first))
                    .await?;

            let status = match persisted {
                Ok(outcome) => {
                    match &outcome {
                        PersistOutcome::Created { .. } => report_created = true,
                        PersistOutcome::Fallback { path, .. } => {
                            summary.fallbacks.push(path.clone())
                        }
                        PersistOutcome::Merged { .. } | PersistOutcome::Skipped => {}
                    }
                    BatchStatus::Saved(outcome)
                }
                Err(e) => {
                    summary.failed_batches.push(index);
                    BatchStatus::Failed(e.to_string())
                }
            };

            summary.records_extracted += extracted;
            summary.files_failed += failures;

            let report = BatchReport {
                index,
                total_batches,
                files,
                records: extracted,
                failures,
                status,
                elapsed: batch_start.elapsed(),
            };
            self.observer.batch_complete(&report);
        }

        if report_created {
            let writer = self.writer.clone();
            match tokio::task::spawn_blocking(move || writer.tally_by_type()).await? {
                Ok(by_type) => {
                    summary.report_rows = by_type.iter().map(|(_, n)| n).sum();
                    summary.by_type = by_type;
                }
                Err(e) => tracing::warn!(error = %e, "Could not read final report"),
            }
        } else {
            tracing::warn!(
                path = %self.writer.path().display(),
                "No report was created in this run"
            );
        }

        summary.elapsed = start.elapsed();
        Ok(Some(summary))
    }
}

/// Anchor a relative source directory at the working directory
///
/// Symlinks and mount names are kept as written. On failure the path is
/// returned unchanged and the scan reports the problem.
pub fn absolute_source(dir: &Path) -> PathBuf {
    match std::path::absolute(dir) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(source = %dir.display(), error = %e, "Could not make source path absolute");
            dir.to_path_buf()
        }
    }
}
