//! Shared helpers for callscan-ingest integration tests

#![allow(dead_code)]

pub mod audio_generator;

use callscan_ingest::models::Batch;
use callscan_ingest::services::{BatchReport, RunObserver, RunSummary, ScanResult};
use std::path::Path;
use std::sync::Mutex;

/// Write a placeholder recording of `bytes` zero bytes
pub fn write_recording(dir: &Path, name: &str, bytes: usize) {
    std::fs::write(dir.join(name), vec![0u8; bytes]).unwrap();
}

/// Observer that keeps everything it is told
#[derive(Default)]
pub struct RecordingObserver {
    pub scanned: Mutex<Option<(usize, usize)>>,
    pub started: Mutex<Vec<usize>>,
    pub completed: Mutex<Vec<BatchReport>>,
    pub summary: Mutex<Option<RunSummary>>,
    pub nothing_to_do: Mutex<bool>,
}

impl RecordingObserver {
    pub fn completed(&self) -> Vec<BatchReport> {
        self.completed.lock().unwrap().clone()
    }
}

impl RunObserver for RecordingObserver {
    fn scan_complete(&self, scan: &ScanResult, total_batches: usize) {
        *self.scanned.lock().unwrap() = Some((scan.files.len(), total_batches));
    }

    fn nothing_to_do(&self, _source: &Path) {
        *self.nothing_to_do.lock().unwrap() = true;
    }

    fn batch_started(&self, batch: &Batch, _total_batches: usize) {
        self.started.lock().unwrap().push(batch.index);
    }

    fn batch_complete(&self, report: &BatchReport) {
        self.completed.lock().unwrap().push(report.clone());
    }

    fn run_complete(&self, summary: &RunSummary) {
        *self.summary.lock().unwrap() = Some(summary.clone());
    }
}
