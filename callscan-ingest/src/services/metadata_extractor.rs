//! Recording metadata extraction
//!
//! Builds one [`FileRecord`] per in-scope recording from:
//! - the parsed filename fields
//! - filesystem size and modification time
//! - the call duration, when a [`DurationProbe`] is available
//!
//! Duration is best effort: a missing or failing probe yields `N/D`, never a
//! failed record. Extraction is read-only and safe to run concurrently on
//! disjoint files.

use crate::models::{FileRecord, RecordDuration};
use crate::services::filename_parser::FilenameParser;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Per-file extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Filename does not carry the target classification code
    #[error("Filename out of scope: {0}")]
    Rejected(String),

    /// File could not be stat'ed
    #[error("Failed to stat {0}: {1}")]
    Stat(PathBuf, #[source] std::io::Error),

    /// Extraction panicked (typically inside the audio decoder)
    #[error("Extraction panicked on {0}: {1}")]
    Panicked(String, String),
}

/// Duration probe failure
#[derive(Debug, Error)]
#[error("Duration probe failed: {0}")]
pub struct ProbeError(pub String);

/// Capability that reads a recording's length from its content
pub trait DurationProbe: Send + Sync {
    /// Length in seconds, `Ok(None)` when the format carries none
    fn duration_seconds(&self, path: &Path) -> Result<Option<f64>, ProbeError>;
}

/// Duration probe backed by lofty
#[cfg(feature = "duration")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyDurationProbe;

#[cfg(feature = "duration")]
impl DurationProbe for LoftyDurationProbe {
    fn duration_seconds(&self, path: &Path) -> Result<Option<f64>, ProbeError> {
        use lofty::prelude::*;
        use lofty::probe::Probe;

        let tagged_file = Probe::open(path)
            .map_err(|e| ProbeError(e.to_string()))?
            .read()
            .map_err(|e| ProbeError(e.to_string()))?;

        let duration = tagged_file.properties().duration();
        if duration.is_zero() {
            return Ok(None);
        }
        Ok(Some(duration.as_secs_f64()))
    }
}

/// Default probe for this build, if any
pub fn default_duration_probe() -> Option<Arc<dyn DurationProbe>> {
    #[cfg(feature = "duration")]
    {
        Some(Arc::new(LoftyDurationProbe))
    }
    #[cfg(not(feature = "duration"))]
    {
        None
    }
}

/// Metadata extractor service
#[derive(Clone)]
pub struct MetadataExtractor {
    parser: FilenameParser,
    probe: Option<Arc<dyn DurationProbe>>,
}

impl MetadataExtractor {
    /// Create extractor; `probe` is decided once at startup
    pub fn new(parser: FilenameParser, probe: Option<Arc<dyn DurationProbe>>) -> Self {
        Self { parser, probe }
    }

    pub fn has_duration_probe(&self) -> bool {
        self.probe.is_some()
    }

    /// Extract the record for `filename` inside `dir`
    pub fn extract(&self, dir: &Path, filename: &str) -> Result<FileRecord, ExtractError> {
        let path = dir.join(filename);
        let file_name = Path::new(filename);
        let stem = file_name
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let fields = self
            .parser
            .parse(stem)
            .ok_or_else(|| ExtractError::Rejected(filename.to_string()))?;

        let metadata = std::fs::metadata(&path).map_err(|e| ExtractError::Stat(path.clone(), e))?;
        let modified = metadata
            .modified()
            .map_err(|e| ExtractError::Stat(path.clone(), e))?;
        let modified_at = DateTime::<Local>::from(modified).naive_local();
        let (size_kb, size_mb) = FileRecord::sizes_from_bytes(metadata.len());

        let duration = self.probe_duration(&path);

        let file_type = file_name
            .extension()
            .map(|e| e.to_string_lossy().to_uppercase())
            .unwrap_or_default();

        tracing::trace!(
            file = %path.display(),
            size_kb,
            duration = %duration,
            "Extracted metadata"
        );

        Ok(FileRecord {
            filename: filename.to_string(),
            size_kb,
            size_mb,
            duration,
            file_type,
            modified_at,
            path: path.to_string_lossy().to_string(),
            fields,
        })
    }

    fn probe_duration(&self, path: &Path) -> RecordDuration {
        let Some(probe) = &self.probe else {
            return RecordDuration::Unavailable;
        };

        match probe.duration_seconds(path) {
            Ok(Some(seconds)) => RecordDuration::from_seconds(seconds),
            Ok(None) => RecordDuration::Unavailable,
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %e, "Duration unavailable");
                RecordDuration::Unavailable
            }
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(FilenameParser::default(), default_duration_probe())
    }
}
