//! Recording directory scanner
//!
//! Lists the immediate children of the source directory, keeps allow-listed
//! audio extensions, and applies the cheap filename filter. The result is the
//! ordered list of file names the batch scheduler works through.

use crate::services::filename_parser::FilenameParser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Audio extensions considered by default (compared case-insensitively)
pub const DEFAULT_AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "gsm"];

/// Directory scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Source directory does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory could not be listed
    #[error("I/O error reading {0}: {1}")]
    Io(PathBuf, String),
}

/// Scan result with statistics
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Accepted file names, sorted
    pub files: Vec<String>,
    /// Audio entries looked at before the filename filter
    pub audio_entries: usize,
    /// Accepted files by lowercase extension
    pub by_format: BTreeMap<String, usize>,
}

/// Non-recursive recording scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    parser: FilenameParser,
    extensions: Vec<String>,
}

impl FileScanner {
    /// Create scanner with the default audio extension allow-list
    pub fn new(parser: FilenameParser) -> Self {
        Self::with_extensions(parser, DEFAULT_AUDIO_EXTENSIONS.iter().map(|e| e.to_string()))
    }

    pub fn with_extensions(
        parser: FilenameParser,
        extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            parser,
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Names of in-scope recordings directly inside `dir`
    pub fn scan(&self, dir: &Path) -> Result<Vec<String>, ScanError> {
        Ok(self.scan_with_stats(dir)?.files)
    }

    /// Scan with per-format statistics
    pub fn scan_with_stats(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        if !dir.exists() {
            return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        // Fail up front if the directory itself cannot be listed; walkdir
        // would otherwise report it as a per-entry error.
        std::fs::read_dir(dir).map_err(|e| ScanError::Io(dir.to_path_buf(), e.to_string()))?;

        let mut result = ScanResult::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            // Links are resolved, so a link to a regular file counts as one
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(ext) = self.audio_extension(path) else {
                continue;
            };
            result.audio_entries += 1;

            let (Some(stem), Some(name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                entry.file_name().to_str(),
            ) else {
                tracing::warn!("Skipping recording with non UTF-8 name: {}", path.display());
                continue;
            };

            if !self.parser.accepts(stem) {
                continue;
            }

            result.files.push(name.to_string());
            *result.by_format.entry(ext).or_insert(0) += 1;
        }

        tracing::debug!(
            dir = %dir.display(),
            audio_entries = result.audio_entries,
            accepted = result.files.len(),
            code = self.parser.target_code(),
            "Directory scan complete"
        );

        Ok(result)
    }

    /// Lowercase extension when it is on the allow-list
    fn audio_extension(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        self.is_audio_extension(&ext).then_some(ext)
    }

    fn is_audio_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|allowed| allowed == ext)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(FilenameParser::default())
    }
}
