//! Run configuration for callscan-ingest
//!
//! Values are resolved with priority: command line (or its environment
//! variable) -> TOML config file -> built-in defaults.

use crate::services::batch_scheduler::{default_worker_count, DEFAULT_BATCH_SIZE};
use crate::services::file_scanner::DEFAULT_AUDIO_EXTENSIONS;
use crate::services::filename_parser::DEFAULT_TARGET_CODE;
use callscan_common::config::TomlConfig;
use callscan_common::{Error, Result};
use std::path::PathBuf;

/// Default report file name
pub const DEFAULT_OUTPUT_PATH: &str = "report.csv";

/// Values supplied on the command line; `None` means not given
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub target_code: Option<String>,
    pub batch_size: Option<usize>,
    pub workers: Option<usize>,
    pub no_duration: bool,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Directory holding the recordings (already mounted if remote)
    pub source_dir: PathBuf,
    /// Report path
    pub output_path: PathBuf,
    /// Classification code at filename position 3
    pub target_code: String,
    /// Files per batch
    pub batch_size: usize,
    /// Allow-listed audio extensions, lowercase without dot
    pub extensions: Vec<String>,
    /// Worker threads per batch
    pub workers: usize,
    /// Read durations from file content
    pub probe_durations: bool,
}

impl IngestConfig {
    /// Configuration with built-in defaults for everything but the paths
    pub fn new(source_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_path: output_path.into(),
            target_code: DEFAULT_TARGET_CODE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            extensions: DEFAULT_AUDIO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            workers: default_worker_count(),
            probe_durations: true,
        }
    }

    /// Merge command line values over the TOML file over defaults
    pub fn resolve(cli: CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let source_dir = cli
            .source
            .or_else(|| toml.source_folder.clone())
            .ok_or_else(|| {
                Error::Config(
                    "Source folder not configured. Use --source, CALLSCAN_SOURCE, \
                     or source_folder in the config file"
                        .to_string(),
                )
            })?;
        let output_path = cli
            .output
            .or_else(|| toml.output_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let mut config = Self::new(source_dir, output_path);
        if let Some(code) = cli.target_code.or_else(|| toml.target_code.clone()) {
            config.target_code = code;
        }
        if let Some(size) = cli.batch_size.or(toml.batch_size) {
            config.batch_size = size;
        }
        if let Some(workers) = cli.workers.or(toml.workers) {
            config.workers = workers;
        }
        config.probe_durations = !cli.no_duration && toml.probe_durations.unwrap_or(true);

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidInput("batch size must be positive".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidInput("worker count must be positive".to_string()));
        }
        if self.target_code.trim().is_empty() {
            return Err(Error::InvalidInput("target code must not be empty".to_string()));
        }
        if self.extensions.is_empty() {
            return Err(Error::InvalidInput(
                "at least one audio extension is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::new("/rec", "out.csv");
        assert_eq!(config.target_code, "19");
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.extensions, vec!["mp3", "wav", "gsm"]);
        assert!(config.workers >= 1 && config.workers <= 8);
        assert!(config.probe_durations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let result = IngestConfig::resolve(CliOverrides::default(), &TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_beats_toml_beats_default() {
        let toml = TomlConfig {
            source_folder: Some(PathBuf::from("/toml/src")),
            output_path: Some(PathBuf::from("/toml/out.csv")),
            batch_size: Some(200),
            workers: Some(3),
            probe_durations: Some(false),
            ..Default::default()
        };
        let cli = CliOverrides {
            source: Some(PathBuf::from("/cli/src")),
            batch_size: Some(50),
            ..Default::default()
        };

        let config = IngestConfig::resolve(cli, &toml).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/cli/src"));
        assert_eq!(config.output_path, PathBuf::from("/toml/out.csv"));
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.workers, 3);
        assert_eq!(config.target_code, "19");
        assert!(!config.probe_durations);
    }

    #[test]
    fn test_no_duration_flag_wins() {
        let cli = CliOverrides {
            source: Some(PathBuf::from("/src")),
            no_duration: true,
            ..Default::default()
        };
        let config = IngestConfig::resolve(cli, &TomlConfig::default()).unwrap();
        assert!(!config.probe_durations);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let cli = CliOverrides {
            source: Some(PathBuf::from("/src")),
            batch_size: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            IngestConfig::resolve(cli, &TomlConfig::default()),
            Err(Error::InvalidInput(_))
        ));

        let mut config = IngestConfig::new("/src", "out.csv");
        config.target_code = " ".to_string();
        assert!(config.validate().is_err());
        config.target_code = "19".to_string();
        config.extensions.clear();
        assert!(config.validate().is_err());
    }
}
