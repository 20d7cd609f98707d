//! Configuration file discovery and loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `CALLSCAN_CONFIG` environment variable
//! 3. OS-dependent default (`<config_dir>/callscan/config.toml`)
//!
//! An explicitly named file must exist and parse. A missing default file is
//! not an error: a warning is logged and compiled defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CALLSCAN_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; values left out fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    /// Directory holding the recordings to index
    #[serde(default)]
    pub source_folder: Option<PathBuf>,

    /// Path of the tabular report to create/merge into
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Classification code a filename must carry at position 3
    #[serde(default)]
    pub target_code: Option<String>,

    /// Files per batch
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Worker threads per batch (defaults to available cores, capped at 8)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Whether to read audio durations
    #[serde(default)]
    pub probe_durations: Option<bool>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the config file was found and how it was named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// True when named by the user (CLI or environment)
    pub explicit: bool,
}

/// Resolve the config file location without touching the filesystem
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<ConfigLocation> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            explicit: true,
        });
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(ConfigLocation {
                path: PathBuf::from(path),
                explicit: true,
            });
        }
    }

    // Priority 3: OS-dependent default
    default_config_path().map(|path| ConfigLocation {
        path,
        explicit: false,
    })
}

/// Default config file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("callscan").join("config.toml"))
}

/// Load the TOML config, falling back to defaults when no file is present
pub fn load_toml_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(location) = resolve_config_path(cli_arg) else {
        warn!("Could not determine config directory, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !location.path.exists() {
        if location.explicit {
            return Err(Error::NotFound(format!(
                "config file {}",
                location.path.display()
            )));
        }
        warn!(
            "Config file not found at {}, using built-in defaults",
            location.path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = parse_toml_config(&location.path)?;
    info!("Loaded config from {}", location.path.display());
    Ok(config)
}

/// Read and parse a specific TOML config file
pub fn parse_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}
