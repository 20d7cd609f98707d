//! Per-file record produced by metadata extraction

use chrono::NaiveDateTime;
use std::fmt;

/// Duration placeholder when no measurement could be taken
pub const DURATION_UNAVAILABLE: &str = "N/D";

/// Duration placeholder when the measurement was unusable
pub const DURATION_INVALID: &str = "Error";

/// Fields parsed positionally from a recording's base name
///
/// Layout: `date-time-call_type-code-extension-phone_number-secondary_number-extra...`
///
/// Positions past the end of the name are empty strings. Everything from
/// position 7 onwards is rejoined with `-` into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameFields {
    pub date: String,
    pub time: String,
    pub call_type: String,
    /// Classification code (position 3)
    pub code: String,
    pub extension: String,
    pub phone_number: String,
    pub secondary_number: String,
    pub extra: String,
}

/// Call duration as stored in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDuration {
    /// Measured duration, rendered `M:SS`
    Known { minutes: u64, seconds: u8 },
    /// No probe, or the probe could not read the file
    Unavailable,
    /// The probe returned a negative or non-finite length
    Invalid,
}

impl RecordDuration {
    /// Convert a probed length in seconds, truncating fractional seconds
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds < 0.0 {
            return RecordDuration::Invalid;
        }
        let whole = seconds.trunc() as u64;
        RecordDuration::Known {
            minutes: whole / 60,
            seconds: (whole % 60) as u8,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, RecordDuration::Known { .. })
    }
}

impl fmt::Display for RecordDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDuration::Known { minutes, seconds } => write!(f, "{}:{:02}", minutes, seconds),
            RecordDuration::Unavailable => f.write_str(DURATION_UNAVAILABLE),
            RecordDuration::Invalid => f.write_str(DURATION_INVALID),
        }
    }
}

/// One accepted, successfully extracted recording
///
/// Built once by the extractor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// File name including extension
    pub filename: String,
    /// Size in kilobytes, rounded to 2 decimals
    pub size_kb: f64,
    /// Size in megabytes, rounded to 2 decimals
    pub size_mb: f64,
    pub duration: RecordDuration,
    /// Uppercase extension without the dot (`MP3`, `WAV`, `GSM`)
    pub file_type: String,
    /// Last modification time in local time
    pub modified_at: NaiveDateTime,
    /// Full path of the recording (source directory made absolute, links kept)
    pub path: String,
    pub fields: FilenameFields,
}

impl FileRecord {
    /// Round a byte count to kilobytes and megabytes (2 decimals each)
    pub fn sizes_from_bytes(bytes: u64) -> (f64, f64) {
        let bytes = bytes as f64;
        (round2(bytes / 1024.0), round2(bytes / (1024.0 * 1024.0)))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
