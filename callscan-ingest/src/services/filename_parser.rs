//! Recording filename parser
//!
//! Recordings are named `date-time-call_type-code-extension-phone[-more...]`.
//! Only names carrying the configured classification code at position 3 are
//! in scope. The scanner uses [`FilenameParser::accepts`] as a cheap filter and
//! the extractor uses [`FilenameParser::parse`]; `parse` is built on `accepts`
//! so both passes always agree.

use crate::models::FilenameFields;

/// Separator between filename fields
pub const FIELD_DELIMITER: &str = "-";

/// Position of the classification code
pub const CODE_POSITION: usize = 3;

/// Default classification code for in-scope recordings
pub const DEFAULT_TARGET_CODE: &str = "19";

/// Splits base names into [`FilenameFields`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParser {
    target_code: String,
}

impl FilenameParser {
    pub fn new(target_code: impl Into<String>) -> Self {
        Self {
            target_code: target_code.into(),
        }
    }

    pub fn target_code(&self) -> &str {
        &self.target_code
    }

    /// True when the base name has at least 4 fields and field 3 is the target code
    pub fn accepts(&self, stem: &str) -> bool {
        stem.split(FIELD_DELIMITER)
            .nth(CODE_POSITION)
            .is_some_and(|code| code == self.target_code)
    }

    /// Populate all named fields, or `None` when the name is out of scope
    pub fn parse(&self, stem: &str) -> Option<FilenameFields> {
        if !self.accepts(stem) {
            return None;
        }

        let parts: Vec<&str> = stem.split(FIELD_DELIMITER).collect();
        let at = |i: usize| parts.get(i).map(|s| s.to_string()).unwrap_or_default();

        Some(FilenameFields {
            date: at(0),
            time: at(1),
            call_type: at(2),
            code: at(3),
            extension: at(4),
            phone_number: at(5),
            secondary_number: at(6),
            extra: parts
                .get(7..)
                .map(|rest| rest.join(FIELD_DELIMITER))
                .unwrap_or_default(),
        })
    }
}

impl Default for FilenameParser {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_CODE)
    }
}
