//! Incremental CSV report writer
//!
//! The report is created by the first batch that produces records and every
//! later batch is merged in by read-modify-write: existing rows are read back,
//! the batch's rows are appended, and the whole file is rewritten through a
//! temp file in the same directory followed by a rename. Each rewrite is
//! atomic; a crash between batches loses at most the batch in flight.
//!
//! Cost grows quadratically with the number of batches, which is fine for
//! batches in the hundreds of files.
//!
//! When a merge fails the batch is written alone to `backup_batch_<n>.csv`
//! next to the report and the report itself is left as it was.

use crate::models::FileRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Column order of the report; never varies between batches
pub const COLUMNS: [&str; 15] = [
    "nombre_completo",
    "peso_kb",
    "peso_mb",
    "duracion",
    "tipo_archivo",
    "fecha_modificacion",
    "ruta",
    "fecha",
    "hora",
    "tipo_llamada",
    "codigo",
    "extension",
    "numero_celular",
    "numero_adicional",
    "campo_extra",
];

/// Timestamp format of the `fecha_modificacion` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writer errors
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("CSV error on {0}: {1}")]
    Csv(PathBuf, #[source] csv::Error),

    /// Report missing when a merge expected it
    #[error("Report not found: {0}")]
    Missing(PathBuf),

    /// Header differs from [`COLUMNS`]
    #[error("Unexpected columns in {path}: {found}")]
    SchemaMismatch { path: PathBuf, found: String },
}

/// What happened to one batch's records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing to write
    Skipped,
    /// Report created with `rows` rows
    Created { rows: usize },
    /// `rows` appended, report now holds `total`
    Merged { rows: usize, total: usize },
    /// Merge failed; the batch went to a side file instead
    Fallback { path: PathBuf, rows: usize, reason: String },
}

/// Serialized form of one report row
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    nombre_completo: &'a str,
    peso_kb: String,
    peso_mb: String,
    duracion: String,
    tipo_archivo: &'a str,
    fecha_modificacion: String,
    ruta: &'a str,
    fecha: &'a str,
    hora: &'a str,
    tipo_llamada: &'a str,
    codigo: &'a str,
    extension: &'a str,
    numero_celular: &'a str,
    numero_adicional: &'a str,
    campo_extra: &'a str,
}

impl<'a> From<&'a FileRecord> for ReportRow<'a> {
    fn from(record: &'a FileRecord) -> Self {
        let fields = &record.fields;
        Self {
            nombre_completo: &record.filename,
            peso_kb: format!("{:.2}", record.size_kb),
            peso_mb: format!("{:.2}", record.size_mb),
            duracion: record.duration.to_string(),
            tipo_archivo: &record.file_type,
            fecha_modificacion: record.modified_at.format(TIMESTAMP_FORMAT).to_string(),
            ruta: &record.path,
            fecha: &fields.date,
            hora: &fields.time,
            tipo_llamada: &fields.call_type,
            codigo: &fields.code,
            extension: &fields.extension,
            numero_celular: &fields.phone_number,
            numero_adicional: &fields.secondary_number,
            campo_extra: &fields.extra,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileTypeColumn {
    tipo_archivo: String,
}

/// Owns the report path and its fallback naming
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Side file used when merging batch `batch_index` fails
    pub fn fallback_path(&self, batch_index: usize) -> PathBuf {
        self.path
            .with_file_name(format!("backup_batch_{}.csv", batch_index))
    }

    /// Write one batch: create the report, merge into it, or fall back
    pub fn persist(
        &self,
        records: &[FileRecord],
        batch_index: usize,
        is_first: bool,
    ) -> Result<PersistOutcome, PersistError> {
        if records.is_empty() {
            tracing::warn!(batch = batch_index, "Batch empty, nothing saved");
            return Ok(PersistOutcome::Skipped);
        }

        if is_first {
            write_atomic(&self.path, &[], records)?;
            tracing::info!(
                batch = batch_index,
                rows = records.len(),
                path = %self.path.display(),
                "Report created"
            );
            return Ok(PersistOutcome::Created {
                rows: records.len(),
            });
        }

        match self.merge(records) {
            Ok(total) => {
                tracing::info!(
                    batch = batch_index,
                    rows = records.len(),
                    total,
                    "Batch merged into report"
                );
                Ok(PersistOutcome::Merged {
                    rows: records.len(),
                    total,
                })
            }
            Err(e) => {
                tracing::warn!(batch = batch_index, error = %e, "Merge failed, writing backup");
                let fallback = self.fallback_path(batch_index);
                write_atomic(&fallback, &[], records)?;
                tracing::info!(path = %fallback.display(), "Backup saved");
                Ok(PersistOutcome::Fallback {
                    path: fallback,
                    rows: records.len(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Append `records` after the existing rows; returns the new row count
    fn merge(&self, records: &[FileRecord]) -> Result<usize, PersistError> {
        let existing = self.read_rows()?;
        write_atomic(&self.path, &existing, records)?;
        Ok(existing.len() + records.len())
    }

    /// Raw data rows of the report, schema checked
    pub fn read_rows(&self) -> Result<Vec<csv::StringRecord>, PersistError> {
        if !self.path.exists() {
            return Err(PersistError::Missing(self.path.clone()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| PersistError::Csv(self.path.clone(), e))?;

        let headers = reader
            .headers()
            .map_err(|e| PersistError::Csv(self.path.clone(), e))?;
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            return Err(PersistError::SchemaMismatch {
                path: self.path.clone(),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PersistError::Csv(self.path.clone(), e))
    }

    pub fn row_count(&self) -> Result<usize, PersistError> {
        Ok(self.read_rows()?.len())
    }

    /// Rows per `tipo_archivo`, most frequent first
    pub fn tally_by_type(&self) -> Result<Vec<(String, usize)>, PersistError> {
        if !self.path.exists() {
            return Err(PersistError::Missing(self.path.clone()));
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| PersistError::Csv(self.path.clone(), e))?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in reader.deserialize::<FileTypeColumn>() {
            let row = row.map_err(|e| PersistError::Csv(self.path.clone(), e))?;
            *counts.entry(row.tipo_archivo).or_insert(0) += 1;
        }

        let mut tally: Vec<(String, usize)> = counts.into_iter().collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(tally)
    }
}

/// Write header, `existing` rows, then `records` to `path` via temp + rename
fn write_atomic(
    path: &Path,
    existing: &[csv::StringRecord],
    records: &[FileRecord],
) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |e: std::io::Error| PersistError::Io(path.to_path_buf(), e);
    let csv_err = |e: csv::Error| PersistError::Csv(path.to_path_buf(), e);

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file_mut());

        writer.write_record(COLUMNS).map_err(csv_err)?;
        for row in existing {
            writer.write_record(row).map_err(csv_err)?;
        }
        for record in records {
            writer.serialize(ReportRow::from(record)).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    temp.as_file_mut().sync_all().map_err(io_err)?;

    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilenameFields, RecordDuration};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(name: &str, ext: &str) -> FileRecord {
        FileRecord {
            filename: format!("{}.{}", name, ext.to_lowercase()),
            size_kb: 1.5,
            size_mb: 0.0,
            duration: RecordDuration::Known { minutes: 1, seconds: 5 },
            file_type: ext.to_string(),
            modified_at: NaiveDate::from_ymd_opt(2025, 11, 17)
                .unwrap()
                .and_hms_opt(19, 30, 5)
                .unwrap(),
            path: format!("/rec/{}.{}", name, ext.to_lowercase()),
            fields: FilenameFields {
                date: "2025".into(),
                time: "11".into(),
                call_type: "17".into(),
                code: "19".into(),
                extension: "001".into(),
                phone_number: name.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_serde_header_matches_columns() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(ReportRow::from(&record("a", "MP3"))).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = out.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(","));
    }

    #[test]
    fn test_row_formatting() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("report.csv"));
        writer.persist(&[record("5551234", "MP3")], 1, true).unwrap();

        let rows = writer.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[1], "1.50");
        assert_eq!(&row[2], "0.00");
        assert_eq!(&row[3], "1:05");
        assert_eq!(&row[4], "MP3");
        assert_eq!(&row[5], "2025-11-17 19:30:05");
        assert_eq!(&row[10], "19");
        assert_eq!(&row[13], "");
        assert_eq!(&row[14], "");
    }

    #[test]
    fn test_empty_batch_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("report.csv"));
        assert_eq!(writer.persist(&[], 1, true).unwrap(), PersistOutcome::Skipped);
        assert!(!writer.path().exists());
    }

    #[test]
    fn test_merge_appends_after_existing_rows() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("report.csv"));

        writer
            .persist(&[record("a1", "MP3"), record("a2", "WAV")], 1, true)
            .unwrap();
        let outcome = writer.persist(&[record("b1", "MP3")], 2, false).unwrap();
        assert_eq!(outcome, PersistOutcome::Merged { rows: 1, total: 3 });

        let names: Vec<String> = writer
            .read_rows()
            .unwrap()
            .iter()
            .map(|r| r[0].to_string())
            .collect();
        assert_eq!(names, vec!["a1.mp3", "a2.wav", "b1.mp3"]);
    }

    #[test]
    fn test_missing_report_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("report.csv"));

        let outcome = writer.persist(&[record("c1", "GSM")], 4, false).unwrap();
        let expected = temp_dir.path().join("backup_batch_4.csv");
        match outcome {
            PersistOutcome::Fallback { path, rows, .. } => {
                assert_eq!(path, expected);
                assert_eq!(rows, 1);
            }
            other => panic!("Expected fallback, got {:?}", other),
        }
        assert!(!writer.path().exists());
        assert_eq!(ReportWriter::new(expected).row_count().unwrap(), 1);
    }

    #[test]
    fn test_tally_by_type_orders_by_count() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("report.csv"));
        writer
            .persist(
                &[
                    record("1", "WAV"),
                    record("2", "MP3"),
                    record("3", "MP3"),
                    record("4", "GSM"),
                ],
                1,
                true,
            )
            .unwrap();

        assert_eq!(
            writer.tally_by_type().unwrap(),
            vec![
                ("MP3".to_string(), 2),
                ("GSM".to_string(), 1),
                ("WAV".to_string(), 1),
            ]
        );
    }
}
