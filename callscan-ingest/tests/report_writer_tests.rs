//! Report writer behaviour across batches, driven through real extraction

mod helpers;

use callscan_ingest::models::FileRecord;
use callscan_ingest::services::report_writer::COLUMNS;
use callscan_ingest::services::{
    FilenameParser, MetadataExtractor, PersistOutcome, ReportWriter,
};
use helpers::write_recording;
use std::path::Path;
use tempfile::TempDir;

fn extract_all(dir: &Path, names: &[&str]) -> Vec<FileRecord> {
    let extractor = MetadataExtractor::new(FilenameParser::default(), None);
    names
        .iter()
        .map(|name| extractor.extract(dir, name).unwrap())
        .collect()
}

#[test]
fn test_batch_one_then_batch_two_keeps_order() {
    let source = TempDir::new().unwrap();
    let names = [
        "2025-11-17-19-001-5550001.mp3",
        "2025-11-17-19-002-5550002.wav",
        "2025-11-17-19-003-5550003-7770003-a-b.gsm",
    ];
    for name in names {
        write_recording(source.path(), name, 1500);
    }
    let records = extract_all(source.path(), &names);

    let out_dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(out_dir.path().join("report.csv"));

    // Batch two arrives in reverse completion order
    let batch_one = &records[..1];
    let batch_two: Vec<FileRecord> = records[1..].iter().rev().cloned().collect();

    assert_eq!(
        writer.persist(batch_one, 1, true).unwrap(),
        PersistOutcome::Created { rows: 1 }
    );
    assert_eq!(
        writer.persist(&batch_two, 2, false).unwrap(),
        PersistOutcome::Merged { rows: 2, total: 3 }
    );

    let rows = writer.read_rows().unwrap();
    let written: Vec<&str> = rows.iter().map(|r| r.get(0).unwrap()).collect();
    assert_eq!(written, vec![names[0], names[2], names[1]]);

    let tail = &rows[1];
    assert_eq!(tail.len(), COLUMNS.len());
    assert_eq!(&tail[13], "7770003");
    assert_eq!(&tail[14], "a-b");
    assert_eq!(&tail[1], "1.46");
}

#[test]
fn test_existing_rows_survive_rewrite_verbatim() {
    let source = TempDir::new().unwrap();
    // Commas and quotes in the directory name end up in the path column
    let odd_dir = source.path().join("site \"A\", floor 2");
    std::fs::create_dir(&odd_dir).unwrap();
    let names = ["2025-11-17-19-001-5550001.mp3", "2025-11-17-19-002-5550002.mp3"];
    for name in names {
        write_recording(&odd_dir, name, 10);
    }
    let records = extract_all(&odd_dir, &names);

    let out_dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(out_dir.path().join("report.csv"));
    writer.persist(&records[..1], 1, true).unwrap();
    let before = writer.read_rows().unwrap();

    writer.persist(&records[1..], 2, false).unwrap();
    let after = writer.read_rows().unwrap();

    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert!(after[0][6].contains("site \"A\", floor 2"));
}

#[test]
fn test_schema_mismatch_leaves_report_untouched() {
    let source = TempDir::new().unwrap();
    let names = ["2025-11-17-19-001-5550001.mp3"];
    write_recording(source.path(), names[0], 10);
    let records = extract_all(source.path(), &names);

    let out_dir = TempDir::new().unwrap();
    let report = out_dir.path().join("report.csv");
    let foreign = "nombre_completo,peso_kb\nx.mp3,1.00\n";
    std::fs::write(&report, foreign).unwrap();

    let writer = ReportWriter::new(&report);
    let outcome = writer.persist(&records, 7, false).unwrap();

    match outcome {
        PersistOutcome::Fallback { path, rows, reason } => {
            assert_eq!(path, out_dir.path().join("backup_batch_7.csv"));
            assert_eq!(rows, 1);
            assert!(reason.contains("Unexpected columns"));
        }
        other => panic!("Expected fallback, got {:?}", other),
    }
    assert_eq!(std::fs::read_to_string(&report).unwrap(), foreign);
}

#[test]
fn test_first_batch_overwrites_stale_report() {
    let source = TempDir::new().unwrap();
    let names = ["2025-11-17-19-001-5550001.mp3"];
    write_recording(source.path(), names[0], 10);
    let records = extract_all(source.path(), &names);

    let out_dir = TempDir::new().unwrap();
    let report = out_dir.path().join("report.csv");
    std::fs::write(&report, "left over from an earlier run\n").unwrap();

    let writer = ReportWriter::new(&report);
    writer.persist(&records, 1, true).unwrap();
    assert_eq!(writer.row_count().unwrap(), 1);
}
