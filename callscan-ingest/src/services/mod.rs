//! Service modules for the indexing pipeline

pub mod batch_scheduler;
pub mod file_scanner;
pub mod filename_parser;
pub mod metadata_extractor;
pub mod report_writer;
pub mod run_observer;
pub mod run_orchestrator;

pub use batch_scheduler::{partition, BatchOutput, BatchScheduler, SchedulerError};
pub use file_scanner::{FileScanner, ScanError, ScanResult};
pub use filename_parser::FilenameParser;
pub use metadata_extractor::{DurationProbe, ExtractError, MetadataExtractor, ProbeError};
pub use report_writer::{PersistError, PersistOutcome, ReportWriter};
pub use run_observer::{LogObserver, RunObserver};
pub use run_orchestrator::statistics::{BatchReport, BatchStatus, RunSummary};
pub use run_orchestrator::{RunError, RunOrchestrator, RunStatus};
