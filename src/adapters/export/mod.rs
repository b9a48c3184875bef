//! Export Adapters
//!
//! - **FileReportExporter** - JSON and text report files in an export directory

mod file_exporter;

pub use file_exporter::FileReportExporter;
