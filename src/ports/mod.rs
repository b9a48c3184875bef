//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - Durable string key-value storage for session state
//! - `OptimizerClient` - Remote optimization service (submit + status)
//! - `ExperimentHistory` - Completed experiments, newest first
//! - `ReportExporter` - Writes results to files

mod experiment_history;
mod key_value_store;
mod optimizer_client;
mod report_exporter;

pub use experiment_history::{ExperimentHistory, HistoryError};
pub use key_value_store::{KeyValueStore, StorageError};
pub use optimizer_client::{OptimizerClient, OptimizerError};
pub use report_exporter::{ExportError, ReportExporter};
