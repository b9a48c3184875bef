//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Key-value stores (file, in-memory)
//! - `optimizer` - Optimization service clients (HTTP, mock)
//! - `history` - Experiment history over a key-value store
//! - `export` - File exports of results and reports

pub mod export;
pub mod history;
pub mod optimizer;
pub mod storage;

pub use export::FileReportExporter;
pub use history::StoredExperimentHistory;
pub use optimizer::{HttpOptimizerClient, HttpOptimizerConfig, MockOptimizerClient};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
