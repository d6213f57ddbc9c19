//! Synchronization module for gdb_sync
//!
//! Table copy/merge operations and the driver that applies them across a
//! whole schema.

pub mod copier;
pub mod orchestrator;
pub mod report;

// Re-export key types
pub use copier::TableCopier;
pub use orchestrator::Synchronizer;
pub use report::{SyncReport, TableOutcome, TableReport};
