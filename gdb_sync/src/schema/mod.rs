//! Schema module for gdb_sync
//!
//! Relation introspection and compatibility checks, plus the SQL the
//! synchronizer issues.

pub mod analyzer;
pub mod compat;
pub mod generator;
pub mod types;

// Re-export key types
pub use analyzer::SchemaAnalyzer;
pub use compat::{assess, Compatibility, CompatibilityChecker, Incompatibility};
pub use types::{ColumnSet, GlobalIdColumn, RelationName};
