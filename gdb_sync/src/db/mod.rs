//! Database module for gdb_sync
//!
//! This module handles the database connection and the operations the
//! synchronizer runs against it.

pub mod connection;
pub mod executor;
pub mod store;

// Re-export key types
pub use connection::{ConnectionManager, DatabaseConnection};
pub use store::Store;
