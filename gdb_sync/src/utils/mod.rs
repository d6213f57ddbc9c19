//! Utilities for gdb_sync
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use logging::init_logging;
pub use naming::{normalize_schema_name, quote_identifier, quote_list, staging_schema_name};
