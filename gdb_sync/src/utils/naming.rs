//! Naming utilities for gdb_sync
//!
//! Identifier quoting and the names the synchronizer derives on its own.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Quote an identifier the way PostgreSQL expects it: wrapped in double
/// quotes, with embedded double quotes doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote every identifier and join them with `", "`
pub fn quote_list<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lower-case and validate a schema name supplied by a caller
pub fn normalize_schema_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::ValidationError("schema name must not be empty".to_string()));
    }

    if name.contains('.') {
        return Err(Error::ValidationError(format!(
            "schema name `{}` must not contain a `.` separator",
            name
        )));
    }

    Ok(name.to_lowercase())
}

/// Name of the staging schema for a run started at `started_at`
pub fn staging_schema_name(prefix: &str, started_at: DateTime<Utc>) -> String {
    format!("{}_{}", prefix.to_lowercase(), started_at.timestamp())
}
