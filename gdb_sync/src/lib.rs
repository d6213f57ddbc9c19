//! gdb_sync: merge a freshly captured GDB checkout into the authoritative one
//!
//! A *source* schema holds newly captured records and a *target* schema holds
//! the previously merged dataset. gdb_sync produces a merged result holding
//! every target record plus every source record whose global identifier
//! (`globalid` / `global_id`) the target lacks.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod sync;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, MergeStrategy};
pub use db::{ConnectionManager, DatabaseConnection, Store};
pub use error::{Error, Result};
pub use schema::{CompatibilityChecker, RelationName, SchemaAnalyzer};
pub use sync::{SyncReport, Synchronizer, TableCopier, TableOutcome};

/// Synchronize `source_schema` into `target_schema` with default settings.
///
/// `db_uri` falls back to the `DATABASE_URI` environment variable.
pub async fn synchronize(source_schema: &str, target_schema: &str, db_uri: Option<&str>) -> Result<SyncReport> {
    let mut config = Config::default();
    if let Some(url) = db_uri {
        config.database.url = Some(url.to_string());
    }

    synchronize_with_config(&config, source_schema, target_schema).await
}

/// Synchronize using an explicit configuration.
///
/// The connection is opened once for the run and closed before returning,
/// whether or not the run succeeded.
pub async fn synchronize_with_config(config: &Config, source_schema: &str, target_schema: &str) -> Result<SyncReport> {
    let source = utils::normalize_schema_name(source_schema)?;
    let target = utils::normalize_schema_name(target_schema)?;

    if config.database.resolve_url().is_none() {
        return Err(Error::ConfigError(format!(
            "no connection string given and {} is not set",
            config::DATABASE_URI_ENV
        )));
    }

    let mut manager = ConnectionManager::new(config.database.clone());
    let report = {
        let connection = manager.connection().await;
        Synchronizer::new(connection, config.sync.clone(), &source, &target)
            .run()
            .await
    };
    manager.release().await;

    report
}
