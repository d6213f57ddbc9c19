//! Table copy and merge operations

use crate::db::store::Store;
use crate::error::Result;
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::compat::{Compatibility, CompatibilityChecker};
use crate::schema::types::RelationName;
use crate::sync::report::TableOutcome;

/// Creates, overwrites and merges destination tables from source relations
pub struct TableCopier<'a, S: ?Sized> {
    analyzer: SchemaAnalyzer<'a, S>,
}

impl<'a, S: Store + ?Sized> TableCopier<'a, S> {
    pub fn new(analyzer: SchemaAnalyzer<'a, S>) -> Self {
        Self { analyzer }
    }

    fn checker(&self) -> CompatibilityChecker<'a, S> {
        CompatibilityChecker::new(self.analyzer)
    }

    fn store(&self, source: &RelationName, destination: &RelationName) -> Option<&'a S> {
        let store = self.analyzer.store();
        if store.is_none() {
            tracing::warn!(
                source = %source,
                destination = %destination,
                "No database connection; nothing copied"
            );
        }
        store
    }

    /// Copy `source` into `destination`, upserting on the global identifier
    /// when the destination already exists.
    ///
    /// An existing but incompatible destination is left alone unless
    /// `overwrite` is set, in which case it is dropped (with its dependents)
    /// and recreated from `source`.
    pub async fn copy_table(
        &self,
        source: &RelationName,
        destination: &RelationName,
        overwrite: bool,
    ) -> Result<TableOutcome> {
        let Some(store) = self.store(source, destination) else {
            return Ok(TableOutcome::Unavailable);
        };

        if !self.analyzer.exists(destination).await? {
            let rows = store.create_table_as(destination, source).await?;
            tracing::info!(source = %source, destination = %destination, rows, "Created table");
            return Ok(TableOutcome::Created { rows });
        }

        match self.checker().check(source, destination).await? {
            Compatibility::Compatible { key, columns } => {
                let rows = store.upsert_rows(destination, source, &columns, key).await?;
                tracing::info!(
                    source = %source,
                    destination = %destination,
                    key = %key,
                    rows,
                    "Upserted rows"
                );
                Ok(TableOutcome::Upserted { rows })
            }
            Compatibility::Incompatible(reason) if !overwrite => {
                tracing::warn!(
                    source = %source,
                    destination = %destination,
                    reason = %reason,
                    "Destination exists but is not compatible with the source; \
                     enable overwrite to replace it"
                );
                Ok(TableOutcome::Skipped {
                    reason: reason.to_string(),
                })
            }
            Compatibility::Incompatible(reason) => {
                let rows = store.replace_table(destination, source).await?;
                tracing::info!(
                    source = %source,
                    destination = %destination,
                    reason = %reason,
                    rows,
                    "Replaced incompatible table"
                );
                Ok(TableOutcome::Replaced { rows })
            }
        }
    }

    /// Make `destination` a snapshot of `reference`. An existing destination
    /// is replaced only when `overwrite` is set.
    pub async fn snapshot_table(
        &self,
        reference: &RelationName,
        destination: &RelationName,
        overwrite: bool,
    ) -> Result<TableOutcome> {
        let Some(store) = self.store(reference, destination) else {
            return Ok(TableOutcome::Unavailable);
        };

        if !self.analyzer.exists(destination).await? {
            let rows = store.create_table_as(destination, reference).await?;
            tracing::info!(source = %reference, destination = %destination, rows, "Created snapshot");
            return Ok(TableOutcome::Created { rows });
        }

        if overwrite {
            let rows = store.replace_table(destination, reference).await?;
            tracing::info!(source = %reference, destination = %destination, rows, "Replaced snapshot");
            Ok(TableOutcome::Replaced { rows })
        } else {
            tracing::debug!(destination = %destination, "Snapshot exists; keeping it");
            Ok(TableOutcome::Kept)
        }
    }

    /// Append the rows of `source` whose global identifier does not appear in
    /// `destination`. Existing rows are never touched.
    pub async fn insert_missing(
        &self,
        source: &RelationName,
        destination: &RelationName,
    ) -> Result<TableOutcome> {
        let Some(store) = self.store(source, destination) else {
            return Ok(TableOutcome::Unavailable);
        };

        match self.checker().check(source, destination).await? {
            Compatibility::Compatible { key, columns } => {
                let rows = store
                    .insert_missing_rows(destination, source, &columns, key)
                    .await?;
                tracing::info!(
                    source = %source,
                    destination = %destination,
                    key = %key,
                    rows,
                    "Inserted missing rows"
                );
                Ok(TableOutcome::Inserted { rows })
            }
            Compatibility::Incompatible(reason) => {
                tracing::info!(
                    source = %source,
                    destination = %destination,
                    reason = %reason,
                    "Relations are not compatible; merge skipped"
                );
                Ok(TableOutcome::Skipped {
                    reason: reason.to_string(),
                })
            }
        }
    }
}
