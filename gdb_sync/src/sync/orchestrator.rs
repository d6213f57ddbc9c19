//! Schema synchronization driver
//!
//! Walks every relation of a schema, one at a time, handing each pair to the
//! [`TableCopier`]. A failing relation is logged and recorded; the run moves
//! on to the next one.

use chrono::Utc;
use std::collections::BTreeSet;
use tracing::Instrument;

use crate::config::{MergeStrategy, SyncConfig};
use crate::db::store::Store;
use crate::error::{Error, Result};
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::types::RelationName;
use crate::sync::copier::TableCopier;
use crate::sync::report::{SyncReport, TableOutcome, TableReport};
use crate::utils::naming::staging_schema_name;

/// Merges a source schema into a target schema
pub struct Synchronizer<'a, S: ?Sized> {
    store: Option<&'a S>,
    options: SyncConfig,
    source: String,
    target: String,
    staging: String,
}

impl<'a, S: Store + ?Sized> Synchronizer<'a, S> {
    /// Schema names are lower-cased. The staging schema name is fixed here,
    /// from the current time.
    pub fn new(store: Option<&'a S>, options: SyncConfig, source: &str, target: &str) -> Self {
        let staging = staging_schema_name(&options.staging_prefix, Utc::now());

        Self {
            store,
            options,
            source: source.to_lowercase(),
            target: target.to_lowercase(),
            staging,
        }
    }

    /// Use `staging` instead of the timestamped default
    pub fn with_staging_schema(mut self, staging: &str) -> Self {
        self.staging = staging.to_lowercase();
        self
    }

    fn analyzer(&self) -> SchemaAnalyzer<'a, S> {
        SchemaAnalyzer::new(self.store, self.options.include_views)
    }

    /// Run the synchronization. A staging schema that cannot be prepared or
    /// a schema that cannot be listed fails the run; per-relation failures
    /// end up in the report.
    pub async fn run(&self) -> Result<SyncReport> {
        let span = tracing::info_span!(
            "synchronize",
            source = %self.source,
            target = %self.target,
            strategy = %self.options.strategy
        );

        async {
            let report = match self.options.strategy {
                MergeStrategy::Staged => self.run_staged().await,
                MergeStrategy::Upsert => self.run_upsert().await,
            };

            match &report {
                Ok(report) if report.is_degraded() => tracing::warn!(
                    failed = report.failures().count(),
                    total = report.tables.len(),
                    "Synchronization finished with failures"
                ),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Synchronization aborted"),
            }

            report
        }
        .instrument(span)
        .await
    }

    fn report(&self, staging: Option<String>) -> SyncReport {
        SyncReport {
            source: self.source.clone(),
            target: self.target.clone(),
            staging,
            strategy: self.options.strategy,
            tables: Vec::new(),
        }
    }

    async fn run_upsert(&self) -> Result<SyncReport> {
        let analyzer = self.analyzer();
        let copier = TableCopier::new(analyzer);
        let mut report = self.report(None);

        tracing::info!("Copying data from schema {:?} to {:?}", self.source, self.target);

        for source in self.relations(&analyzer, &self.source).await? {
            let destination = source.with_schema(&self.target);
            let mut table = TableReport::new(source.clone(), destination.clone());

            tracing::info!(source = %source, destination = %destination, "Copying table");
            let outcome = copier
                .copy_table(&source, &destination, self.options.overwrite)
                .await;
            table.outcomes.push(settle(outcome, &source, &destination));

            report.tables.push(table);
        }

        tracing::info!("Schema {:?} has been merged into {:?}", self.source, self.target);

        Ok(report)
    }

    async fn run_staged(&self) -> Result<SyncReport> {
        let analyzer = self.analyzer();
        let copier = TableCopier::new(analyzer);
        let mut report = self.report(Some(self.staging.clone()));

        self.prepare_staging().await?;

        tracing::info!(
            staging = %self.staging,
            "Merging schema {:?} with {:?}",
            self.source,
            self.target
        );

        // Both listings happen before any copy: a staging schema built from a
        // partial listing would silently drop target records.
        let targets = self.relations(&analyzer, &self.target).await?;
        let sources = self.relations(&analyzer, &self.source).await?;
        let target_tables: BTreeSet<String> = targets
            .iter()
            .map(|relation| relation.table().to_string())
            .collect();

        for target in &targets {
            let staged = target.with_schema(&self.staging);
            let source = target.with_schema(&self.source);
            let mut table = TableReport::new(source.clone(), staged.clone());

            tracing::info!(reference = %target, destination = %staged, "Staging table");
            let snapshot = copier
                .snapshot_table(target, &staged, self.options.overwrite)
                .await;
            let snapshot = settle(snapshot, target, &staged);
            let snapshot_ok = !matches!(snapshot, TableOutcome::Failed { .. } | TableOutcome::Unavailable);
            table.outcomes.push(snapshot);

            if snapshot_ok {
                let merged = copier.insert_missing(&source, &staged).await;
                table.outcomes.push(settle(merged, &source, &staged));
            }

            report.tables.push(table);
        }

        // Relations with no counterpart in the target still belong in the
        // merged result.
        for source in sources {
            if target_tables.contains(source.table()) {
                continue;
            }

            let staged = source.with_schema(&self.staging);
            let mut table = TableReport::new(source.clone(), staged.clone());

            tracing::info!(source = %source, destination = %staged, "Staging source-only table");
            let outcome = copier
                .snapshot_table(&source, &staged, self.options.overwrite)
                .await;
            table.outcomes.push(settle(outcome, &source, &staged));

            report.tables.push(table);
        }

        tracing::info!(
            "Schema {:?} has been merged with {:?} into {:?}",
            self.source,
            self.target,
            self.staging
        );

        Ok(report)
    }

    async fn prepare_staging(&self) -> Result<()> {
        let Some(store) = self.store else {
            return Err(Error::StagingError(format!(
                "cannot create staging schema {:?} without a database connection",
                self.staging
            )));
        };

        store.reset_schema(&self.staging).await.map_err(|e| {
            Error::StagingError(format!("failed to create staging schema {:?}: {}", self.staging, e))
        })?;
        tracing::info!(staging = %self.staging, "Created staging schema");

        Ok(())
    }

    /// Relations of `schema`
    async fn relations(&self, analyzer: &SchemaAnalyzer<'a, S>, schema: &str) -> Result<BTreeSet<RelationName>> {
        analyzer.list_relations(schema).await.map_err(|e| {
            tracing::error!(schema, error = %e, "Failed to list relations");
            e
        })
    }
}

/// Turn a per-relation error into a recorded failure
fn settle(outcome: Result<TableOutcome>, source: &RelationName, destination: &RelationName) -> TableOutcome {
    outcome.unwrap_or_else(|e| {
        tracing::error!(
            source = %source,
            destination = %destination,
            error = %e,
            "Failed to copy {} into {}",
            source,
            destination
        );
        TableOutcome::Failed {
            error: e.to_string(),
        }
    })
}
