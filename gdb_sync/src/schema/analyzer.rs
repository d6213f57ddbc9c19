//! Database schema analyzer
//!
//! Enumerates the relations of a schema and the columns of a relation. With
//! no database handle every query answers with an empty result.

use std::collections::BTreeSet;

use crate::db::store::Store;
use crate::error::Result;
use crate::schema::types::{ColumnSet, RelationName};

/// Schema analyzer for relation and column introspection
pub struct SchemaAnalyzer<'a, S: ?Sized> {
    store: Option<&'a S>,
    include_views: bool,
}

impl<S: ?Sized> Clone for SchemaAnalyzer<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for SchemaAnalyzer<'_, S> {}

impl<'a, S: Store + ?Sized> SchemaAnalyzer<'a, S> {
    /// Create a new schema analyzer
    pub fn new(store: Option<&'a S>, include_views: bool) -> Self {
        Self { store, include_views }
    }

    pub fn store(&self) -> Option<&'a S> {
        self.store
    }

    /// Qualified names of the tables (and views, if enabled) in `schema`
    pub async fn list_relations(&self, schema: &str) -> Result<BTreeSet<RelationName>> {
        let Some(store) = self.store else {
            tracing::warn!(schema, "No database connection; cannot list relations");
            return Ok(BTreeSet::new());
        };

        let relations = store
            .relation_names(&schema.to_lowercase(), self.include_views)
            .await?;
        tracing::debug!(schema, count = relations.len(), "Listed relations");

        Ok(relations)
    }

    /// Column names of `relation`; empty when it does not exist
    pub async fn list_columns(&self, relation: &RelationName) -> Result<ColumnSet> {
        let Some(store) = self.store else {
            tracing::warn!(relation = %relation, "No database connection; cannot list columns");
            return Ok(ColumnSet::new());
        };

        store.column_names(relation).await
    }

    /// Whether the `schema.table` identifier names an existing relation.
    /// Fails if the identifier is not schema-qualified.
    pub async fn relation_exists(&self, relation: &str) -> Result<bool> {
        let relation = RelationName::parse(relation)?;
        self.exists(&relation).await
    }

    pub async fn exists(&self, relation: &RelationName) -> Result<bool> {
        match self.store {
            Some(store) => store.relation_exists(relation).await,
            None => Ok(false),
        }
    }
}
