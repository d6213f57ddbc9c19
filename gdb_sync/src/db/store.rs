//! Store abstraction
//!
//! Everything the synchronizer needs from the database. The PostgreSQL
//! implementation lives on [`DatabaseConnection`](crate::db::DatabaseConnection).
//! Every write operation runs in its own transaction and is committed before
//! it returns.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::schema::types::{ColumnSet, GlobalIdColumn, RelationName};

#[async_trait]
pub trait Store: Send + Sync {
    /// Base tables, plus views when `include_views` is set, in `schema`
    async fn relation_names(&self, schema: &str, include_views: bool) -> Result<BTreeSet<RelationName>>;

    /// Column names of `relation`. A missing relation yields an empty set.
    async fn column_names(&self, relation: &RelationName) -> Result<ColumnSet>;

    /// Whether the catalog knows `relation`
    async fn relation_exists(&self, relation: &RelationName) -> Result<bool>;

    /// `CREATE TABLE destination AS SELECT * FROM source`; returns rows copied
    async fn create_table_as(&self, destination: &RelationName, source: &RelationName) -> Result<u64>;

    /// Drop `destination` (cascading) and recreate it from `source`
    async fn replace_table(&self, destination: &RelationName, source: &RelationName) -> Result<u64>;

    /// Insert all rows of `source`, updating rows whose `key` already exists
    async fn upsert_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64>;

    /// Insert the rows of `source` whose `key` is absent from `destination`
    async fn insert_missing_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64>;

    /// Drop `schema` if it exists and create it empty
    async fn reset_schema(&self, schema: &str) -> Result<()>;
}
