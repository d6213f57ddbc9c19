//! SQL executor
//!
//! PostgreSQL implementation of [`Store`]. Each write runs in a transaction
//! of its own, committed before the call returns.

use async_trait::async_trait;
use sqlx::{Column, Executor, FromRow, Statement};
use std::collections::BTreeSet;

use crate::db::connection::DatabaseConnection;
use crate::db::store::Store;
use crate::error::{Error, Result};
use crate::schema::generator;
use crate::schema::types::{ColumnSet, GlobalIdColumn, RelationName};

#[derive(FromRow)]
struct RelationRow {
    table_schema: String,
    table_name: String,
}

impl DatabaseConnection {
    /// Execute statements in order inside one transaction, returning the
    /// rows affected by the last one
    pub async fn execute_in_transaction(&self, statements: &[String]) -> Result<u64> {
        let mut tx = self.pool().begin().await?;
        let mut rows_affected = 0;

        for statement in statements {
            tracing::debug!(sql = %statement, "Executing statement");
            rows_affected = sqlx::query(statement).execute(&mut *tx).await?.rows_affected();
        }

        // an early return above drops `tx`, which rolls it back
        tx.commit().await?;

        Ok(rows_affected)
    }
}

#[async_trait]
impl Store for DatabaseConnection {
    async fn relation_names(&self, schema: &str, include_views: bool) -> Result<BTreeSet<RelationName>> {
        let rows = sqlx::query_as::<_, RelationRow>(generator::LIST_RELATIONS_SQL)
            .bind(schema)
            .bind(include_views)
            .fetch_all(self.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RelationName::from_catalog(&row.table_schema, &row.table_name))
            .collect())
    }

    async fn column_names(&self, relation: &RelationName) -> Result<ColumnSet> {
        let sql = generator::empty_projection(relation);

        match self.pool().prepare(&sql).await {
            Ok(statement) => Ok(statement
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()),
            Err(e) => {
                let e = Error::from(e);
                if e.is_missing_relation() {
                    tracing::debug!(relation = %relation, "Relation does not exist");
                    Ok(ColumnSet::new())
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn relation_exists(&self, relation: &RelationName) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(generator::RELATION_EXISTS_SQL)
            .bind(relation.schema())
            .bind(relation.table())
            .fetch_one(self.pool())
            .await?;

        Ok(exists)
    }

    async fn create_table_as(&self, destination: &RelationName, source: &RelationName) -> Result<u64> {
        self.execute_in_transaction(&[generator::create_table_as(destination, source)])
            .await
    }

    async fn replace_table(&self, destination: &RelationName, source: &RelationName) -> Result<u64> {
        self.execute_in_transaction(&generator::replace_table(destination, source))
            .await
    }

    async fn upsert_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64> {
        self.execute_in_transaction(&[generator::upsert_rows(destination, source, columns, key)])
            .await
    }

    async fn insert_missing_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64> {
        self.execute_in_transaction(&[generator::insert_missing_rows(destination, source, columns, key)])
            .await
    }

    async fn reset_schema(&self, schema: &str) -> Result<()> {
        self.execute_in_transaction(&generator::reset_schema(schema)).await?;
        Ok(())
    }
}
