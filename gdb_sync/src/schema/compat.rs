//! Compatibility checks between a source and a destination relation
//!
//! A source can be merged into a destination when the destination's columns
//! are a subset of the source's and both carry the same spelling of the
//! global identifier column. This is what keeps an upsert or an
//! insert-missing from referencing a key one side lacks.

use std::fmt;

use crate::db::store::Store;
use crate::error::Result;
use crate::schema::analyzer::SchemaAnalyzer;
use crate::schema::types::{ColumnSet, GlobalIdColumn, RelationName};

/// Outcome of comparing two column sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Mergeable on `key`; `columns` are the destination's columns
    Compatible {
        key: GlobalIdColumn,
        columns: ColumnSet,
    },
    Incompatible(Incompatibility),
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Compatibility::Compatible { .. })
    }
}

/// Why two relations cannot be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incompatibility {
    /// No columns came back: missing relation, no connection, or a
    /// zero-column relation
    EmptyColumnSet { relation: String },
    /// Destination columns the source does not have
    ExtraColumns { columns: Vec<String> },
    MissingGlobalId,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incompatibility::EmptyColumnSet { relation } => {
                write!(f, "no columns found for {}", relation)
            }
            Incompatibility::ExtraColumns { columns } => {
                write!(f, "destination has columns missing from source: {}", columns.join(", "))
            }
            Incompatibility::MissingGlobalId => {
                write!(f, "no `globalid` or `global_id` column shared by both relations")
            }
        }
    }
}

/// Decide whether rows with `source_columns` can be merged into a relation
/// with `destination_columns`
pub fn assess(
    source: &RelationName,
    source_columns: &ColumnSet,
    destination: &RelationName,
    destination_columns: &ColumnSet,
) -> Compatibility {
    if source_columns.is_empty() {
        return Compatibility::Incompatible(Incompatibility::EmptyColumnSet {
            relation: source.to_string(),
        });
    }

    if destination_columns.is_empty() {
        return Compatibility::Incompatible(Incompatibility::EmptyColumnSet {
            relation: destination.to_string(),
        });
    }

    let extra: Vec<String> = destination_columns
        .difference(source_columns)
        .cloned()
        .collect();
    if !extra.is_empty() {
        return Compatibility::Incompatible(Incompatibility::ExtraColumns { columns: extra });
    }

    match GlobalIdColumn::shared(source_columns, destination_columns) {
        Some(key) => Compatibility::Compatible {
            key,
            columns: destination_columns.clone(),
        },
        None => Compatibility::Incompatible(Incompatibility::MissingGlobalId),
    }
}

/// Fetches column sets through the analyzer and applies [`assess`]
pub struct CompatibilityChecker<'a, S: ?Sized> {
    analyzer: SchemaAnalyzer<'a, S>,
}

impl<'a, S: Store + ?Sized> CompatibilityChecker<'a, S> {
    pub fn new(analyzer: SchemaAnalyzer<'a, S>) -> Self {
        Self { analyzer }
    }

    pub async fn check(&self, source: &RelationName, destination: &RelationName) -> Result<Compatibility> {
        let source_columns = self.analyzer.list_columns(source).await?;
        let destination_columns = self.analyzer.list_columns(destination).await?;

        let compatibility = assess(source, &source_columns, destination, &destination_columns);
        tracing::debug!(
            source = %source,
            destination = %destination,
            compatible = compatibility.is_compatible(),
            "Checked compatibility"
        );

        Ok(compatibility)
    }

    pub async fn is_compatible(&self, source: &RelationName, destination: &RelationName) -> Result<bool> {
        Ok(self.check(source, destination).await?.is_compatible())
    }
}
