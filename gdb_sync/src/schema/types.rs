//! Type definitions for relations and their columns

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::naming::quote_identifier;

/// Column names of a relation. Ordered so generated SQL is stable.
pub type ColumnSet = BTreeSet<String>;

/// A schema-qualified relation name (`schema.table`)
///
/// Names supplied by callers are lower-cased; names read back from the
/// catalog keep their case so mixed-case tables stay reachable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationName {
    schema: String,
    table: String,
}

impl RelationName {
    /// Create a relation name from its two parts
    pub fn new(schema: &str, table: &str) -> Self {
        Self {
            schema: schema.to_lowercase(),
            table: table.to_lowercase(),
        }
    }

    /// A relation exactly as the catalog reports it
    pub fn from_catalog(schema: &str, table: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
        }
    }

    /// Parse a `schema.table` identifier
    pub fn parse(name: &str) -> Result<Self> {
        let mut parts = name.split('.');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(schema), Some(table), None) if !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(schema, table))
            }
            _ => Err(Error::InvalidRelation(format!(
                "`{}` must be a full relation name in the form `schema.table`",
                name
            ))),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The same table name in another schema. The table keeps its case.
    pub fn with_schema(&self, schema: &str) -> Self {
        Self {
            schema: schema.to_lowercase(),
            table: self.table.clone(),
        }
    }

    /// Both parts quoted for use in SQL
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_identifier(&self.schema), quote_identifier(&self.table))
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

impl FromStr for RelationName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The column that identifies a logical record across checkouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalIdColumn {
    #[serde(rename = "globalid")]
    GlobalId,
    #[serde(rename = "global_id")]
    GlobalUnderscoreId,
}

impl GlobalIdColumn {
    /// Accepted spellings, most preferred first
    pub const ALL: [GlobalIdColumn; 2] = [GlobalIdColumn::GlobalId, GlobalIdColumn::GlobalUnderscoreId];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalIdColumn::GlobalId => "globalid",
            GlobalIdColumn::GlobalUnderscoreId => "global_id",
        }
    }

    /// The spelling present in both column sets, preferring `globalid`
    pub fn shared(left: &ColumnSet, right: &ColumnSet) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| left.contains(key.as_str()) && right.contains(key.as_str()))
    }
}

impl fmt::Display for GlobalIdColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
