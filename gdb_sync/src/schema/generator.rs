//! SQL statement generation
//!
//! Identifiers are always quoted with [`quote_identifier`]; literal values are
//! never spliced in and go through bind parameters instead.

use crate::schema::types::{ColumnSet, GlobalIdColumn, RelationName};
use crate::utils::naming::{quote_identifier, quote_list};

/// Catalog query listing base tables, and views when `$2` is true, of schema `$1`
pub const LIST_RELATIONS_SQL: &str = r#"
    SELECT table_schema::text AS table_schema, table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema = $1
      AND (table_type = 'BASE TABLE' OR ($2 AND table_type = 'VIEW'))
    ORDER BY table_name
"#;

/// Catalog query checking for relation `$1`.`$2`
pub const RELATION_EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1 FROM information_schema.tables
        WHERE table_schema = $1 AND table_name = $2
    )
"#;

/// Zero-row projection used to read a relation's columns without scanning it
pub fn empty_projection(relation: &RelationName) -> String {
    format!("SELECT * FROM {} WHERE false", relation.quoted())
}

/// Snapshot `source` into a new table `destination`
pub fn create_table_as(destination: &RelationName, source: &RelationName) -> String {
    format!(
        "CREATE TABLE {} AS SELECT * FROM {}",
        destination.quoted(),
        source.quoted()
    )
}

pub fn drop_table_cascade(table: &RelationName) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE", table.quoted())
}

/// Drop `destination` and its dependents, then recreate it from `source`
pub fn replace_table(destination: &RelationName, source: &RelationName) -> Vec<String> {
    vec![
        drop_table_cascade(destination),
        create_table_as(destination, source),
    ]
}

/// Copy every row of `source` into `destination`; rows whose key already
/// exists take the incoming values.
pub fn upsert_rows(
    destination: &RelationName,
    source: &RelationName,
    columns: &ColumnSet,
    key: GlobalIdColumn,
) -> String {
    let column_list = quote_list(columns.iter().map(String::as_str));
    let updates: Vec<String> = columns
        .iter()
        .filter(|column| column.as_str() != key.as_str())
        .map(|column| {
            let column = quote_identifier(column);
            format!("{} = EXCLUDED.{}", column, column)
        })
        .collect();

    let conflict_action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {} ON CONFLICT ({}) {}",
        destination.quoted(),
        column_list,
        column_list,
        source.quoted(),
        quote_identifier(key.as_str()),
        conflict_action
    )
}

/// Append the rows of `source` whose key does not appear in `destination`.
/// Rows with a NULL key are left out.
pub fn insert_missing_rows(
    destination: &RelationName,
    source: &RelationName,
    columns: &ColumnSet,
    key: GlobalIdColumn,
) -> String {
    let key = quote_identifier(key.as_str());
    let column_list = quote_list(columns.iter().map(String::as_str));
    let select_list = columns
        .iter()
        .map(|column| format!("s.{}", quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {dest} ({columns}) SELECT {select} FROM {src} AS s \
         WHERE s.{key} IS NOT NULL \
         AND NOT EXISTS (SELECT 1 FROM {dest} AS d WHERE d.{key} = s.{key})",
        dest = destination.quoted(),
        columns = column_list,
        select = select_list,
        src = source.quoted(),
        key = key,
    )
}

/// Drop `schema` if present and create it empty
pub fn reset_schema(schema: &str) -> Vec<String> {
    let schema = quote_identifier(schema);
    vec![
        format!("DROP SCHEMA IF EXISTS {} CASCADE", schema),
        format!("CREATE SCHEMA {}", schema),
    ]
}
