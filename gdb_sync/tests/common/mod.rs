//! In-memory store used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use gdb_sync::schema::{ColumnSet, GlobalIdColumn, RelationName};
use gdb_sync::{Error, Result, Store};

type Row = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    unique_key: Option<String>,
    view: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    relations: Mutex<HashMap<RelationName, MemoryTable>>,
    schemas: Mutex<BTreeSet<String>>,
    failing: Mutex<BTreeSet<RelationName>>,
    unlistable: Mutex<BTreeSet<String>>,
}

/// Names are kept exactly as written, the way the catalog reports them
fn relation(name: &str) -> RelationName {
    let (schema, table) = name.split_once('.').expect("qualified test relation");
    RelationName::from_catalog(schema, table)
}

fn store_error(message: String) -> Error {
    Error::SqlxError(sqlx::Error::Protocol(message))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base table. `None` cells are NULL.
    pub fn table(&self, name: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> &Self {
        self.insert(name, columns, rows, None, false)
    }

    /// Add a base table with a unique constraint on `key`
    pub fn keyed_table(&self, name: &str, key: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> &Self {
        self.insert(name, columns, rows, Some(key), false)
    }

    pub fn view(&self, name: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> &Self {
        self.insert(name, columns, rows, None, true)
    }

    /// Declare an empty schema
    pub fn schema(&self, name: &str) -> &Self {
        self.schemas.lock().unwrap().insert(name.to_string());
        self
    }

    /// Make every write to `name` fail
    pub fn fail_writes_to(&self, name: &str) -> &Self {
        self.failing.lock().unwrap().insert(relation(name));
        self
    }

    /// Make listing the relations of `schema` fail
    pub fn fail_listing(&self, schema: &str) -> &Self {
        self.unlistable.lock().unwrap().insert(schema.to_string());
        self
    }

    fn insert(
        &self,
        name: &str,
        columns: &[&str],
        rows: &[&[Option<&str>]],
        unique_key: Option<&str>,
        view: bool,
    ) -> &Self {
        let name = relation(name);
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values.iter().map(|v| v.map(str::to_string)))
                    .collect::<Row>()
            })
            .collect();

        self.schemas.lock().unwrap().insert(name.schema().to_string());
        self.relations.lock().unwrap().insert(
            name,
            MemoryTable {
                columns,
                rows,
                unique_key: unique_key.map(str::to_string),
                view,
            },
        );
        self
    }

    pub fn exists(&self, name: &str) -> bool {
        self.relations.lock().unwrap().contains_key(&relation(name))
    }

    pub fn schema_exists(&self, schema: &str) -> bool {
        self.schemas.lock().unwrap().contains(schema)
    }

    /// Column names in definition order
    pub fn columns(&self, name: &str) -> Vec<String> {
        self.relations.lock().unwrap()[&relation(name)].columns.clone()
    }

    /// Rows as `column=value` strings, sorted, for order-insensitive comparison
    pub fn rows(&self, name: &str) -> Vec<Vec<String>> {
        let relations = self.relations.lock().unwrap();
        let table = &relations[&relation(name)];
        let mut rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                table
                    .columns
                    .iter()
                    .map(|column| {
                        let value = row.get(column).cloned().flatten();
                        format!("{}={}", column, value.as_deref().unwrap_or("NULL"))
                    })
                    .collect::<Vec<String>>()
            })
            .collect();
        rows.sort();
        rows
    }

    fn check_writable(&self, name: &RelationName) -> Result<()> {
        if self.failing.lock().unwrap().contains(name) {
            return Err(store_error(format!("permission denied for table {}", name)));
        }
        Ok(())
    }

    fn snapshot_of(&self, source: &RelationName) -> Result<MemoryTable> {
        let relations = self.relations.lock().unwrap();
        let table = relations
            .get(source)
            .ok_or_else(|| store_error(format!("relation \"{}\" does not exist", source)))?;

        Ok(MemoryTable {
            columns: table.columns.clone(),
            rows: table.rows.clone(),
            unique_key: None,
            view: false,
        })
    }
}

fn key_of(row: &Row, key: GlobalIdColumn) -> Option<String> {
    row.get(key.as_str()).cloned().flatten()
}

fn project(row: &Row, columns: &ColumnSet) -> Row {
    columns
        .iter()
        .map(|column| (column.clone(), row.get(column).cloned().flatten()))
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn relation_names(&self, schema: &str, include_views: bool) -> Result<BTreeSet<RelationName>> {
        if self.unlistable.lock().unwrap().contains(schema) {
            return Err(store_error(format!("permission denied for schema {}", schema)));
        }

        Ok(self
            .relations
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, table)| name.schema() == schema && (include_views || !table.view))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn column_names(&self, relation: &RelationName) -> Result<ColumnSet> {
        Ok(self
            .relations
            .lock()
            .unwrap()
            .get(relation)
            .map(|table| table.columns.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn relation_exists(&self, relation: &RelationName) -> Result<bool> {
        Ok(self.relations.lock().unwrap().contains_key(relation))
    }

    async fn create_table_as(&self, destination: &RelationName, source: &RelationName) -> Result<u64> {
        self.check_writable(destination)?;
        if !self.schema_exists(destination.schema()) {
            return Err(store_error(format!(
                "schema \"{}\" does not exist",
                destination.schema()
            )));
        }
        if self.relations.lock().unwrap().contains_key(destination) {
            return Err(store_error(format!("relation \"{}\" already exists", destination)));
        }

        let table = self.snapshot_of(source)?;
        let rows = table.rows.len() as u64;
        self.relations.lock().unwrap().insert(destination.clone(), table);
        Ok(rows)
    }

    async fn replace_table(&self, destination: &RelationName, source: &RelationName) -> Result<u64> {
        self.check_writable(destination)?;
        let table = self.snapshot_of(source)?;
        let rows = table.rows.len() as u64;
        self.relations.lock().unwrap().insert(destination.clone(), table);
        Ok(rows)
    }

    async fn upsert_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64> {
        self.check_writable(destination)?;
        let incoming = self.snapshot_of(source)?.rows;
        let mut relations = self.relations.lock().unwrap();
        let table = relations
            .get_mut(destination)
            .ok_or_else(|| store_error(format!("relation \"{}\" does not exist", destination)))?;

        if table.unique_key.as_deref() != Some(key.as_str()) {
            return Err(store_error(
                "there is no unique or exclusion constraint matching the ON CONFLICT specification"
                    .to_string(),
            ));
        }

        let mut affected = 0;
        for row in incoming {
            let row = project(&row, columns);
            let incoming_key = key_of(&row, key);
            let existing = table
                .rows
                .iter_mut()
                .find(|existing| incoming_key.is_some() && key_of(existing, key) == incoming_key);

            match existing {
                Some(existing) => existing.extend(row),
                None => table.rows.push(row),
            }
            affected += 1;
        }

        Ok(affected)
    }

    async fn insert_missing_rows(
        &self,
        destination: &RelationName,
        source: &RelationName,
        columns: &ColumnSet,
        key: GlobalIdColumn,
    ) -> Result<u64> {
        self.check_writable(destination)?;
        let incoming = self.snapshot_of(source)?.rows;
        let mut relations = self.relations.lock().unwrap();
        let table = relations
            .get_mut(destination)
            .ok_or_else(|| store_error(format!("relation \"{}\" does not exist", destination)))?;

        let present: BTreeSet<String> = table.rows.iter().filter_map(|row| key_of(row, key)).collect();
        let missing: Vec<Row> = incoming
            .iter()
            .filter(|row| matches!(key_of(row, key), Some(value) if !present.contains(&value)))
            .map(|row| project(row, columns))
            .collect();

        let inserted = missing.len() as u64;
        table.rows.extend(missing);
        Ok(inserted)
    }

    async fn reset_schema(&self, schema: &str) -> Result<()> {
        self.relations
            .lock()
            .unwrap()
            .retain(|name, _| name.schema() != schema);
        self.schemas.lock().unwrap().insert(schema.to_string());
        Ok(())
    }
}
