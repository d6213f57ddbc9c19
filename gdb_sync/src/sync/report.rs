//! Results of a synchronization run

use serde::Serialize;

use crate::config::MergeStrategy;
use crate::error::Result;
use crate::schema::types::RelationName;

/// What a single copy or merge step did to its destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Destination did not exist and was created from the source
    Created { rows: u64 },
    /// Source rows were upserted into the existing destination
    Upserted { rows: u64 },
    /// Destination was dropped and recreated from the source
    Replaced { rows: u64 },
    /// Source rows missing from the destination were appended
    Inserted { rows: u64 },
    /// Destination already existed and overwriting was not allowed
    Kept,
    Skipped { reason: String },
    Failed { error: String },
    /// No database connection
    Unavailable,
}

impl TableOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TableOutcome::Failed { .. })
    }
}

/// Steps performed for one relation
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub source: RelationName,
    pub destination: RelationName,
    pub outcomes: Vec<TableOutcome>,
}

impl TableReport {
    pub fn new(source: RelationName, destination: RelationName) -> Self {
        Self {
            source,
            destination,
            outcomes: Vec::new(),
        }
    }

    pub fn failed(&self) -> bool {
        self.outcomes.iter().any(TableOutcome::is_failure)
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub source: String,
    pub target: String,
    pub staging: Option<String>,
    pub strategy: MergeStrategy,
    pub tables: Vec<TableReport>,
}

impl SyncReport {
    /// Relations with at least one failed step
    pub fn failures(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|table| table.failed())
    }

    /// True when some relations failed; the rest of the run still completed
    pub fn is_degraded(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Report for the relation whose destination is `destination`
    pub fn table(&self, destination: &RelationName) -> Option<&TableReport> {
        self.tables.iter().find(|table| &table.destination == destination)
    }

    /// The report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_report_tags_each_outcome() {
        let mut table = TableReport::new(RelationName::new("kano", "people"), RelationName::new("staging", "people"));
        table.outcomes.push(TableOutcome::Created { rows: 3 });
        table.outcomes.push(TableOutcome::Failed {
            error: "permission denied".to_string(),
        });
        let report = SyncReport {
            source: "kano".to_string(),
            target: "kaduna".to_string(),
            staging: Some("staging".to_string()),
            strategy: MergeStrategy::Staged,
            tables: vec![table],
        };

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["staging"], "staging");
        assert_eq!(json["tables"][0]["destination"]["table"], "people");
        assert_eq!(
            json["tables"][0]["outcomes"],
            serde_json::json!([
                { "outcome": "created", "rows": 3 },
                { "outcome": "failed", "error": "permission denied" }
            ])
        );
        assert!(report.is_degraded());
    }
}
