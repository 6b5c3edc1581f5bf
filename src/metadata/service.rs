// Copyright (c) 2025 Hive Adapter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Catalog introspection: relation listing and column discovery.
//!
//! The introspector is stateless and depends only on the
//! [`QueryExecutor`] seam, so it can run over a live connection or over a
//! scripted executor in tests.
//!
//! Missing schemas and relations are recognized by matching driver error
//! text — the driver exposes no structured codes, and the phrasings vary
//! across warehouse versions, so this matching is a known compatibility
//! risk. Only the substrings below are recognized; nothing more is
//! guaranteed.

use crate::connection::{Connection, ConnectionManager};
use crate::driver::Row;
use crate::error::Result;
use crate::metadata::parse::{parse_describe_formatted, DescribeRow};
use crate::metadata::sql;
use crate::metadata::types::{HiveColumn, HiveRelation, RelationKind};
use std::collections::HashSet;
use tracing::debug;

/// Error substrings a driver emits for a missing relation.
const RELATION_NOT_FOUND_MARKERS: [&str; 4] = [
    "Table or view not found",
    "NoSuchTableException",
    "Could not resolve path",
    "Table not found",
];

/// Executes one statement and fetches its full result.
pub trait QueryExecutor {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;
}

/// The live executor: a connection driven through its manager.
pub struct Session<'a> {
    manager: &'a ConnectionManager,
    connection: &'a mut Connection,
}

impl<'a> Session<'a> {
    pub fn new(manager: &'a ConnectionManager, connection: &'a mut Connection) -> Self {
        Self {
            manager,
            connection,
        }
    }
}

impl QueryExecutor for Session<'_> {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let wrapper = self
            .manager
            .add_query(self.connection, sql, &[], false, false)?;
        Ok(wrapper.fetchall()?)
    }
}

/// List tables and views in a schema.
///
/// Older warehouse versions list views inside `show tables` as well, so
/// any name present in both listings is classified as a view exactly once;
/// the view classification wins on collision.
///
/// A missing schema is a valid exploratory outcome, not an error: the
/// recognized `Database '<schema>' not found` message yields an empty
/// listing, and any other execution failure is logged and also yields an
/// empty listing rather than aborting the caller's larger operation.
pub fn list_relations(
    executor: &mut dyn QueryExecutor,
    schema: &str,
) -> Result<Vec<HiveRelation>> {
    let listings = executor
        .query(&sql::build_show_tables(schema))
        .and_then(|tables| {
            executor
                .query(&sql::build_show_views(schema))
                .map(|views| (tables, views))
        });

    let (table_rows, view_rows) = match listings {
        Ok(listings) => listings,
        Err(e) => {
            let message = e.to_string();
            if !message.contains(&format!("Database '{schema}' not found")) {
                debug!("error while retrieving information about {schema}: {message}");
            }
            return Ok(Vec::new());
        }
    };

    let view_names: HashSet<String> = view_rows.iter().filter_map(relation_name).collect();

    let mut relations = Vec::new();
    for name in table_rows.iter().filter_map(relation_name) {
        if !view_names.contains(&name) {
            relations.push(HiveRelation::new(schema, name, RelationKind::Table));
        }
    }
    for name in view_rows.iter().filter_map(relation_name) {
        relations.push(HiveRelation::new(schema, name, RelationKind::View));
    }
    Ok(relations)
}

/// First cell of a `SHOW TABLES`/`SHOW VIEWS` row.
fn relation_name(row: &Row) -> Option<String> {
    row.first().map(|cell| cell.as_text()).filter(|n| !n.is_empty())
}

/// Columns of a relation via `describe formatted`.
///
/// A missing relation (any of the recognized driver phrasings) yields an
/// empty column list; every other failure is re-raised unchanged.
pub fn get_columns(
    executor: &mut dyn QueryExecutor,
    relation: &HiveRelation,
) -> Result<Vec<HiveColumn>> {
    match executor.query(&sql::build_describe_formatted(relation)) {
        Ok(rows) => {
            let describe_rows: Vec<DescribeRow> =
                rows.iter().map(DescribeRow::from_row).collect();
            Ok(parse_describe_formatted(relation, &describe_rows))
        }
        Err(e) => {
            let message = e.to_string();
            if RELATION_NOT_FOUND_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
            {
                Ok(Vec::new())
            } else {
                Err(e)
            }
        }
    }
}

/// Whether a schema exists, via `show databases`.
pub fn check_schema_exists(executor: &mut dyn QueryExecutor, schema: &str) -> Result<bool> {
    let rows = executor.query(&sql::build_show_databases())?;
    Ok(rows
        .iter()
        .filter_map(relation_name)
        .any(|name| name == schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SqlValue;
    use crate::error::AdapterError;
    use std::collections::HashMap;

    /// Scripted executor: statement text → rows or an error message.
    #[derive(Default)]
    struct MockExecutor {
        responses: HashMap<String, std::result::Result<Vec<Vec<&'static str>>, String>>,
        queries: Vec<String>,
    }

    impl MockExecutor {
        fn on_rows(mut self, sql: &str, rows: Vec<Vec<&'static str>>) -> Self {
            self.responses.insert(sql.to_string(), Ok(rows));
            self
        }

        fn on_error(mut self, sql: &str, message: &str) -> Self {
            self.responses
                .insert(sql.to_string(), Err(message.to_string()));
            self
        }
    }

    impl QueryExecutor for MockExecutor {
        fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
            self.queries.push(sql.to_string());
            match self.responses.get(sql) {
                Some(Ok(rows)) => Ok(rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|cell| SqlValue::Text(cell.to_string()))
                            .collect()
                    })
                    .collect()),
                Some(Err(message)) => Err(AdapterError::Runtime(message.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn test_list_relations_reconciles_tables_and_views() {
        let mut executor = MockExecutor::default()
            .on_rows(
                "show tables in `analytics`",
                vec![vec!["events"], vec!["users"], vec!["daily_summary"]],
            )
            .on_rows("show views in `analytics`", vec![vec!["daily_summary"]]);

        let relations = list_relations(&mut executor, "analytics").unwrap();

        assert_eq!(relations.len(), 3);
        assert_eq!(relations[0].identifier, "events");
        assert_eq!(relations[0].kind, RelationKind::Table);
        assert_eq!(relations[1].identifier, "users");
        assert_eq!(relations[2].identifier, "daily_summary");
        assert_eq!(relations[2].kind, RelationKind::View);

        // the view appears exactly once, never as a table
        let summaries: Vec<_> = relations
            .iter()
            .filter(|r| r.identifier == "daily_summary")
            .collect();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].kind, RelationKind::View);
    }

    #[test]
    fn test_list_relations_missing_schema_is_empty() {
        let mut executor = MockExecutor::default().on_error(
            "show tables in `nope`",
            "Error while compiling statement: Database 'nope' not found",
        );
        let relations = list_relations(&mut executor, "nope").unwrap();
        assert!(relations.is_empty());
    }

    #[test]
    fn test_list_relations_other_errors_are_also_empty() {
        let mut executor = MockExecutor::default()
            .on_error("show tables in `analytics`", "connection reset by peer");
        let relations = list_relations(&mut executor, "analytics").unwrap();
        assert!(relations.is_empty());
    }

    #[test]
    fn test_list_relations_view_listing_failure_is_empty() {
        let mut executor = MockExecutor::default()
            .on_rows("show tables in `analytics`", vec![vec!["events"]])
            .on_error("show views in `analytics`", "unexpected token");
        let relations = list_relations(&mut executor, "analytics").unwrap();
        assert!(relations.is_empty());
    }

    #[test]
    fn test_get_columns_parses_describe_output() {
        let mut executor = MockExecutor::default().on_rows(
            "describe formatted `analytics`.`events`",
            vec![
                vec!["id", "int", ""],
                vec!["payload", "string", ""],
                vec!["# Detailed Table Information", "", ""],
                vec!["Owner:", "etl_user", ""],
            ],
        );
        let relation = HiveRelation::new("analytics", "events", RelationKind::Table);
        let columns = get_columns(&mut executor, &relation).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].table_owner.as_deref(), Some("etl_user"));
        assert_eq!(columns[1].index, 1);
    }

    #[test]
    fn test_get_columns_missing_relation_is_empty() {
        for message in [
            "Error: Table or view not found: analytics.ghost",
            "org.apache.spark.sql.catalyst.analysis.NoSuchTableException",
            "AnalysisException: Could not resolve path: analytics.ghost",
            "SemanticException: Table not found ghost",
        ] {
            let mut executor = MockExecutor::default()
                .on_error("describe formatted `analytics`.`ghost`", message);
            let relation = HiveRelation::new("analytics", "ghost", RelationKind::Table);
            let columns = get_columns(&mut executor, &relation).unwrap();
            assert!(columns.is_empty(), "should be empty for: {message}");
        }
    }

    #[test]
    fn test_get_columns_unrelated_error_is_reraised() {
        let mut executor = MockExecutor::default().on_error(
            "describe formatted `analytics`.`events`",
            "connection reset by peer",
        );
        let relation = HiveRelation::new("analytics", "events", RelationKind::Table);
        let err = get_columns(&mut executor, &relation).unwrap_err();
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[test]
    fn test_check_schema_exists() {
        let mut executor = MockExecutor::default().on_rows(
            "show databases",
            vec![vec!["default"], vec!["analytics"]],
        );
        assert!(check_schema_exists(&mut executor, "analytics").unwrap());
        assert!(!check_schema_exists(&mut executor, "missing").unwrap());
    }
}
