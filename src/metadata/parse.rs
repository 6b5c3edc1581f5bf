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

//! Parsing of `DESCRIBE FORMATTED` output.
//!
//! The statement returns one loosely structured row stream with three
//! segments in fixed order:
//!
//! 1. column definitions;
//! 2. an optional partition block, introduced by `# Partition Information`
//!    (plain partitioning) or `# Partition Transform Information` (Iceberg
//!    tables);
//! 3. a table-metadata trailer introduced by `# Detailed Table
//!    Information`, holding key/value pairs such as the owner.
//!
//! Column rows end at the partition sentinel when one exists, otherwise at
//! the trailer sentinel. Rows whose name is empty or starts with `#` are
//! comments, and duplicated names (partition columns are re-listed) keep
//! their first occurrence.

use crate::driver::Row;
use crate::metadata::types::{HiveColumn, HiveRelation};
use std::collections::HashMap;
use tracing::debug;

/// Trailer sentinel heading.
const KEY_TABLE_INFORMATION: &str = "# Detailed Table Information";

/// Partition block sentinel prefixes; the second form is emitted for
/// Iceberg tables.
const PARTITION_SECTION_KEYS: [&str; 2] =
    ["# Partition Information", "# Partition Transform Information"];

/// Trailer key carrying the table owner (stored after the `:` split).
const KEY_TABLE_OWNER: &str = "Owner";

/// One `DESCRIBE FORMATTED` row: a name/type/comment triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeRow {
    pub name: String,
    pub data_type: String,
    pub comment: Option<String>,
}

impl DescribeRow {
    /// Build from a raw driver row; missing cells read as empty.
    pub fn from_row(row: &Row) -> Self {
        let cell = |idx: usize| row.get(idx).map(|v| v.as_text()).unwrap_or_default();
        let comment = row.get(2).map(|v| v.as_text()).filter(|c| !c.is_empty());
        Self {
            name: cell(0),
            data_type: cell(1),
            comment,
        }
    }
}

/// Index of the table-metadata trailer sentinel, or `rows.len()` when the
/// output carries no trailer.
pub fn find_table_information_separator(rows: &[DescribeRow]) -> usize {
    rows.iter()
        .position(|row| row.name.trim() == KEY_TABLE_INFORMATION)
        .unwrap_or(rows.len())
}

/// Index of the partition block sentinel, if the relation is partitioned.
pub fn find_partition_information_separator(rows: &[DescribeRow]) -> Option<usize> {
    rows.iter().position(|row| {
        PARTITION_SECTION_KEYS
            .iter()
            .any(|key| row.name.starts_with(key))
    })
}

/// Column rows: non-comment rows before `end`, de-duplicated by name
/// keeping the first occurrence.
fn parse_columns_info(rows: &[DescribeRow], end: usize) -> Vec<&DescribeRow> {
    let mut seen: Vec<&str> = Vec::new();
    let mut columns = Vec::new();
    for row in &rows[..end.min(rows.len())] {
        if row.name.is_empty() || row.name.starts_with('#') {
            continue;
        }
        if seen.contains(&row.name.as_str()) {
            continue;
        }
        seen.push(&row.name);
        columns.push(row);
    }
    columns
}

/// Trailer key/value pairs. Keys drop any `:`-suffixed qualifier and both
/// sides are trimmed.
fn parse_table_metadata(rows: &[DescribeRow]) -> HashMap<String, String> {
    rows.iter()
        .filter(|row| {
            !row.name.is_empty() && !row.name.starts_with('#') && !row.data_type.is_empty()
        })
        .map(|row| {
            let key = row.name.split(':').next().unwrap_or("").trim().to_string();
            (key, row.data_type.trim().to_string())
        })
        .collect()
}

/// Turn a `DESCRIBE FORMATTED` row stream into column descriptors for the
/// given relation.
pub fn parse_describe_formatted(relation: &HiveRelation, rows: &[DescribeRow]) -> Vec<HiveColumn> {
    let table_separator_pos = find_table_information_separator(rows);
    let partition_separator_pos = find_partition_information_separator(rows);
    let column_end = partition_separator_pos.unwrap_or(table_separator_pos);
    debug!(
        "relation={relation}, partition_separator_pos={partition_separator_pos:?}, \
         table_separator_pos={table_separator_pos}, column_end={column_end}"
    );

    let trailer = rows
        .get(table_separator_pos + 1..)
        .unwrap_or_default();
    let metadata = parse_table_metadata(trailer);
    let owner = metadata.get(KEY_TABLE_OWNER).cloned();

    parse_columns_info(rows, column_end)
        .into_iter()
        .enumerate()
        .map(|(index, row)| HiveColumn {
            table_schema: relation.schema.clone(),
            table_name: relation.identifier.clone(),
            table_kind: Some(relation.kind),
            table_owner: owner.clone(),
            index,
            name: row.name.clone(),
            dtype: row.data_type.clone(),
        })
        .collect()
}
