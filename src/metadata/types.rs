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

//! Relation and column descriptors produced by introspection.
//!
//! Descriptors are transient: built fresh on every call, cached (if at
//! all) by the host framework, never by this crate.

use serde::Serialize;
use std::fmt;

/// Hive identifiers are quoted with backticks.
pub const QUOTE_CHARACTER: char = '`';

/// Kind of a relation within a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Table,
    View,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Table => write!(f, "table"),
            RelationKind::View => write!(f, "view"),
        }
    }
}

/// A table or view within a schema.
///
/// There is no database component: Hive treats database and schema as the
/// same thing, and the credentials layer collapses them before any
/// relation is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiveRelation {
    pub schema: String,
    pub identifier: String,
    pub kind: RelationKind,
    /// Whether the relation uses the Iceberg table format. `None` when the
    /// listing path could not tell.
    pub is_iceberg: Option<bool>,
}

impl HiveRelation {
    pub fn new(
        schema: impl Into<String>,
        identifier: impl Into<String>,
        kind: RelationKind,
    ) -> Self {
        Self {
            schema: schema.into(),
            identifier: identifier.into(),
            kind,
            is_iceberg: None,
        }
    }

    pub fn with_iceberg(mut self, is_iceberg: bool) -> Self {
        self.is_iceberg = Some(is_iceberg);
        self
    }

    /// `schema.identifier` without quoting.
    pub fn render(&self) -> String {
        format!("{}.{}", self.schema, self.identifier)
    }

    /// `` `schema`.`identifier` `` with backtick quoting.
    pub fn render_quoted(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.identifier)
        )
    }
}

impl fmt::Display for HiveRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Wrap an identifier in backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!(
        "{q}{}{q}",
        name.replace(QUOTE_CHARACTER, "``"),
        q = QUOTE_CHARACTER
    )
}

/// One column of a relation, as scraped from `DESCRIBE FORMATTED` output.
///
/// The source text format does not reliably expose nullability or
/// defaults, so neither is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiveColumn {
    pub table_schema: String,
    pub table_name: String,
    pub table_kind: Option<RelationKind>,
    /// Best-effort owner scraped from the table-metadata trailer.
    pub table_owner: Option<String>,
    /// 0-based position within the filtered column sequence.
    pub index: usize,
    pub name: String,
    /// Declared type string, verbatim.
    pub dtype: String,
}

impl HiveColumn {
    pub fn quoted_name(&self) -> String {
        quote_identifier(&self.name)
    }
}
