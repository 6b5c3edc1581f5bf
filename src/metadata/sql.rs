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

//! SQL statement builders for metadata queries.
//!
//! Hive has no information_schema to query, so everything goes through
//! `SHOW`/`DESCRIBE` statements with backtick-escaped identifiers.

use crate::metadata::types::{quote_identifier, HiveRelation};

/// `show tables in <schema>`.
///
/// Older warehouse versions also list views here; the caller reconciles
/// against [`build_show_views`].
pub fn build_show_tables(schema: &str) -> String {
    format!("show tables in {}", quote_identifier(schema))
}

/// `show views in <schema>`.
pub fn build_show_views(schema: &str) -> String {
    format!("show views in {}", quote_identifier(schema))
}

/// `describe formatted <schema>.<identifier>`.
pub fn build_describe_formatted(relation: &HiveRelation) -> String {
    format!("describe formatted {}", relation.render_quoted())
}

/// `show databases`.
pub fn build_show_databases() -> String {
    "show databases".to_string()
}

/// `` show grant user `<user>` on server ``.
pub fn build_show_grant(user: &str) -> String {
    format!("show grant user {} on server", quote_identifier(user))
}
