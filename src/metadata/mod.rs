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

//! Catalog introspection for the Hive adapter.
//!
//! Hive exposes no queryable information_schema, so structural metadata
//! comes from `SHOW`/`DESCRIBE` statements whose semi-structured text
//! output is parsed into typed descriptors.
//!
//! ## Module Structure
//!
//! - `types`: relation and column descriptors
//! - `sql`: statement builders with identifier escaping
//! - `parse`: `DESCRIBE FORMATTED` row-stream segmentation
//! - `service`: relation listing and column discovery over an executor

pub mod parse;
pub mod service;
pub mod sql;
pub mod types;

// Re-export commonly used items
pub use parse::{parse_describe_formatted, DescribeRow};
pub use service::{check_schema_exists, get_columns, list_relations, QueryExecutor, Session};
pub use types::{quote_identifier, HiveColumn, HiveRelation, RelationKind};
