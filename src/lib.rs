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

//! Hive warehouse adapter plugin.
//!
//! This crate lets a data-transformation orchestration host issue SQL
//! against an Apache Hive / Impala-compatible warehouse through a
//! DBAPI-style driver.
//!
//! ## Overview
//!
//! Two components carry the interesting logic:
//!
//! - [`ConnectionManager`] — opens a session under the profile's auth
//!   mode, executes statements with parameter fix-ups, normalizes driver
//!   errors into a small taxonomy, and reports usage telemetry.
//! - The introspector ([`metadata`]) — turns `SHOW`/`DESCRIBE FORMATTED`
//!   text output into typed relation and column descriptors, reconciling
//!   the table/view conflation of older warehouse versions.
//!
//! [`HiveAdapter`] composes both into the surface the host consumes. The
//! wire driver is pluggable through the [`driver::Driver`] trait.
//!
//! ## Example
//!
//! ```ignore
//! use hive_adapter::{Connection, HiveAdapter, HiveCredentials};
//!
//! let credentials = HiveCredentials::from_profile(serde_json::json!({
//!     "host": "warehouse.example.com",
//!     "schema": "analytics",
//!     "auth_type": "LDAP",
//!     "user": "etl",
//!     "password": "...",
//! }))?;
//!
//! let adapter = HiveAdapter::new(credentials, my_driver);
//! let mut connection = Connection::new("model.analytics.events");
//! adapter.open(&mut connection)?;
//! let relations = adapter.list_relations(&mut connection, "analytics")?;
//! adapter.close(&mut connection);
//! ```
//!
//! ## Profile fields
//!
//! | Field | Default | Description |
//! |-------|---------|-------------|
//! | `host` | `localhost` | Warehouse host |
//! | `port` | 10000 | HiveServer2 port |
//! | `schema` | — | Target schema (doubles as database) |
//! | `database` | unset | Must equal `schema` if supplied; cleared after validation |
//! | `auth_type` | unset | `LDAP`, `GSSAPI`/`KERBEROS`, or unset |
//! | `user` / `password` | unset | LDAP credentials |
//! | `kerberos_service_name` | unset | GSSAPI service name |
//! | `use_ssl` | true | TLS flag |
//! | `use_http_transport` | true | HTTP transport flag |
//! | `http_path` | unset | HTTP transport path |
//! | `ca_cert` | unset | CA certificate path for GSSAPI over TLS |
//! | `usage_tracking` | true | Usage telemetry opt-out |

pub mod adapter;
pub mod connection;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod telemetry;
pub mod version;

// Re-export main types
pub use adapter::{AdapterResponse, HiveAdapter};
pub use connection::{Connection, ConnectionManager, ConnectionState, ConnectionWrapper};
pub use credentials::{AuthMode, HiveCredentials, DEFAULT_HIVE_PORT};
pub use error::{AdapterError, Result};
pub use metadata::{HiveColumn, HiveRelation, RelationKind};
pub use version::{warehouse_version, HiveVersion};

// Re-export driver seam types for embedders and test doubles
pub use driver::{ConnectOptions, Driver, DriverError, Row, SqlValue};
