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

//! DBAPI-shaped seam to the underlying warehouse driver.
//!
//! The adapter never talks to the wire itself; it drives a [`Driver`]
//! implementation that exposes the classic connect/cursor/execute/fetch
//! surface of a HiveServer2 client. Production deployments plug in a real
//! driver; tests plug in recording mocks.
//!
//! All calls are synchronous and blocking — the host framework runs one
//! worker thread per connection and expects `execute` to block until the
//! driver returns or fails.

use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;

/// Result alias for driver-level calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// One result row as returned by a cursor fetch.
pub type Row = Vec<SqlValue>;

/// Failure modes a driver implementation may report.
///
/// These mirror the exception types of HiveServer2 client libraries and are
/// remapped into the adapter taxonomy by `error.rs`.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Transport-level rejection (authentication, permissions, proxies).
    #[error("HTTP {code}: {message}")]
    Http { code: u16, message: String },

    /// Failure reported by the HiveServer2 session protocol.
    #[error("{0}")]
    Server(String),

    /// Generic database error for everything else the driver raises.
    #[error("{0}")]
    Database(String),
}

/// A value crossing the driver boundary, either as a statement parameter
/// or as a fetched cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl SqlValue {
    /// The cell as text; `Null` renders empty. DESCRIBE/SHOW output is all
    /// text, so metadata parsing goes through here.
    pub fn as_text(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Boolean(b) => write!(f, "{b}"),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Float(x) => write!(f, "{x}"),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.3f")),
            SqlValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Authentication mechanism names understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    Ldap,
    Gssapi,
}

/// Options handed to [`Driver::connect`].
///
/// Field names track the keyword arguments of a DBAPI `connect(**opts)`
/// call; which fields are populated depends on the selected auth mode.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub auth_mechanism: Option<AuthMechanism>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub use_ssl: bool,
    pub use_http_transport: bool,
    pub http_path: Option<String>,
    pub kerberos_service_name: Option<String>,
    pub ca_cert: Option<String>,
}

/// Per-statement options passed through to the driver.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Parameter substitution style. The adapter always requests `format`
    /// so timestamp literals are quoted correctly by the driver.
    pub paramstyle: Option<String>,
}

impl ExecuteOptions {
    pub fn format_paramstyle() -> Self {
        Self {
            paramstyle: Some("format".to_string()),
        }
    }
}

/// One column of a cursor's result description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_name: String,
}

/// Entry point of a warehouse driver: open a connection from options.
pub trait Driver: Send + Sync + fmt::Debug {
    fn connect(&self, options: &ConnectOptions) -> DriverResult<Box<dyn DriverConnection>>;
}

/// An open driver connection; produces cursors and can be closed.
pub trait DriverConnection: Send + fmt::Debug {
    fn cursor(&mut self) -> DriverResult<Box<dyn DriverCursor>>;
    fn close(&mut self) -> DriverResult<()>;
}

/// A driver cursor: execute statements and fetch their results.
pub trait DriverCursor: Send + fmt::Debug {
    fn execute(
        &mut self,
        sql: &str,
        bindings: &[SqlValue],
        options: &ExecuteOptions,
    ) -> DriverResult<()>;

    fn fetchall(&mut self) -> DriverResult<Vec<Row>>;

    fn fetchone(&mut self) -> DriverResult<Option<Row>>;

    fn cancel(&mut self) -> DriverResult<()>;

    fn close(&mut self) -> DriverResult<()>;

    /// Column metadata of the last executed statement.
    fn description(&self) -> DriverResult<Vec<ColumnDescription>>;
}
