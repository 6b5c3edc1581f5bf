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

//! Connection lifecycle and statement execution.
//!
//! A [`Connection`] is a small state machine (`Init → Open → Fail|Closed`)
//! owned by one worker thread for its lifetime. The [`ConnectionManager`]
//! opens it under the profile's auth mode, executes statements through the
//! wrapped driver cursor, and reports every outcome through the usage
//! tracker. Hive has no transactions, so begin/commit/rollback exist only
//! to satisfy the host framework's contract and are inert.

use crate::credentials::{AuthMode, HiveCredentials};
use crate::driver::{
    ColumnDescription, ConnectOptions, Driver, DriverConnection, DriverCursor, DriverError,
    DriverResult, ExecuteOptions, Row, SqlValue,
};
use crate::error::{AdapterError, Result};
use crate::telemetry::{tracker_for, TrackingEventType, UsageEvent, UsageTracker};
use crate::version::{self, HiveVersion};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Number of characters kept when the caller asks for an abridged SQL log.
const ABRIDGED_SQL_CHARS: usize = 512;

/// Lifecycle states of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Init,
    Open,
    Fail,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Init => write!(f, "init"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Fail => write!(f, "fail"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// One warehouse session, owned by a single worker thread.
#[derive(Debug)]
pub struct Connection {
    name: String,
    state: ConnectionState,
    transaction_open: bool,
    handle: Option<ConnectionWrapper>,
}

impl Connection {
    /// A fresh connection in `Init` state, named after the host's unit of
    /// work (e.g. the model being built).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ConnectionState::Init,
            transaction_open: false,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The wrapped driver handle, present only while `Open`.
    pub fn handle(&mut self) -> Option<&mut ConnectionWrapper> {
        self.handle.as_mut()
    }
}

/// Wraps a driver connection so that transactions no-op and cursor
/// teardown never propagates.
///
/// Hive cannot roll back, and HiveServer2 client libraries are known to
/// return bad responses when a cancelled cursor is torn down, so `cancel`
/// and `close` swallow driver errors. The cursor may still be unset when a
/// cancelling thread races the opener; both guards check for that.
pub struct ConnectionWrapper {
    handle: Box<dyn DriverConnection>,
    cursor: Option<Box<dyn DriverCursor>>,
}

impl fmt::Debug for ConnectionWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionWrapper")
            .field("cursor", &self.cursor.is_some())
            .finish()
    }
}

impl ConnectionWrapper {
    pub(crate) fn new(handle: Box<dyn DriverConnection>) -> Self {
        Self {
            handle,
            cursor: None,
        }
    }

    /// Open the session cursor; the warm-up cost is paid once at open.
    pub(crate) fn open_cursor(&mut self) -> DriverResult<()> {
        self.cursor = Some(self.handle.cursor()?);
        Ok(())
    }

    /// Execute a statement: strips one trailing terminator, fixes up the
    /// bindings, and requests `format` paramstyle substitution.
    pub fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> DriverResult<()> {
        let sql = strip_statement_terminator(sql);
        let bindings: Vec<SqlValue> = bindings.iter().map(fix_binding).collect();

        if self.cursor.is_none() {
            self.open_cursor()?;
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(DriverError::Database("cursor is not initialized".to_string()));
        };
        cursor.execute(sql, &bindings, &ExecuteOptions::format_paramstyle())
    }

    pub fn fetchall(&mut self) -> DriverResult<Vec<Row>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.fetchall(),
            None => Ok(Vec::new()),
        }
    }

    pub fn fetchone(&mut self) -> DriverResult<Option<Row>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.fetchone(),
            None => Ok(None),
        }
    }

    pub fn description(&self) -> DriverResult<Vec<ColumnDescription>> {
        match self.cursor.as_ref() {
            Some(cursor) => cursor.description(),
            None => Ok(Vec::new()),
        }
    }

    /// Best-effort cancellation of the in-flight statement. Races with
    /// normal completion are expected and not fatal.
    pub fn cancel(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Err(e) = cursor.cancel() {
                debug!("exception while cancelling query: {e}");
            }
        }
    }

    /// Tear down cursor and driver connection, swallowing driver errors.
    pub fn close(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            if let Err(e) = cursor.close() {
                debug!("exception while closing cursor: {e}");
            }
        }
        self.cursor = None;
        if let Err(e) = self.handle.close() {
            debug!("exception while closing connection: {e}");
        }
    }

    pub fn rollback(&mut self) {
        debug!("NotImplemented: rollback");
    }
}

/// Drop one trailing `;` so the driver never sees a compound terminator.
fn strip_statement_terminator(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed.strip_suffix(';').unwrap_or(trimmed)
}

/// Convert a binding into a primitive the driver can substitute.
///
/// The driver cannot natively bind complex or null-valued parameters, so
/// binding is literal substitution:
/// - `Null` becomes the literal token `NULL`;
/// - integers become floats;
/// - timestamps become `YYYY-MM-DD HH:MM:SS.mmm`, truncated to
///   millisecond precision;
/// - everything else passes through unchanged.
pub(crate) fn fix_binding(value: &SqlValue) -> SqlValue {
    match value {
        SqlValue::Null => SqlValue::Text("NULL".to_string()),
        SqlValue::Integer(n) => SqlValue::Float(*n as f64),
        SqlValue::Timestamp(ts) => {
            SqlValue::Text(ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        }
        other => other.clone(),
    }
}

/// Opens, executes on, and tears down connections for the host framework.
///
/// One manager serves the whole run; each worker thread brings its own
/// [`Connection`].
#[derive(Debug)]
pub struct ConnectionManager {
    driver: Arc<dyn Driver>,
    credentials: HiveCredentials,
    tracker: Arc<dyn UsageTracker>,
}

impl ConnectionManager {
    pub fn new(credentials: HiveCredentials, driver: Arc<dyn Driver>) -> Self {
        let tracker = tracker_for(credentials.usage_tracking);
        Self {
            driver,
            credentials,
            tracker,
        }
    }

    /// Same as [`ConnectionManager::new`] with an explicit tracker.
    pub fn with_tracker(
        credentials: HiveCredentials,
        driver: Arc<dyn Driver>,
        tracker: Arc<dyn UsageTracker>,
    ) -> Self {
        Self {
            driver,
            credentials,
            tracker,
        }
    }

    pub fn credentials(&self) -> &HiveCredentials {
        &self.credentials
    }

    /// Open the connection under the profile's auth mode.
    ///
    /// Idempotent: an already-open connection is returned untouched. Auth
    /// mode selection and required-field validation happen before any
    /// connect attempt, so configuration errors never reach the network.
    pub fn open(&self, connection: &mut Connection) -> Result<()> {
        if connection.state == ConnectionState::Open {
            debug!("connection is already open, skipping open");
            return Ok(());
        }

        let mode = self.credentials.auth_mode()?;
        self.credentials
            .validate_required(mode, mode.required_fields())?;
        let options = self.connect_options(mode);

        let started = Instant::now();
        match self.driver.connect(&options) {
            Ok(handle) => {
                let mut wrapper = ConnectionWrapper::new(handle);
                if let Err(e) = wrapper.open_cursor() {
                    connection.state = ConnectionState::Fail;
                    self.track_open(mode, connection, started);
                    return Err(e.into());
                }

                // Version is memoized process-wide; detection failure only
                // means the version stays unknown.
                let detected =
                    version::resolve_with(|| detect_warehouse_version(&mut wrapper));
                if let Some(v) = detected {
                    debug!("warehouse version: {v}");
                }

                connection.handle = Some(wrapper);
                connection.state = ConnectionState::Open;
                self.track_open(mode, connection, started);
                Ok(())
            }
            Err(e) => {
                connection.state = ConnectionState::Fail;
                self.track_open(mode, connection, started);
                Err(e.into())
            }
        }
    }

    fn connect_options(&self, mode: AuthMode) -> ConnectOptions {
        let creds = &self.credentials;
        let base = ConnectOptions {
            host: creds.host.clone(),
            port: creds.port,
            ..ConnectOptions::default()
        };
        match mode {
            AuthMode::Unauthenticated => base,
            AuthMode::Ldap => ConnectOptions {
                auth_mechanism: Some(crate::driver::AuthMechanism::Ldap),
                user: creds.user.clone(),
                password: creds.password.clone(),
                use_ssl: creds.use_ssl,
                use_http_transport: creds.use_http_transport,
                http_path: creds.http_path.clone(),
                ..base
            },
            AuthMode::Kerberos => ConnectOptions {
                auth_mechanism: Some(crate::driver::AuthMechanism::Gssapi),
                kerberos_service_name: creds.kerberos_service_name.clone(),
                use_ssl: creds.use_ssl,
                use_http_transport: creds.use_http_transport,
                ca_cert: creds.ca_cert.clone(),
                ..base
            },
        }
    }

    fn track_open(&self, mode: AuthMode, connection: &Connection, started: Instant) {
        self.tracker.track(
            UsageEvent::new(TrackingEventType::Open)
                .auth(mode.to_string())
                .connection_state(connection.state.to_string())
                .profile(connection.name.clone())
                .elapsed(started.elapsed()),
        );
    }

    /// Execute a statement on an open connection and hand back the wrapper
    /// so the caller can fetch lazily.
    ///
    /// Exactly one `start_query` and one `end_query` usage record are
    /// emitted, in that order, also when execution fails; the failing
    /// record carries the error text and the error then propagates
    /// unchanged.
    pub fn add_query<'a>(
        &self,
        connection: &'a mut Connection,
        sql: &str,
        bindings: &[SqlValue],
        auto_begin: bool,
        abridge_sql_log: bool,
    ) -> Result<&'a mut ConnectionWrapper> {
        if connection.state != ConnectionState::Open {
            return Err(AdapterError::Runtime(format!(
                "connection '{}' is not open (state: {})",
                connection.name, connection.state
            )));
        }
        if auto_begin && !connection.transaction_open {
            self.begin();
        }

        let name = connection.name.clone();
        let log_sql = if abridge_sql_log {
            let head: String = sql.chars().take(ABRIDGED_SQL_CHARS).collect();
            format!("{head}...")
        } else {
            sql.to_string()
        };

        self.tracker.track(
            UsageEvent::new(TrackingEventType::StartQuery)
                .sql(log_sql.clone())
                .profile(name.clone()),
        );
        debug!("On {name}: {log_sql}");

        let wrapper = match connection.handle.as_mut() {
            Some(wrapper) => wrapper,
            None => {
                return Err(AdapterError::Runtime(format!(
                    "connection '{name}' has no driver handle"
                )))
            }
        };

        let started = Instant::now();
        match wrapper.execute(sql, bindings) {
            Ok(()) => {
                let elapsed = started.elapsed();
                self.tracker.track(
                    UsageEvent::new(TrackingEventType::EndQuery)
                        .status("OK")
                        .elapsed(elapsed),
                );
                debug!("SQL status: OK in {:.2}s", elapsed.as_secs_f64());
                Ok(wrapper)
            }
            Err(e) => {
                self.tracker.track(
                    UsageEvent::new(TrackingEventType::EndQuery)
                        .status(e.to_string())
                        .elapsed(started.elapsed()),
                );
                debug!("error while running: {log_sql}");
                Err(e.into())
            }
        }
    }

    /// Close the connection. Idempotent: `Closed` and `Init` are no-ops.
    /// Driver errors during teardown are swallowed so shutdown never
    /// blocks on a broken session.
    pub fn close(&self, connection: &mut Connection) {
        if matches!(
            connection.state,
            ConnectionState::Closed | ConnectionState::Init
        ) {
            debug!(
                "connection '{}' is {}, skipping close",
                connection.name, connection.state
            );
            return;
        }

        let started = Instant::now();
        if let Some(mut wrapper) = connection.handle.take() {
            wrapper.close();
        }
        connection.state = ConnectionState::Closed;
        self.tracker.track(
            UsageEvent::new(TrackingEventType::Close)
                .connection_state(connection.state.to_string())
                .profile(connection.name.clone())
                .elapsed(started.elapsed()),
        );
    }

    /// Best-effort cancellation of the statement in flight on this
    /// connection's cursor.
    pub fn cancel(&self, connection: &mut Connection) {
        if let Some(wrapper) = connection.handle.as_mut() {
            wrapper.cancel();
        }
    }

    // Hive has no transactions; the contract methods are inert.

    pub fn begin(&self) {
        debug!("NotImplemented: begin");
    }

    pub fn commit(&self) {
        debug!("NotImplemented: commit");
    }

    pub fn rollback(&self) {
        debug!("NotImplemented: rollback");
    }

    pub(crate) fn tracker(&self) -> &Arc<dyn UsageTracker> {
        &self.tracker
    }
}

/// Run `select version()` on the fresh session and parse the first cell.
fn detect_warehouse_version(wrapper: &mut ConnectionWrapper) -> Option<HiveVersion> {
    let result = wrapper
        .execute("select version()", &[])
        .and_then(|()| wrapper.fetchone());
    match result {
        Ok(Some(row)) => row.first().and_then(|cell| HiveVersion::parse(&cell.as_text())),
        Ok(None) => None,
        Err(e) => {
            debug!("could not detect warehouse version: {e}");
            None
        }
    }
}
