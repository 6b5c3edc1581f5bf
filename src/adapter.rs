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

//! The adapter surface consumed by the host framework.
//!
//! [`HiveAdapter`] composes the credentials value type, the connection
//! state machine, and the stateless introspector into the fixed set of
//! operations the host calls: open/close/cancel a connection, execute a
//! statement, the inert transaction trio, and the two introspection calls.

use crate::connection::{Connection, ConnectionManager, ConnectionWrapper};
use crate::credentials::HiveCredentials;
use crate::driver::{Driver, Row, SqlValue};
use crate::error::Result;
use crate::metadata::{self, sql, HiveColumn, HiveRelation, Session};
use crate::telemetry::{TrackingEventType, UsageEvent};
use std::sync::Arc;
use tracing::debug;

/// Terminal status the host shows for a finished statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterResponse {
    pub message: String,
}

impl AdapterResponse {
    /// The warehouse reports no row counts through this path, so every
    /// completed statement answers `OK`.
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
        }
    }
}

/// Hive implementation of the host framework's adapter contract.
#[derive(Debug)]
pub struct HiveAdapter {
    connections: ConnectionManager,
}

impl HiveAdapter {
    pub fn new(credentials: HiveCredentials, driver: Arc<dyn Driver>) -> Self {
        Self {
            connections: ConnectionManager::new(credentials, driver),
        }
    }

    pub fn from_manager(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Quote an identifier the Hive way.
    pub fn quote(&self, identifier: &str) -> String {
        metadata::quote_identifier(identifier)
    }

    // --- connection lifecycle ---

    pub fn open(&self, connection: &mut Connection) -> Result<()> {
        self.connections.open(connection)
    }

    pub fn close(&self, connection: &mut Connection) {
        self.connections.close(connection)
    }

    pub fn cancel(&self, connection: &mut Connection) {
        self.connections.cancel(connection)
    }

    // --- transactions (inert on Hive) ---

    pub fn begin(&self) {
        self.connections.begin()
    }

    pub fn commit(&self) {
        self.connections.commit()
    }

    pub fn rollback(&self) {
        self.connections.rollback()
    }

    // --- statements ---

    /// Execute a statement; fetch the full result when `fetch` is set.
    pub fn execute(
        &self,
        connection: &mut Connection,
        sql: &str,
        auto_begin: bool,
        fetch: bool,
    ) -> Result<(AdapterResponse, Vec<Row>)> {
        let wrapper = self
            .connections
            .add_query(connection, sql, &[], auto_begin, false)?;
        let rows = if fetch { wrapper.fetchall()? } else { Vec::new() };
        Ok((AdapterResponse::ok(), rows))
    }

    /// Execute with positional bindings, returning the live wrapper for
    /// lazy fetching.
    pub fn add_query<'a>(
        &self,
        connection: &'a mut Connection,
        sql: &str,
        bindings: &[SqlValue],
        auto_begin: bool,
        abridge_sql_log: bool,
    ) -> Result<&'a mut ConnectionWrapper> {
        self.connections
            .add_query(connection, sql, bindings, auto_begin, abridge_sql_log)
    }

    // --- introspection ---

    /// Tables and views in a schema; empty (never an error) when the
    /// schema is missing.
    pub fn list_relations(
        &self,
        connection: &mut Connection,
        schema: &str,
    ) -> Result<Vec<HiveRelation>> {
        let mut session = Session::new(&self.connections, connection);
        metadata::list_relations(&mut session, schema)
    }

    /// Columns of a relation; empty when the relation is missing.
    pub fn get_columns_in_relation(
        &self,
        connection: &mut Connection,
        relation: &HiveRelation,
    ) -> Result<Vec<HiveColumn>> {
        let mut session = Session::new(&self.connections, connection);
        metadata::get_columns(&mut session, relation)
    }

    pub fn check_schema_exists(
        &self,
        connection: &mut Connection,
        schema: &str,
    ) -> Result<bool> {
        let mut session = Session::new(&self.connections, connection);
        metadata::check_schema_exists(&mut session, schema)
    }

    // --- diagnostics ---

    /// Connectivity probe used by the host's `debug` command: run a
    /// trivial select, then best-effort report the user's server grants
    /// through the usage tracker. The connection is closed either way.
    pub fn debug_query(&self, connection: &mut Connection) -> Result<()> {
        self.execute(connection, "select 1 as id", false, true)?;

        if let Some(user) = self.connections.credentials().user.clone() {
            match self.execute(connection, &sql::build_show_grant(&user), true, true) {
                Ok((_, rows)) => {
                    let permissions: Vec<Vec<String>> = rows
                        .iter()
                        .map(|row| row.iter().map(|cell| cell.as_text()).collect())
                        .collect();
                    self.connections.tracker().track(
                        UsageEvent::new(TrackingEventType::Debug)
                            .permissions(serde_json::json!(permissions)),
                    );
                }
                Err(e) => {
                    debug!("failed to fetch permissions for user {user}: {e}");
                }
            }
        }

        self.connections.close(connection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_response_ok() {
        assert_eq!(AdapterResponse::ok().message, "OK");
    }
}
