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

//! Error taxonomy surfaced to the host framework.
//!
//! Four kinds cover every failure this adapter reports:
//!
//! - [`AdapterError::Configuration`] — bad or missing profile data, raised
//!   before any network I/O is attempted.
//! - [`AdapterError::Authorization`] — credential/permission rejection
//!   reported by the driver over HTTP.
//! - [`AdapterError::Server`] — warehouse-side failure reported by the
//!   session protocol.
//! - [`AdapterError::Runtime`] — anything else from the driver, original
//!   message preserved verbatim.
//!
//! "Not found" is deliberately not an error kind: missing schemas and
//! relations are recovered locally as empty results by the introspector.
//! Messages are kept single-line so the host can surface them verbatim.

use crate::driver::DriverError;
use thiserror::Error;

/// Result alias used throughout the adapter.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Failure categories the host framework can branch on.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Invalid profile configuration. Never involves network I/O.
    #[error("profile configuration error: {0}")]
    Configuration(String),

    /// Credential or permission rejection from the HTTP transport.
    #[error("authorization failure: {0}; check the credentials in your profile")]
    Authorization(String),

    /// Warehouse-side failure reported by the session protocol.
    #[error("warehouse server error: {0}; check the Hive server logs")]
    Server(String),

    /// Any other driver failure, message preserved verbatim.
    #[error("{0}")]
    Runtime(String),
}

impl AdapterError {
    /// The error message without the kind-specific framing.
    pub fn message(&self) -> &str {
        match self {
            AdapterError::Configuration(msg)
            | AdapterError::Authorization(msg)
            | AdapterError::Server(msg)
            | AdapterError::Runtime(msg) => msg,
        }
    }

    /// True for errors raised before any connection attempt.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AdapterError::Configuration(_))
    }
}

impl From<DriverError> for AdapterError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Http { code, message } => {
                AdapterError::Authorization(format!("HTTP {code}: {message}"))
            }
            DriverError::Server(message) => AdapterError::Server(message),
            DriverError::Database(message) => AdapterError::Runtime(message),
        }
    }
}
