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

//! Profile credentials and authentication mode selection.
//!
//! Hive classifies database and schema as the same thing: a profile may
//! supply `database` only if it equals `schema`, and the field is cleared
//! right after validation so the rest of the adapter never sees it.

use crate::error::{AdapterError, Result};
use serde::Deserialize;
use std::fmt;

/// Default HiveServer2 Thrift port.
pub const DEFAULT_HIVE_PORT: u16 = 10000;

/// Connection credentials as declared in a profile.
///
/// Immutable after [`HiveCredentials::from_profile`] returns; the
/// database/schema collapse happens during construction.
#[derive(Debug, Clone, Deserialize)]
pub struct HiveCredentials {
    #[serde(default = "default_host")]
    pub host: String,
    pub schema: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    #[serde(default = "default_true")]
    pub use_http_transport: bool,
    #[serde(default)]
    pub http_path: Option<String>,
    #[serde(default)]
    pub kerberos_service_name: Option<String>,
    #[serde(default)]
    pub ca_cert: Option<String>,
    #[serde(default = "default_true")]
    pub usage_tracking: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_HIVE_PORT
}

fn default_true() -> bool {
    true
}

impl HiveCredentials {
    /// Deserialize credentials from the host's parsed profile and enforce
    /// construction invariants.
    pub fn from_profile(profile: serde_json::Value) -> Result<Self> {
        let creds: HiveCredentials = serde_json::from_value(profile)
            .map_err(|e| AdapterError::Configuration(format!("invalid profile: {e}")))?;
        creds.into_validated()
    }

    /// Enforce the database/schema invariant and clear `database`.
    pub fn into_validated(mut self) -> Result<Self> {
        if let Some(ref database) = self.database {
            if database != &self.schema {
                return Err(AdapterError::Configuration(format!(
                    "schema: {}, database: {}; on Hive, database must be omitted or have the \
                     same value as schema",
                    self.schema, database
                )));
            }
        }
        self.database = None;
        Ok(self)
    }

    /// Select the authentication mode from `auth_type`.
    ///
    /// Unknown values are a configuration error, caught before any network
    /// I/O is attempted.
    pub fn auth_mode(&self) -> Result<AuthMode> {
        match self.auth_type.as_deref() {
            None | Some("") => Ok(AuthMode::Unauthenticated),
            Some(value) if value.eq_ignore_ascii_case("ldap") => Ok(AuthMode::Ldap),
            Some(value)
                if value.eq_ignore_ascii_case("gssapi")
                    || value.eq_ignore_ascii_case("kerberos") =>
            {
                Ok(AuthMode::Kerberos)
            }
            Some(other) => Err(AdapterError::Configuration(format!(
                "invalid auth_type '{other}' provided; expected one of LDAP, GSSAPI, KERBEROS"
            ))),
        }
    }

    /// Check that every named field is present, naming the missing field
    /// and the auth method on failure.
    pub fn validate_required(&self, method: AuthMode, required: &[&str]) -> Result<()> {
        for key in required {
            if !self.has_field(key)? {
                return Err(AdapterError::Configuration(format!(
                    "the option '{key}' is required when using the {method} method to connect \
                     to Hive"
                )));
            }
        }
        Ok(())
    }

    fn has_field(&self, key: &str) -> Result<bool> {
        let present = match key {
            "host" => !self.host.is_empty(),
            "schema" => !self.schema.is_empty(),
            "port" => true,
            "user" => matches!(self.user.as_deref(), Some(v) if !v.is_empty()),
            "password" => matches!(self.password.as_deref(), Some(v) if !v.is_empty()),
            "auth_type" => matches!(self.auth_type.as_deref(), Some(v) if !v.is_empty()),
            "http_path" => matches!(self.http_path.as_deref(), Some(v) if !v.is_empty()),
            "kerberos_service_name" => {
                matches!(self.kerberos_service_name.as_deref(), Some(v) if !v.is_empty())
            }
            "ca_cert" => matches!(self.ca_cert.as_deref(), Some(v) if !v.is_empty()),
            other => {
                return Err(AdapterError::Configuration(format!(
                    "unknown credential option '{other}'"
                )))
            }
        };
        Ok(present)
    }

    /// Fields shown when the host prints the active connection.
    pub fn connection_keys(&self) -> (&str, &str, Option<&str>) {
        (&self.host, &self.schema, self.user.as_deref())
    }
}

/// Credential scheme used to establish a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Plain connect with host and port only.
    Unauthenticated,
    /// LDAP user/password over the configured transport.
    Ldap,
    /// Kerberos/GSSAPI against the configured service name.
    Kerberos,
}

impl AuthMode {
    /// Credential fields a mode cannot work without.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            AuthMode::Unauthenticated => &["host", "schema"],
            AuthMode::Ldap => &["host", "schema", "user", "password"],
            AuthMode::Kerberos => &["host", "schema", "kerberos_service_name"],
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Unauthenticated => write!(f, "insecure"),
            AuthMode::Ldap => write!(f, "LDAP"),
            AuthMode::Kerberos => write!(f, "GSSAPI"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_profile() -> serde_json::Value {
        json!({
            "host": "hive.example.com",
            "schema": "analytics",
        })
    }

    #[test]
    fn test_defaults() {
        let creds = HiveCredentials::from_profile(base_profile()).unwrap();
        assert_eq!(creds.port, DEFAULT_HIVE_PORT);
        assert!(creds.use_ssl);
        assert!(creds.use_http_transport);
        assert!(creds.usage_tracking);
        assert!(creds.database.is_none());
    }

    #[test]
    fn test_database_must_match_schema() {
        let mut profile = base_profile();
        profile["database"] = json!("other_db");
        let err = HiveCredentials::from_profile(profile).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("database must be omitted"));
    }

    #[test]
    fn test_matching_database_is_cleared() {
        let mut profile = base_profile();
        profile["database"] = json!("analytics");
        let creds = HiveCredentials::from_profile(profile).unwrap();
        assert!(creds.database.is_none());
    }

    #[test]
    fn test_auth_mode_selection() {
        let mut profile = base_profile();
        let creds = HiveCredentials::from_profile(profile.clone()).unwrap();
        assert_eq!(creds.auth_mode().unwrap(), AuthMode::Unauthenticated);

        profile["auth_type"] = json!("ldap");
        let creds = HiveCredentials::from_profile(profile.clone()).unwrap();
        assert_eq!(creds.auth_mode().unwrap(), AuthMode::Ldap);

        profile["auth_type"] = json!("KERBEROS");
        let creds = HiveCredentials::from_profile(profile.clone()).unwrap();
        assert_eq!(creds.auth_mode().unwrap(), AuthMode::Kerberos);

        profile["auth_type"] = json!("GSSAPI");
        let creds = HiveCredentials::from_profile(profile).unwrap();
        assert_eq!(creds.auth_mode().unwrap(), AuthMode::Kerberos);
    }

    #[test]
    fn test_unknown_auth_type_is_configuration_error() {
        let mut profile = base_profile();
        profile["auth_type"] = json!("SSO");
        let creds = HiveCredentials::from_profile(profile).unwrap();
        let err = creds.auth_mode().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("invalid auth_type 'SSO'"));
    }

    #[test]
    fn test_required_fields_name_field_and_method() {
        let mut profile = base_profile();
        profile["auth_type"] = json!("LDAP");
        profile["user"] = json!("alice");
        let creds = HiveCredentials::from_profile(profile).unwrap();
        let err = creds
            .validate_required(AuthMode::Ldap, AuthMode::Ldap.required_fields())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'password'"));
        assert!(msg.contains("LDAP"));
    }

    #[test]
    fn test_unknown_required_field_rejected() {
        let creds = HiveCredentials::from_profile(base_profile()).unwrap();
        let err = creds
            .validate_required(AuthMode::Unauthenticated, &["token"])
            .unwrap_err();
        assert!(err.to_string().contains("unknown credential option"));
    }
}
