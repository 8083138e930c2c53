//! Configuration schema types
//!
//! This module defines the on-disk configuration document and the typed
//! settings derived from it.

use crate::config::SecretString;
use crate::domain::{FundError, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Driver name used when none has been configured
pub const DEFAULT_DRIVER: &str = "ODBC Driver 17 for SQL Server";

/// Persisted configuration document
///
/// Maps 1:1 to `config.json`. Absent values are omitted from the file
/// rather than written as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Database host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_server: Option<String>,

    /// Target database name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,

    /// Login name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_user: Option<String>,

    /// Login password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_password: Option<SecretString>,

    /// Driver name, also selects the SQL backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_driver: Option<String>,

    /// FRED API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fred_api_key: Option<SecretString>,
}

/// Parameters needed to open a database session
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    /// Server host, optionally with a port (`host,1433` or `host:1433`)
    pub host: Option<String>,

    /// Target database name
    pub database_name: Option<String>,

    /// Login name
    pub username: Option<String>,

    /// Login password
    pub password: Option<SecretString>,

    /// Driver name (never empty)
    pub driver_name: String,
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            host: None,
            database_name: None,
            username: None,
            password: None,
            driver_name: DEFAULT_DRIVER.to_string(),
        }
    }
}

impl ConnectionDescriptor {
    /// Returns the configured host or a validation error
    pub fn require_host(&self) -> Result<&str> {
        non_empty(self.host.as_deref())
            .ok_or_else(|| FundError::Validation("database host is not configured".to_string()))
    }

    /// Returns the configured database name or a validation error
    pub fn require_database_name(&self) -> Result<&str> {
        non_empty(self.database_name.as_deref())
            .ok_or_else(|| FundError::Validation("database name is not configured".to_string()))
    }

    /// Returns the configured username or a validation error
    pub fn require_username(&self) -> Result<&str> {
        non_empty(self.username.as_deref()).ok_or_else(|| {
            FundError::Validation("database username is not configured".to_string())
        })
    }

    /// Password in clear text, empty when unset
    pub fn password_str(&self) -> &str {
        self.password
            .as_ref()
            .map(|p| p.expose_secret().as_str())
            .unwrap_or("")
    }

    /// Checks the fields every session needs (host and username)
    pub fn validate_for_connect(&self) -> Result<()> {
        self.require_host()?;
        self.require_username()?;
        Ok(())
    }

    /// Splits `host` into name and optional port.
    ///
    /// Accepts `host`, `host,port` (SQL Server style) and `host:port`.
    pub fn host_and_port(&self) -> Result<(String, Option<u16>)> {
        let host = self.require_host()?;
        let split = host
            .rsplit_once(',')
            .or_else(|| host.rsplit_once(':').filter(|(h, _)| !h.contains(':')));

        match split {
            Some((name, port)) => {
                let port = port.trim().parse::<u16>().map_err(|_| {
                    FundError::Validation(format!("invalid port in database host '{host}'"))
                })?;
                Ok((name.trim().to_string(), Some(port)))
            }
            None => Ok((host.trim().to_string(), None)),
        }
    }
}

/// Partial update to the database settings
///
/// `None` and empty strings leave the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DatabaseUpdate {
    pub host: Option<String>,
    pub database_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub driver_name: Option<String>,
}

impl DatabaseUpdate {
    /// True when no field would change anything
    pub fn is_empty(&self) -> bool {
        [
            &self.host,
            &self.database_name,
            &self.username,
            &self.password,
            &self.driver_name,
        ]
        .iter()
        .all(|field| non_empty(field.as_deref()).is_none())
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    pub local_enabled: bool,

    /// Directory for log files
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Console-only logging, file logging enabled when `FUND_LOG_DIR` is set
    pub fn from_env() -> Self {
        match std::env::var("FUND_LOG_DIR") {
            Ok(dir) if !dir.trim().is_empty() => Self {
                local_enabled: true,
                local_path: dir,
                local_rotation: std::env::var("FUND_LOG_ROTATION")
                    .unwrap_or_else(|_| default_local_rotation()),
            },
            _ => Self::default(),
        }
    }

    /// Validates the logging configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("local_path must be set when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: String::new(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

/// Treats empty and whitespace-only strings as unset
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
