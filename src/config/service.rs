//! Presentation-safe view over the configuration store
//!
//! [`ConfigService`] renders settings for the terminal with secrets masked
//! and turns update/clear calls into confirmation messages. It performs no
//! I/O of its own; persistence is delegated to [`ConfigStore`].

use super::schema::DatabaseUpdate;
use super::secret::{mask_api_key, mask_password, NOT_CONFIGURED};
use super::store::ConfigStore;
use crate::domain::Result;
use std::fmt;

/// Whether an API key is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    Configured,
    NotConfigured,
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeyStatus::Configured => write!(f, "Configured"),
            ApiKeyStatus::NotConfigured => write!(f, "{NOT_CONFIGURED}"),
        }
    }
}

/// Display strings for the database settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfigView {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub driver: String,
}

impl DatabaseConfigView {
    /// Field name / display value pairs in display order
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("server", self.server.as_str()),
            ("database", self.database.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("driver", self.driver.as_str()),
        ]
    }
}

/// Display strings for the FRED API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyView {
    pub api_key: String,
    pub status: ApiKeyStatus,
}

impl ApiKeyView {
    /// Field name / display value pairs in display order
    pub fn entries(&self) -> [(&'static str, String); 2] {
        [
            ("api_key", self.api_key.clone()),
            ("status", self.status.to_string()),
        ]
    }
}

/// Facade over [`ConfigStore`] for the `db` and `fred` commands
pub struct ConfigService<'a> {
    store: &'a mut ConfigStore,
}

impl<'a> ConfigService<'a> {
    /// Wraps a store handle
    pub fn new(store: &'a mut ConfigStore) -> Self {
        Self { store }
    }

    /// Read access to the wrapped store
    pub fn store(&self) -> &ConfigStore {
        &*self.store
    }

    /// Database settings with unset fields and the password masked
    pub fn show_database_config(&self) -> DatabaseConfigView {
        let db = self.store.database();
        let or_unset = |value: &Option<String>| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_CONFIGURED.to_string())
        };

        DatabaseConfigView {
            server: or_unset(&db.host),
            database: or_unset(&db.database_name),
            username: or_unset(&db.username),
            password: mask_password(db.password.as_ref()),
            driver: if db.driver_name.is_empty() {
                NOT_CONFIGURED.to_string()
            } else {
                db.driver_name.clone()
            },
        }
    }

    /// FRED API key, partially masked
    pub fn show_api_key_config(&self) -> ApiKeyView {
        let key = self.store.fred_api_key();
        ApiKeyView {
            api_key: mask_api_key(key),
            status: if key.is_some() {
                ApiKeyStatus::Configured
            } else {
                ApiKeyStatus::NotConfigured
            },
        }
    }

    pub fn update_database_config(&mut self, update: DatabaseUpdate) -> Result<String> {
        self.store.update_database(update)?;
        Ok("Database configuration updated".to_string())
    }

    pub fn clear_database_config(&mut self) -> Result<String> {
        self.store.clear_database()?;
        Ok("Database configuration cleared".to_string())
    }

    pub fn update_api_key(&mut self, key: impl Into<String>) -> Result<String> {
        self.store.update_fred_api_key(key)?;
        Ok("FRED API Key updated".to_string())
    }

    pub fn clear_api_key(&mut self) -> Result<String> {
        self.store.clear_fred_api_key()?;
        Ok("FRED API Key cleared".to_string())
    }
}
