//! JSON-backed configuration store
//!
//! [`ConfigStore`] owns `config.json` and its in-memory mirror. It is built
//! once at process start and handed to the services that need it.
//!
//! Loading never fails: a missing or unreadable document is treated as an
//! empty configuration. Every mutation rewrites the whole file before
//! returning, and write failures are reported to the caller.
//!
//! The file is not locked. Two processes writing concurrently will race and
//! the last writer wins.

use super::schema::{non_empty, ConnectionDescriptor, DatabaseUpdate, PersistedConfig, DEFAULT_DRIVER};
use super::secret::{secret_string, SecretString};
use crate::domain::{FundError, Result};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Durable store for database and API-key settings
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    database: ConnectionDescriptor,
    fred_api_key: Option<SecretString>,
}

impl ConfigStore {
    /// Loads the store from `config.json` in the current working directory
    pub fn load_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    /// Loads the store from `path`
    ///
    /// A missing file or a document that fails to parse yields an empty
    /// configuration with the default driver.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let document = match read_document(&path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No configuration file, starting empty");
                PersistedConfig::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable configuration file; every setting in it is \
                     dropped and the next change overwrites it"
                );
                PersistedConfig::default()
            }
        };

        Self::from_document(path, document)
    }

    fn from_document(path: PathBuf, document: PersistedConfig) -> Self {
        let database = ConnectionDescriptor {
            host: document.db_server,
            database_name: document.db_name,
            username: document.db_user,
            password: document.db_password,
            driver_name: document
                .db_driver
                .unwrap_or_else(|| DEFAULT_DRIVER.to_string()),
        };

        Self {
            path,
            database,
            fred_api_key: document
                .fred_api_key
                .filter(|k| !k.expose_secret().as_str().trim().is_empty()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current database settings
    pub fn database(&self) -> &ConnectionDescriptor {
        &self.database
    }

    /// A copy of the database settings for opening sessions
    pub fn connection_descriptor(&self) -> ConnectionDescriptor {
        self.database.clone()
    }

    /// Current FRED API key
    pub fn fred_api_key(&self) -> Option<&SecretString> {
        self.fred_api_key.as_ref()
    }

    /// Builds the on-disk document from the in-memory values
    pub fn to_document(&self) -> PersistedConfig {
        PersistedConfig {
            db_server: self.database.host.clone(),
            db_name: self.database.database_name.clone(),
            db_user: self.database.username.clone(),
            db_password: self.database.password.clone(),
            db_driver: Some(self.database.driver_name.clone()),
            fred_api_key: self.fred_api_key.clone(),
        }
    }

    /// Writes the full document to disk, replacing any previous content
    ///
    /// # Errors
    ///
    /// Returns [`FundError::ConfigIo`] if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(&self.to_document())?;
        contents.push('\n');

        fs::write(&self.path, contents).map_err(|e| {
            FundError::ConfigIo(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    /// Applies the non-empty fields of `update` and saves
    pub fn update_database(&mut self, update: DatabaseUpdate) -> Result<()> {
        if let Some(host) = non_empty(update.host.as_deref()) {
            self.database.host = Some(host.to_string());
        }
        if let Some(name) = non_empty(update.database_name.as_deref()) {
            self.database.database_name = Some(name.to_string());
        }
        if let Some(user) = non_empty(update.username.as_deref()) {
            self.database.username = Some(user.to_string());
        }
        if let Some(password) = update.password.filter(|p| !p.is_empty()) {
            self.database.password = Some(secret_string(password));
        }
        if let Some(driver) = non_empty(update.driver_name.as_deref()) {
            self.database.driver_name = driver.to_string();
        }

        self.save()
    }

    /// Resets every connection field; the driver goes back to its default
    pub fn clear_database(&mut self) -> Result<()> {
        self.database = ConnectionDescriptor::default();
        self.save()
    }

    /// Stores a new FRED API key and saves
    ///
    /// An empty or whitespace-only key counts as no key.
    pub fn update_fred_api_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        self.fred_api_key = (!key.trim().is_empty()).then(|| secret_string(key));
        self.save()
    }

    /// Removes the FRED API key and saves
    pub fn clear_fred_api_key(&mut self) -> Result<()> {
        self.fred_api_key = None;
        self.save()
    }
}

/// Reads and parses the document, `Ok(None)` when the file does not exist
///
/// A single field of the wrong type fails the whole document.
fn read_document(path: &Path) -> Result<Option<PersistedConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| FundError::ConfigParse(e.to_string()))?;
    let document =
        serde_json::from_str(&contents).map_err(|e| FundError::ConfigParse(e.to_string()))?;
    Ok(Some(document))
}
