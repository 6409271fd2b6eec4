//! Persisted connection file
//!
//! The connection is kept per project in `config.json` under the user
//! configuration directory, in one of two shapes:
//!
//! ```json
//! { "endpoint": "https://abc.supabase.co", "credential": "eyJ..." }
//! ```
//!
//! ```json
//! {
//!   "sourceKind": "env",
//!   "prefix": { "endpoint": "SUPABASE_URL", "credential": "SUPABASE_ANON_KEY" },
//!   "suffix": { "endpoint": "https://abc.supabase.co", "credential": "eyJ..." }
//! }
//! ```
//!
//! `prefix` holds variable names and `suffix` their values. Older files that use
//! `projectUrl`/`apiKey` are read as literal connections.

use super::connection::{Connection, ConnectionPair};
use super::error::{ConfigError, ConfigResult};
use crate::settings::ConnectionSettings;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory under the user config dir that holds per-project folders
const APP_DIR: &str = "supacrud";

#[derive(Debug, Serialize, Deserialize)]
enum EnvironmentTag {
    #[serde(rename = "env")]
    Env,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredConnection {
    Environment {
        #[serde(rename = "sourceKind")]
        source_kind: EnvironmentTag,
        prefix: ConnectionPair,
        suffix: ConnectionPair,
    },
    Literal {
        #[serde(default, alias = "projectUrl")]
        endpoint: String,
        #[serde(default, alias = "apiKey")]
        credential: String,
    },
}

impl From<&Connection> for StoredConnection {
    fn from(connection: &Connection) -> Self {
        match connection {
            Connection::Literal(pair) => Self::Literal {
                endpoint: pair.endpoint.clone(),
                credential: pair.credential.clone(),
            },
            Connection::Environment { names, values } => Self::Environment {
                source_kind: EnvironmentTag::Env,
                prefix: names.clone(),
                suffix: values.clone(),
            },
        }
    }
}

impl From<StoredConnection> for Connection {
    fn from(stored: StoredConnection) -> Self {
        match stored {
            StoredConnection::Literal {
                endpoint,
                credential,
            } => Self::literal(endpoint, credential),
            StoredConnection::Environment { prefix, suffix, .. } => Self::Environment {
                names: prefix,
                values: suffix,
            },
        }
    }
}

/// Raw read/write access to the persisted connection
#[derive(Debug, Clone)]
pub struct PersistedStore {
    path: PathBuf,
}

impl PersistedStore {
    /// Name of the persisted file
    pub const FILE_NAME: &'static str = "config.json";

    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the project at `project_root`
    ///
    /// Uses `settings.store_dir` when set, otherwise
    /// `<user config dir>/supacrud/<project name>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no override is set and the platform
    /// has no configuration directory.
    pub async fn for_project(
        project_root: &Path,
        settings: &ConnectionSettings,
    ) -> ConfigResult<Self> {
        let dir = match &settings.store_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(APP_DIR)
                .join(project_name(project_root).await),
        };
        Ok(Self::new(dir.join(Self::FILE_NAME)))
    }

    /// Location of the persisted file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted connection
    ///
    /// A missing file is `None`. So is a file that is not valid JSON; that case is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read.
    pub async fn load(&self) -> ConfigResult<Option<Connection>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<StoredConnection>(&raw) {
            Ok(stored) => Ok(Some(stored.into())),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed configuration file");
                Ok(None)
            }
        }
    }

    /// Write `connection`, creating the parent directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self, connection: &Connection) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let json = serde_json::to_string_pretty(&StoredConnection::from(connection))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), kind = %connection.source_kind(), "Saved configuration");
        Ok(())
    }
}

/// Name used to keep projects apart in the user config dir
///
/// The `name` from `package.json` when present (`@scope/pkg` becomes
/// `scope-pkg`), otherwise the project directory name.
async fn project_name(project_root: &Path) -> String {
    if let Ok(raw) = tokio::fs::read_to_string(project_root.join("package.json")).await {
        let name = serde_json::from_str::<serde_json::Value>(&raw)
            .ok()
            .and_then(|json| json.get("name")?.as_str().map(str::to_string));
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            return sanitize(&name);
        }
    }

    let root = tokio::fs::canonicalize(project_root)
        .await
        .unwrap_or_else(|_| project_root.to_path_buf());
    root.file_name()
        .map(|n| sanitize(&n.to_string_lossy()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

fn sanitize(name: &str) -> String {
    name.trim()
        .trim_start_matches('@')
        .replace(['/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PersistedStore {
        PersistedStore::new(dir.path().join("nested").join(PersistedStore::FILE_NAME))
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_literal_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let connection = Connection::literal("https://abc.supabase.co", "key");

        store.save(&connection).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(connection));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["endpoint"], "https://abc.supabase.co");
        assert_eq!(raw["credential"], "key");
    }

    #[tokio::test]
    async fn test_environment_file_shape() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let connection = Connection::Environment {
            names: ConnectionPair::new("SUPABASE_URL", "SUPABASE_ANON_KEY"),
            values: ConnectionPair::new("https://abc.supabase.co", "token"),
        };

        store.save(&connection).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["sourceKind"], "env");
        assert_eq!(raw["prefix"]["endpoint"], "SUPABASE_URL");
        assert_eq!(raw["suffix"]["credential"], "token");
        assert_eq!(store.load().await.unwrap(), Some(connection));
    }

    #[tokio::test]
    async fn test_legacy_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PersistedStore::FILE_NAME);
        std::fs::write(&path, r#"{"projectUrl":"https://abc.supabase.co","apiKey":"old"}"#).unwrap();

        let loaded = PersistedStore::new(path).load().await.unwrap();
        assert_eq!(loaded, Some(Connection::literal("https://abc.supabase.co", "old")));
    }

    #[tokio::test]
    async fn test_malformed_json_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PersistedStore::FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(PersistedStore::new(path).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_object_is_incomplete_literal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PersistedStore::FILE_NAME);
        std::fs::write(&path, "{}").unwrap();
        let loaded = PersistedStore::new(path).load().await.unwrap().unwrap();
        assert!(!loaded.is_complete());
    }

    #[tokio::test]
    async fn test_store_dir_override() {
        let dir = TempDir::new().unwrap();
        let settings = ConnectionSettings {
            store_dir: Some(dir.path().join("store")),
            ..ConnectionSettings::default()
        };
        let store = PersistedStore::for_project(dir.path(), &settings).await.unwrap();
        assert_eq!(store.path(), dir.path().join("store").join("config.json"));
    }

    #[tokio::test]
    async fn test_project_name_from_package_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name":"@acme/web"}"#).unwrap();
        assert_eq!(project_name(dir.path()).await, "acme-web");
    }

    #[tokio::test]
    async fn test_project_name_from_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("my-app");
        std::fs::create_dir(&root).unwrap();
        assert_eq!(project_name(&root).await, "my-app");
    }
}
