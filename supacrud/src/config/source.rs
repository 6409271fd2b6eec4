//! Credential resolution strategies

use super::connection::Connection;
use super::env_scan::EnvScanner;
use super::error::ConfigResult;
use super::prompt::Prompter;
use super::store::PersistedStore;
use tracing::{debug, warn};

/// One way of obtaining a candidate connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The persisted `config.json`
    Persisted,
    /// The project's environment files
    Environment,
    /// Terminal prompts
    Interactive,
}

impl CredentialSource {
    /// Sources in the order they are tried
    pub const PRIORITY: [Self; 3] = [Self::Persisted, Self::Environment, Self::Interactive];

    /// Try to obtain a connection from this source
    ///
    /// Persisted connections are only accepted when both fields are set.
    /// Connections found in environment files or typed in are persisted before
    /// they are returned. `Interactive` never yields `None`.
    ///
    /// # Errors
    ///
    /// Only prompt failures are returned; unreadable files are logged and treated
    /// as "nothing found".
    pub async fn resolve<P>(
        self,
        store: &PersistedStore,
        scanner: &EnvScanner,
        prompter: &P,
    ) -> ConfigResult<Option<Connection>>
    where
        P: Prompter + ?Sized,
    {
        match self {
            Self::Persisted => match store.load().await {
                Ok(connection) => Ok(connection.filter(Connection::is_complete)),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable configuration file");
                    Ok(None)
                }
            },
            Self::Environment => match scanner.scan().await {
                Ok(Some(connection)) => {
                    persist(store, &connection).await;
                    Ok(Some(connection))
                }
                Ok(None) => Ok(None),
                Err(e) => {
                    warn!(error = %e, "Could not scan environment files");
                    Ok(None)
                }
            },
            Self::Interactive => {
                let endpoint = prompter.endpoint().await?;
                let credential = prompter.credential().await?;
                let connection = Connection::literal(endpoint.trim(), credential.trim());
                persist(store, &connection).await;
                Ok(Some(connection))
            }
        }
    }
}

/// Save `connection`, logging instead of failing
pub(crate) async fn persist(store: &PersistedStore, connection: &Connection) {
    match store.save(connection).await {
        Ok(()) => debug!(path = %store.path().display(), "Persisted connection"),
        Err(e) => warn!(error = %e, "Could not persist connection; continuing"),
    }
}
