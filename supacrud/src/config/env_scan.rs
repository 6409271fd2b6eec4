//! Connection discovery from the project's environment files
//!
//! Every file in the project root whose name starts with the configured prefix
//! (`.env`, `.env.local`, ...) is read as `KEY=VALUE` lines. A connection is found
//! when one value looks like a project endpoint and another is a structurally
//! valid token that belongs to that endpoint.
//!
//! Belonging is a heuristic: the first host label of the endpoint (the project
//! ref, at most 20 characters) must appear somewhere in the decoded token. This
//! catches a key copied from a different project but is not a security check.

use super::connection::{Connection, ConnectionPair};
use super::error::{ConfigError, ConfigResult};
use super::token::DecodedToken;
use crate::settings::ConnectionSettings;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Longest endpoint fingerprint looked up in a token
const FINGERPRINT_LEN: usize = 20;

/// Role of the key that is safe to embed in client code
const PREFERRED_ROLE: &str = "anon";

/// Scans environment files for an endpoint and a matching token
#[derive(Debug, Clone)]
pub struct EnvScanner {
    project_root: PathBuf,
    prefix: String,
    marker: String,
}

impl EnvScanner {
    /// Scanner for the project at `project_root`
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>, settings: &ConnectionSettings) -> Self {
        Self {
            project_root: project_root.into(),
            prefix: settings.env_file_prefix.clone(),
            marker: settings.endpoint_marker.clone(),
        }
    }

    /// Environment files in the project root, sorted by name
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the project root cannot be listed.
    pub async fn env_files(&self) -> ConfigResult<Vec<PathBuf>> {
        let read_error = |source| ConfigError::Read {
            path: self.project_root.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.project_root)
            .await
            .map_err(read_error)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let matches_prefix = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&self.prefix));
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if matches_prefix && is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Look for an environment-derived connection
    ///
    /// Unreadable files and malformed lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the project root cannot be listed.
    pub async fn scan(&self) -> ConfigResult<Option<Connection>> {
        let mut entries = Vec::new();
        for path in self.env_files().await? {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable environment file");
                    continue;
                }
            };
            for item in dotenvy::from_read_iter(bytes.as_slice()) {
                match item {
                    Ok(entry) => entries.push(entry),
                    Err(e) => debug!(path = %path.display(), error = %e, "Skipping malformed line"),
                }
            }
        }

        let connection = find_connection(&entries, &self.marker);
        if let Some(Connection::Environment { names, .. }) = &connection {
            info!(
                endpoint = %names.endpoint,
                credential = %names.credential,
                "Found connection in environment files"
            );
        }
        Ok(connection)
    }
}

/// Pair an endpoint entry with a token entry that references it
fn find_connection(entries: &[(String, String)], marker: &str) -> Option<Connection> {
    let endpoints = entries
        .iter()
        .filter(|(_, value)| !marker.is_empty() && value.contains(marker));

    let mut tokens: Vec<_> = entries
        .iter()
        .filter_map(|(key, value)| Some((key, value, DecodedToken::decode(value)?)))
        .collect();
    tokens.sort_by_key(|(_, _, token)| token.role() != Some(PREFERRED_ROLE));

    for (endpoint_key, endpoint) in endpoints {
        let Some(fingerprint) = endpoint_fingerprint(endpoint) else {
            continue;
        };
        let linked = tokens
            .iter()
            .find(|(_, _, token)| token.mentions(fingerprint));
        if let Some((token_key, token_value, _)) = linked {
            return Some(Connection::Environment {
                names: ConnectionPair::new(endpoint_key.as_str(), token_key.as_str()),
                values: ConnectionPair::new(endpoint.trim(), token_value.trim()),
            });
        }
        debug!(key = %endpoint_key, "No token references this endpoint");
    }
    None
}

/// First host label of `endpoint`, capped at [`FINGERPRINT_LEN`] characters
fn endpoint_fingerprint(endpoint: &str) -> Option<&str> {
    let endpoint = endpoint.trim();
    let without_scheme = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    let label = without_scheme
        .split(['.', '/', ':'])
        .next()
        .filter(|label| !label.is_empty())?;
    let end = label
        .char_indices()
        .nth(FINGERPRINT_LEN)
        .map_or(label.len(), |(index, _)| index);
    Some(&label[..end])
}

#[cfg(test)]
mod tests {
    use super::super::token::encode_token;
    use super::*;
    use tempfile::TempDir;

    const REF: &str = "abcdefghijklmnopqrst";

    fn token(project_ref: &str, role: &str) -> String {
        encode_token(
            r#"{"alg":"HS256","typ":"JWT"}"#,
            &format!(r#"{{"iss":"supabase","ref":"{project_ref}","role":"{role}"}}"#),
        )
    }

    fn scanner(dir: &TempDir) -> EnvScanner {
        EnvScanner::new(dir.path(), &ConnectionSettings::default())
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            endpoint_fingerprint("https://abcdefghijklmnopqrstuvwxyz.supabase.co"),
            Some("abcdefghijklmnopqrst")
        );
        assert_eq!(endpoint_fingerprint("https://abc.supabase.co/"), Some("abc"));
        assert_eq!(endpoint_fingerprint("abc.supabase.co"), Some("abc"));
        assert_eq!(endpoint_fingerprint("https://"), None);
    }

    #[tokio::test]
    async fn test_finds_linked_pair() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env.local"),
            format!(
                "# local settings\nNEXT_PUBLIC_SUPABASE_URL=https://{REF}.supabase.co\nNEXT_PUBLIC_SUPABASE_ANON_KEY={}\n",
                token(REF, "anon")
            ),
        )
        .unwrap();

        let connection = scanner(&dir).scan().await.unwrap().unwrap();
        match connection {
            Connection::Environment { names, values } => {
                assert_eq!(names.endpoint, "NEXT_PUBLIC_SUPABASE_URL");
                assert_eq!(names.credential, "NEXT_PUBLIC_SUPABASE_ANON_KEY");
                assert_eq!(values.endpoint, format!("https://{REF}.supabase.co"));
                assert_eq!(values.credential, token(REF, "anon"));
            }
            Connection::Literal(_) => panic!("expected an environment connection"),
        }
    }

    #[tokio::test]
    async fn test_invalid_token_yields_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            format!("SUPABASE_URL=https://{REF}.supabase.co\nSUPABASE_KEY=not.a.token\n"),
        )
        .unwrap();
        assert_eq!(scanner(&dir).scan().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_for_other_project_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            format!(
                "SUPABASE_URL=https://{REF}.supabase.co\nSUPABASE_KEY={}\n",
                token("zzzzzzzzzzzzzzzzzzzz", "anon")
            ),
        )
        .unwrap();
        assert_eq!(scanner(&dir).scan().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefers_anon_key_across_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            format!(
                "SUPABASE_URL=https://{REF}.supabase.co\nSERVICE_KEY={}\n",
                token(REF, "service_role")
            ),
        )
        .unwrap();
        std::fs::write(
            dir.path().join(".env.production"),
            format!("ANON_KEY={}\n", token(REF, "anon")),
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "SUPABASE_URL=ignored").unwrap();

        let files = scanner(&dir).env_files().await.unwrap();
        assert_eq!(files.len(), 2);

        let connection = scanner(&dir).scan().await.unwrap().unwrap();
        let Connection::Environment { names, .. } = connection else {
            panic!("expected an environment connection");
        };
        assert_eq!(names.credential, "ANON_KEY");
    }

    #[tokio::test]
    async fn test_no_env_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(scanner(&dir).scan().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_root_is_read_error() {
        let dir = TempDir::new().unwrap();
        let scanner = EnvScanner::new(dir.path().join("missing"), &ConnectionSettings::default());
        assert!(matches!(scanner.scan().await, Err(ConfigError::Read { .. })));
    }
}
