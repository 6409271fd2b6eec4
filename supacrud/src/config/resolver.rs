//! Connection resolution state machine
//!
//! ```text
//! Unresolved --load--> Loaded --> Validating --probe ok--> Connected
//!                                    ^   |
//!                                    |   probe failed
//!                                    +---+ re-prompt (credential, endpoint or both)
//! ```
//!
//! The loop has no retry limit: it ends when a probe succeeds or a prompt fails.
//! Once connected, later calls return the same validated connection without
//! touching disk, network or terminal.

use super::connection::{Connection, ValidatedConnection};
use super::env_scan::EnvScanner;
use super::error::{ConfigError, ConfigResult};
use super::prompt::Prompter;
use super::source::{persist, CredentialSource};
use super::store::PersistedStore;
use super::validator::{FailureKind, Validator};
use tracing::{debug, info, warn};

/// Confirmation shown before replacing stored credentials
pub const ROTATE_CONFIRMATION: &str = "Are you sure you want to update your Supabase credentials?";

/// Where the resolver is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    /// Nothing loaded yet
    Unresolved,
    /// A candidate was obtained from a credential source
    Loaded(Connection),
    /// A candidate is being probed
    Validating(Connection),
    /// A candidate passed the probe
    Connected(ValidatedConnection),
}

/// Resolves and validates the connection used for generation
pub struct ConfigResolver<P, V> {
    store: PersistedStore,
    scanner: EnvScanner,
    prompter: P,
    validator: V,
    state: ResolverState,
}

impl<P: Prompter, V: Validator> ConfigResolver<P, V> {
    /// Compose a resolver from its collaborators
    pub const fn new(store: PersistedStore, scanner: EnvScanner, prompter: P, validator: V) -> Self {
        Self {
            store,
            scanner,
            prompter,
            validator,
            state: ResolverState::Unresolved,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &ResolverState {
        &self.state
    }

    /// The prompter, for callers that share it with other interactive steps
    #[must_use]
    pub const fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Return a validated connection, resolving and probing it if needed
    ///
    /// Sources are tried in [`CredentialSource::PRIORITY`] order. Failed probes
    /// re-prompt for the field the error points at and try again; every re-prompt
    /// is persisted before the next probe.
    ///
    /// If a prompt fails, the error is returned and the current candidate is kept,
    /// so a later call resumes probing where this one stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prompt`](super::ConfigError::Prompt) if interactive
    /// input fails.
    pub async fn resolve(&mut self) -> ConfigResult<ValidatedConnection> {
        let candidate = match &self.state {
            ResolverState::Connected(connection) => return Ok(connection.clone()),
            ResolverState::Loaded(candidate) | ResolverState::Validating(candidate) => {
                candidate.clone()
            }
            ResolverState::Unresolved => self.load().await?,
        };
        self.validate(candidate).await
    }

    /// Replace the stored credentials with freshly prompted ones
    ///
    /// With `confirm`, the user is asked first and `Ok(false)` is returned if they
    /// decline. The new values are persisted as a literal connection and probed
    /// like any other candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prompt`](super::ConfigError::Prompt) if interactive
    /// input fails.
    pub async fn rotate_credentials(&mut self, confirm: bool) -> ConfigResult<bool> {
        if confirm && !self.prompter.confirm(ROTATE_CONFIRMATION).await? {
            debug!("Credential rotation declined");
            return Ok(false);
        }

        let candidate = CredentialSource::Interactive
            .resolve(&self.store, &self.scanner, &self.prompter)
            .await?;
        if let Some(candidate) = candidate {
            info!("Credentials updated");
            self.state = ResolverState::Loaded(candidate.clone());
            self.validate(candidate).await?;
        }
        Ok(true)
    }

    async fn load(&mut self) -> ConfigResult<Connection> {
        for source in CredentialSource::PRIORITY {
            if let Some(candidate) = source
                .resolve(&self.store, &self.scanner, &self.prompter)
                .await?
            {
                info!(?source, kind = %candidate.source_kind(), "Loaded connection");
                self.state = ResolverState::Loaded(candidate.clone());
                return Ok(candidate);
            }
            debug!(?source, "No connection from source");
        }

        Err(ConfigError::Prompt(
            "no credential source produced a connection".to_string(),
        ))
    }

    async fn validate(&mut self, mut candidate: Connection) -> ConfigResult<ValidatedConnection> {
        loop {
            self.state = ResolverState::Validating(candidate.clone());
            debug!(endpoint = %candidate.endpoint(), "Validating connection");

            match self.validator.probe(&candidate).await {
                Ok(()) => {
                    info!(kind = %candidate.source_kind(), "Connection validated");
                    let validated = ValidatedConnection::new(candidate);
                    self.state = ResolverState::Connected(validated.clone());
                    return Ok(validated);
                }
                Err(e) => {
                    let kind = e.kind();
                    warn!(error = %e, ?kind, "Connection check failed");
                    candidate = self.reprompt(candidate, kind).await?;
                    persist(&self.store, &candidate).await;
                }
            }
        }
    }

    async fn reprompt(&self, candidate: Connection, kind: FailureKind) -> ConfigResult<Connection> {
        Ok(match kind {
            FailureKind::InvalidCredential => {
                candidate.with_credential(self.prompter.credential().await?.trim())
            }
            FailureKind::InvalidEndpoint => {
                candidate.with_endpoint(self.prompter.endpoint().await?.trim())
            }
            FailureKind::Other => Connection::literal(
                self.prompter.endpoint().await?.trim(),
                self.prompter.credential().await?.trim(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::prompt::MockPrompter;
    use super::super::token::encode_token;
    use super::super::validator::{MockValidator, ProbeError};
    use super::*;
    use crate::settings::ConnectionSettings;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn parts(dir: &TempDir) -> (PersistedStore, EnvScanner) {
        let store = PersistedStore::new(dir.path().join("store").join("config.json"));
        let scanner = EnvScanner::new(dir.path(), &ConnectionSettings::default());
        (store, scanner)
    }

    /// Validator that fails with the given messages, then succeeds, recording probes
    fn scripted_validator(
        failures: Vec<&'static str>,
    ) -> (MockValidator, Arc<Mutex<Vec<Connection>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let mut remaining = failures.into_iter();
        let mut validator = MockValidator::new();
        validator.expect_probe().returning(move |connection| {
            recorder.lock().unwrap().push(connection.clone());
            remaining.next().map_or(Ok(()), |message| Err(ProbeError::new(message)))
        });
        (validator, seen)
    }

    #[tokio::test]
    async fn test_persisted_connection_is_validated_once() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        let connection = Connection::literal("https://abc.supabase.co", "key");
        store.save(&connection).await.unwrap();

        let (validator, seen) = scripted_validator(vec![]);
        let mut resolver = ConfigResolver::new(store, scanner, MockPrompter::new(), validator);
        assert_eq!(resolver.state(), &ResolverState::Unresolved);

        let validated = resolver.resolve().await.unwrap();
        assert_eq!(validated.connection(), &connection);
        assert!(matches!(resolver.state(), ResolverState::Connected(_)));

        // Connected short-circuits: no second probe
        resolver.resolve().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_environment_files_are_used_before_prompting() {
        let dir = TempDir::new().unwrap();
        let token = encode_token(r#"{"alg":"HS256"}"#, r#"{"ref":"projref","role":"anon"}"#);
        std::fs::write(
            dir.path().join(".env"),
            format!("SUPABASE_URL=https://projref.supabase.co\nSUPABASE_ANON_KEY={token}\n"),
        )
        .unwrap();
        let (store, scanner) = parts(&dir);

        let (validator, _) = scripted_validator(vec![]);
        let mut resolver = ConfigResolver::new(store.clone(), scanner, MockPrompter::new(), validator);
        let validated = resolver.resolve().await.unwrap();

        assert!(matches!(validated.connection(), Connection::Environment { .. }));
        assert_eq!(store.load().await.unwrap().as_ref(), Some(validated.connection()));
    }

    #[tokio::test]
    async fn test_invalid_token_falls_back_to_prompt() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "SUPABASE_URL=https://projref.supabase.co\nSUPABASE_ANON_KEY=abc.def\n",
        )
        .unwrap();
        let (store, scanner) = parts(&dir);

        let mut prompter = MockPrompter::new();
        prompter
            .expect_endpoint()
            .times(1)
            .returning(|| Ok("https://projref.supabase.co".to_string()));
        prompter
            .expect_credential()
            .times(1)
            .returning(|| Ok("typed-key".to_string()));

        let (validator, _) = scripted_validator(vec![]);
        let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);
        let validated = resolver.resolve().await.unwrap();
        assert_eq!(
            validated.connection(),
            &Connection::literal("https://projref.supabase.co", "typed-key")
        );
    }

    #[tokio::test]
    async fn test_invalid_credential_reprompts_only_credential() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        store
            .save(&Connection::literal("https://abc.supabase.co", "stale"))
            .await
            .unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_endpoint().never();
        prompter
            .expect_credential()
            .times(1)
            .returning(|| Ok("fresh".to_string()));

        let (validator, seen) = scripted_validator(vec!["401 Unauthorized: Invalid API key"]);
        let mut resolver = ConfigResolver::new(store.clone(), scanner, prompter, validator);
        let validated = resolver.resolve().await.unwrap();

        let expected = Connection::literal("https://abc.supabase.co", "fresh");
        assert_eq!(validated.connection(), &expected);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(store.load().await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_reprompts_only_endpoint() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        store
            .save(&Connection::literal("abc.supabase.co", "key"))
            .await
            .unwrap();

        let mut prompter = MockPrompter::new();
        prompter.expect_credential().never();
        prompter
            .expect_endpoint()
            .times(1)
            .returning(|| Ok("https://abc.supabase.co".to_string()));

        let (validator, _) = scripted_validator(vec!["invalid endpoint URL 'abc.supabase.co'"]);
        let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);
        let validated = resolver.resolve().await.unwrap();
        assert_eq!(
            validated.connection(),
            &Connection::literal("https://abc.supabase.co", "key")
        );
    }

    #[tokio::test]
    async fn test_other_failures_reprompt_both_until_success() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        store
            .save(&Connection::literal("https://abc.supabase.co", "key"))
            .await
            .unwrap();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_endpoint()
            .times(2)
            .returning(|| Ok("https://abc.supabase.co".to_string()));
        prompter
            .expect_credential()
            .times(2)
            .returning(|| Ok("key".to_string()));

        let (validator, seen) = scripted_validator(vec!["probe timed out", "500 Internal Server Error"]);
        let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);
        resolver.resolve().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_prompt_failure_keeps_candidate() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        let connection = Connection::literal("https://abc.supabase.co", "stale");
        store.save(&connection).await.unwrap();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_credential()
            .times(1)
            .returning(|| Err(ConfigError::Prompt("interrupted".to_string())));

        let (validator, _) = scripted_validator(vec!["Invalid API key"]);
        let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);
        let error = resolver.resolve().await.unwrap_err();

        assert!(matches!(error, ConfigError::Prompt(_)));
        assert_eq!(resolver.state(), &ResolverState::Validating(connection));
    }

    #[tokio::test]
    async fn test_rotation_declined() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|message: &str| message == ROTATE_CONFIRMATION)
            .times(1)
            .returning(|_| Ok(false));
        prompter.expect_endpoint().never();

        let mut resolver = ConfigResolver::new(store, scanner, prompter, MockValidator::new());
        assert!(!resolver.rotate_credentials(true).await.unwrap());
        assert_eq!(resolver.state(), &ResolverState::Unresolved);
    }

    #[tokio::test]
    async fn test_rotation_replaces_connected_credentials() {
        let dir = TempDir::new().unwrap();
        let (store, scanner) = parts(&dir);
        store
            .save(&Connection::literal("https://old.supabase.co", "old"))
            .await
            .unwrap();

        let mut prompter = MockPrompter::new();
        prompter
            .expect_endpoint()
            .times(1)
            .returning(|| Ok("https://new.supabase.co".to_string()));
        prompter
            .expect_credential()
            .times(1)
            .returning(|| Ok("new".to_string()));

        let (validator, seen) = scripted_validator(vec![]);
        let mut resolver = ConfigResolver::new(store.clone(), scanner, prompter, validator);
        resolver.resolve().await.unwrap();
        assert!(resolver.rotate_credentials(false).await.unwrap());

        let expected = Connection::literal("https://new.supabase.co", "new");
        assert_eq!(
            resolver.state(),
            &ResolverState::Connected(ValidatedConnection::new(expected.clone()))
        );
        assert_eq!(store.load().await.unwrap(), Some(expected));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
