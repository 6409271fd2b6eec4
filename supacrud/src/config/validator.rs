//! Connection probe
//!
//! A connection is valid when the project answers a minimal read of the probe
//! table (`_test` by default) with the candidate credential. The table usually
//! does not exist; PostgREST then answers with a "relation does not exist" error,
//! which still proves the endpoint and the key were accepted.

use super::connection::Connection;
use super::error::ConfigResult;
use crate::settings::ConnectionSettings;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::RegexSet;
use std::error::Error as _;
use thiserror::Error;
use tracing::{debug, warn};

const CREDENTIAL_PATTERN: &str = r"(?i)invalid (api )?key|invalid jwt|jwt (expired|malformed)|no api key|invalid credential|unauthorized|\b40[13]\b";

const ENDPOINT_PATTERN: &str = r"(?i)invalid (endpoint|url)|relative url|failed to lookup|dns error|name or service not known|could not connect|connection refused|\b404\b";

/// Credential pattern at index 0, endpoint pattern at index 1
static CLASSIFIERS: Lazy<Option<RegexSet>> = Lazy::new(|| {
    RegexSet::new([CREDENTIAL_PATTERN, ENDPOINT_PATTERN])
        .map_err(|e| warn!(error = %e, "Failure classifiers did not compile"))
        .ok()
});

/// PostgREST codes for a missing table
const MISSING_RELATION_CODES: &[&str] = &["42P01", "PGRST205"];

/// Which field a failed probe points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential was rejected
    InvalidCredential,
    /// The endpoint is malformed or unreachable
    InvalidEndpoint,
    /// Anything else, including timeouts
    Other,
}

/// A failed connection probe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProbeError {
    /// Server or transport error text
    pub message: String,
}

impl ProbeError {
    /// Create a probe error from its message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Classify the failure by its message
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::{FailureKind, ProbeError};
    /// assert_eq!(ProbeError::new("Invalid API key").kind(), FailureKind::InvalidCredential);
    /// assert_eq!(ProbeError::new("invalid endpoint URL").kind(), FailureKind::InvalidEndpoint);
    /// assert_eq!(ProbeError::new("probe timed out").kind(), FailureKind::Other);
    /// ```
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        let Some(classifiers) = CLASSIFIERS.as_ref() else {
            return FailureKind::Other;
        };
        let matches = classifiers.matches(&self.message);
        if matches.matched(0) {
            FailureKind::InvalidCredential
        } else if matches.matched(1) {
            FailureKind::InvalidEndpoint
        } else {
            FailureKind::Other
        }
    }
}

/// Checks a candidate connection against the live project
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Validator: Send + Sync {
    /// Probe the project with `connection`
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] describing why the connection was rejected.
    async fn probe(&self, connection: &Connection) -> Result<(), ProbeError>;
}

/// [`Validator`] that reads the probe table over the REST API
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: reqwest::Client,
    probe_table: String,
}

impl HttpValidator {
    /// Create a validator with the configured probe table and timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &ConnectionSettings) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.probe_timeout())
            .build()?;
        Ok(Self {
            client,
            probe_table: settings.probe_table.clone(),
        })
    }

    /// URL of the probe request for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] classified as an invalid endpoint if `endpoint` is
    /// not an absolute http(s) URL.
    pub fn probe_url(&self, endpoint: &str) -> Result<reqwest::Url, ProbeError> {
        let base = reqwest::Url::parse(endpoint.trim().trim_end_matches('/'))
            .map_err(|e| ProbeError::new(format!("invalid endpoint URL '{endpoint}': {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProbeError::new(format!(
                "invalid endpoint URL '{endpoint}': unsupported scheme '{}'",
                base.scheme()
            )));
        }

        let mut url = base;
        url.path_segments_mut()
            .map_err(|()| ProbeError::new(format!("invalid endpoint URL '{endpoint}'")))?
            .pop_if_empty()
            .extend(["rest", "v1", self.probe_table.as_str()]);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[async_trait]
impl Validator for HttpValidator {
    async fn probe(&self, connection: &Connection) -> Result<(), ProbeError> {
        let url = self.probe_url(connection.endpoint())?;
        let credential = connection.credential().trim();
        debug!(url = %url, "Probing connection");

        let response = self
            .client
            .get(url)
            .header("apikey", credential)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| ProbeError::new(transport_message(&e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() && is_missing_relation(&body) {
            debug!(%status, "Probe table is missing; connection accepted");
            return Ok(());
        }

        Err(ProbeError::new(format!("{status}: {}", server_message(&body))))
    }
}

/// Transport error text including its sources
fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "probe timed out".to_string();
    }

    let mut message = if error.is_connect() {
        format!("could not connect: {error}")
    } else {
        error.to_string()
    };
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_missing_relation(body: &str) -> bool {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    let code_matches = json
        .get("code")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|code| MISSING_RELATION_CODES.contains(&code));
    let message_matches = json
        .get("message")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|m| m.contains("does not exist") || m.contains("Could not find the table"));
    code_matches || message_matches
}

/// `message` field of a PostgREST error body, or the raw body
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
