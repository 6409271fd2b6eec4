//! Connection values

use serde::{Deserialize, Serialize};
use std::fmt;

/// An endpoint and a credential
///
/// Depending on context this holds either literal values or the names of the
/// environment variables that carry them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionPair {
    /// Project URL (or its variable name)
    pub endpoint: String,
    /// API key (or its variable name)
    pub credential: String,
}

impl ConnectionPair {
    /// Create a pair
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
        }
    }

    /// Whether both fields are non-empty
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.credential.trim().is_empty()
    }
}

/// Where the connection values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Values typed in or persisted verbatim
    Literal,
    /// Values found in the project's environment files
    Environment,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::Environment => f.write_str("env"),
        }
    }
}

/// Connection settings for the Supabase project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// Endpoint and credential embedded as values
    Literal(ConnectionPair),
    /// Endpoint and credential referenced by environment variable
    Environment {
        /// Variable names, used in generated code
        names: ConnectionPair,
        /// Values of those variables, used for validation
        values: ConnectionPair,
    },
}

impl Connection {
    /// Literal connection from an endpoint and a credential
    pub fn literal(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self::Literal(ConnectionPair::new(endpoint, credential))
    }

    /// The literal values to connect with
    #[must_use]
    pub const fn values(&self) -> &ConnectionPair {
        match self {
            Self::Literal(values) | Self::Environment { values, .. } => values,
        }
    }

    /// Endpoint value
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.values().endpoint
    }

    /// Credential value
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.values().credential
    }

    /// Kind of source the connection came from
    #[must_use]
    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::Literal(_) => SourceKind::Literal,
            Self::Environment { .. } => SourceKind::Environment,
        }
    }

    /// Whether both values are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values().is_complete()
    }

    /// Replace the endpoint; the result is always literal
    #[must_use]
    pub fn with_endpoint(self, endpoint: impl Into<String>) -> Self {
        let values = self.into_values();
        Self::literal(endpoint, values.credential)
    }

    /// Replace the credential; the result is always literal
    #[must_use]
    pub fn with_credential(self, credential: impl Into<String>) -> Self {
        let values = self.into_values();
        Self::literal(values.endpoint, credential)
    }

    fn into_values(self) -> ConnectionPair {
        match self {
            Self::Literal(values) | Self::Environment { values, .. } => values,
        }
    }
}

/// A connection that passed the probe in this process
///
/// Only the resolver creates these, so holding one proves validation happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConnection(Connection);

impl ValidatedConnection {
    pub(crate) const fn new(connection: Connection) -> Self {
        Self(connection)
    }

    /// The validated connection
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.0
    }
}
