//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for connection resolution
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while resolving the connection
///
/// Probe failures are not part of this type: the resolver recovers from them by
/// prompting again.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration or environment file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File or directory being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The persisted configuration could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be serialized
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Interactive input failed or was aborted
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// The platform has no user configuration directory
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    /// The HTTP client for the connection probe could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
