//! Interactive input seam

use super::error::ConfigResult;
use async_trait::async_trait;

/// Source of interactively supplied connection values
///
/// The CLI implements this with terminal prompts; tests script it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask for the project endpoint (non-empty)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prompt`](super::ConfigError::Prompt) if input fails.
    async fn endpoint(&self) -> ConfigResult<String>;

    /// Ask for the API credential (non-empty)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prompt`](super::ConfigError::Prompt) if input fails.
    async fn credential(&self) -> ConfigResult<String>;

    /// Ask a yes/no question
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Prompt`](super::ConfigError::Prompt) if input fails.
    async fn confirm(&self, message: &str) -> ConfigResult<bool>;
}
