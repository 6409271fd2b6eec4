//! Credential rotation

use anyhow::{Context, Result};
use console::style;
use supacrud::{ConfigResolver, Prompter, Validator};

/// Replace the stored Supabase credentials
pub struct CredentialsCommand {
    confirm: bool,
}

impl CredentialsCommand {
    /// Rotation that asks for confirmation first
    #[must_use]
    pub const fn new() -> Self {
        Self { confirm: true }
    }

    /// Skip the confirmation prompt
    #[must_use]
    pub const fn without_confirmation(mut self) -> Self {
        self.confirm = false;
        self
    }

    /// Prompt for new credentials, persist and validate them
    ///
    /// Returns whether the credentials were replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if prompting fails.
    pub async fn execute<P, V>(&self, resolver: &mut ConfigResolver<P, V>) -> Result<bool>
    where
        P: Prompter,
        V: Validator,
    {
        let rotated = resolver
            .rotate_credentials(self.confirm)
            .await
            .context("Failed to update credentials")?;

        if rotated {
            println!(
                "{} {}",
                style("✓").green(),
                style("Supabase credentials updated").green().bold()
            );
        } else {
            println!("{}", style("Credentials left unchanged").dim());
        }

        Ok(rotated)
    }
}

impl Default for CredentialsCommand {
    fn default() -> Self {
        Self::new()
    }
}
