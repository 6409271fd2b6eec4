//! Terminal prompts

use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use supacrud::{ConfigError, ConfigResult, OperationKind, Prompter};

/// [`Prompter`] backed by dialoguer
///
/// dialoguer blocks on terminal input, so every prompt runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    /// Ask for the table to work with
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    pub async fn table(&self) -> ConfigResult<String> {
        blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter the name of the table you want to work with")
                .validate_with(non_empty("Table name cannot be empty"))
                .interact_text()
        })
        .await
        .map(|table| table.trim().to_string())
    }

    /// Ask which operation to generate
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    pub async fn operation(&self) -> ConfigResult<OperationKind> {
        let index = blocking(|| {
            let items: Vec<String> = OperationKind::ALL_KINDS
                .iter()
                .map(|kind| format!("{kind:<7} {}", kind.description()))
                .collect();
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("What would you like to generate?")
                .items(&items)
                .default(0)
                .interact()
        })
        .await?;

        OperationKind::ALL_KINDS
            .get(index)
            .copied()
            .ok_or_else(|| ConfigError::Prompt(format!("no operation at index {index}")))
    }
}

#[async_trait]
impl Prompter for DialoguerPrompter {
    async fn endpoint(&self) -> ConfigResult<String> {
        blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter your Supabase project URL")
                .validate_with(non_empty("Project URL cannot be empty"))
                .interact_text()
        })
        .await
    }

    async fn credential(&self) -> ConfigResult<String> {
        blocking(|| {
            Password::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter your Supabase API key")
                .interact()
        })
        .await
    }

    async fn confirm(&self, message: &str) -> ConfigResult<bool> {
        let message = message.to_string();
        blocking(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(message)
                .default(false)
                .interact()
        })
        .await
    }
}

fn non_empty(message: &'static str) -> impl FnMut(&String) -> Result<(), &'static str> {
    move |input: &String| {
        if input.trim().is_empty() {
            Err(message)
        } else {
            Ok(())
        }
    }
}

async fn blocking<T, F>(prompt: F) -> ConfigResult<T>
where
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| ConfigError::Prompt(e.to_string()))?
        .map_err(|e| ConfigError::Prompt(e.to_string()))
}
