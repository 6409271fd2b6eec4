//! supacrud command-line front end
//!
//! Parses arguments, asks for whatever is missing, resolves the Supabase
//! connection and drives the [`supacrud`] generator for every requested
//! table and operation.

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod observability;
pub mod prompt;

pub use cli::Cli;
pub use commands::{CredentialsCommand, GenerateCommand};
pub use prompt::DialoguerPrompter;
