//! Connection resolution and validation
//!
//! The generator needs the project endpoint and an API key. They come from the
//! first source that yields both values:
//!
//! 1. the persisted `config.json` for this project
//! 2. the project's `.env*` files (stored as variable names plus values)
//! 3. interactive prompts
//!
//! Whatever is found is probed against the live project by a [`Validator`]
//! before the [`ConfigResolver`] hands it out as a [`ValidatedConnection`]. A
//! rejected connection is re-prompted, persisted and probed again until it works.
//!
//! The pieces are kept apart: [`PersistedStore`] only reads and writes the file,
//! [`CredentialSource`] is the resolution strategy, the [`Validator`] talks to
//! the network, and the resolver composes them.

mod connection;
mod env_scan;
mod error;
mod prompt;
mod resolver;
mod source;
mod store;
mod token;
mod validator;

pub use connection::{Connection, ConnectionPair, SourceKind, ValidatedConnection};
pub use env_scan::EnvScanner;
pub use error::{ConfigError, ConfigResult};
pub use prompt::Prompter;
pub use resolver::{ConfigResolver, ResolverState, ROTATE_CONFIRMATION};
pub use source::CredentialSource;
pub use store::PersistedStore;
pub use token::DecodedToken;
pub use validator::{FailureKind, HttpValidator, ProbeError, Validator};
