//! CLI command implementations

pub mod credentials;
pub mod generate;

pub use credentials::CredentialsCommand;
pub use generate::GenerateCommand;
