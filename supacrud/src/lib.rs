//! supacrud - Supabase CRUD generator
//!
//! Reads the TypeScript definitions emitted by `supabase gen types`, extracts the
//! column schema of a table and writes ready-to-use data-access modules
//! (create, read, update, delete, list) for it.
//!
//! The crate is split along the three pieces of the pipeline:
//!
//! - [`schema`] - parses the type definitions with oxc and builds a per-request
//!   [`SchemaRegistry`]
//! - [`config`] - resolves the connection settings through a priority chain and
//!   validates them against the live project before anything is generated
//! - [`generator`] - renders handlebars templates for every [`OperationKind`] and
//!   writes them to `<project>/data/<table>/<operation>.<ts|mts|cts>`
//!
//! # Example
//!
//! ```rust,no_run
//! use supacrud::{
//!     ConfigResolver, EnvScanner, HttpValidator, OperationKind, PersistedStore, Prompter,
//!     SchemaExtractor, Settings, TemplateGenerator,
//! };
//! use std::path::Path;
//!
//! # async fn example(prompter: impl Prompter) -> Result<(), Box<dyn std::error::Error>> {
//! let root = Path::new(".");
//! let settings = Settings::load(root)?;
//!
//! let store = PersistedStore::for_project(root, &settings.connection).await?;
//! let scanner = EnvScanner::new(root, &settings.connection);
//! let validator = HttpValidator::new(&settings.connection)?;
//! let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);
//! let connection = resolver.resolve().await?;
//!
//! let extractor = SchemaExtractor::new(root, &settings.schema);
//! let schema = extractor.extract_schema("posts").await.ok();
//!
//! let generator = TemplateGenerator::new(root, settings.generator.clone())?;
//! let report = generator
//!     .generate("posts", OperationKind::All, schema.as_ref(), &connection)
//!     .await?;
//! println!("wrote {} files", report.artifacts.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod generator;
pub mod naming;
pub mod schema;
pub mod settings;

pub use config::{
    ConfigError, ConfigResolver, ConfigResult, Connection, ConnectionPair, CredentialSource,
    EnvScanner, FailureKind, HttpValidator, PersistedStore, ProbeError, Prompter, ResolverState,
    SourceKind, ValidatedConnection, Validator,
};
pub use generator::{
    GenerateError, GenerateResult, GeneratedArtifact, GenerationReport, OperationKind,
    TemplateGenerator,
};
pub use naming::NamingHelpers;
pub use schema::{
    ColumnType, Columns, SchemaError, SchemaExtractor, SchemaRegistry, SchemaResult, SyntaxError,
    TableSchema,
};
pub use settings::{ConnectionSettings, GeneratorSettings, SchemaSettings, Settings, ShapeMode};
