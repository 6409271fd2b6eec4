//! Generator error types

use super::operation::OperationKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for generation
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that can occur while generating artifacts
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The operation keyword is not one of create, read, update, delete, list, all
    #[error("unknown operation '{0}' (expected create, read, update, delete, list or all)")]
    UnknownOperation(String),

    /// The operation needs a table schema and none was supplied
    #[error("cannot generate {operation} for '{table}': table schema not found")]
    SchemaNotFound {
        /// Requested table
        table: String,
        /// Operation that needed the schema
        operation: OperationKind,
    },

    /// The configured extension is not a TypeScript module extension
    #[error("unsupported output extension '{0}' (expected ts, mts or cts)")]
    UnsupportedExtension(String),

    /// The table name cannot be used as an output directory
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// The destination directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory being created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A template failed to render
    #[error("failed to render {operation} template: {source}")]
    Render {
        /// Operation being rendered
        operation: OperationKind,
        /// Underlying render error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// A built-in template failed to compile
    #[error("invalid template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// `All` was passed to a single-artifact operation
    #[error("the composite 'all' operation does not map to a single artifact")]
    CompositeRender,
}

impl GenerateError {
    /// Whether the error comes from the filesystem
    #[must_use]
    pub const fn is_filesystem(&self) -> bool {
        matches!(self, Self::CreateDir { .. } | Self::Write { .. })
    }
}
