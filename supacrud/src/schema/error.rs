//! Schema extraction error types

use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema extraction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Malformed type-definition source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    /// What went wrong
    pub message: String,
    /// 1-based line of the offending character
    pub line: usize,
    /// 1-based column of the offending character
    pub column: usize,
}

impl SyntaxError {
    /// Build an error positioned at byte `offset` of `source`
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Why a single candidate file was skipped
#[derive(Debug, Error)]
pub enum CandidateError {
    /// The file exists but could not be read
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    /// The file could not be parsed
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
}

/// Errors that can occur while extracting a table schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// None of the candidate type-definition files exist
    #[error(
        "no type definition file found (looked for {}). Have you run `supabase gen types typescript > types/supabase.ts`?",
        display_paths(.searched)
    )]
    InputNotFound {
        /// Every path that was checked
        searched: Vec<PathBuf>,
    },

    /// The table is not declared in any successfully parsed candidate
    #[error("table '{table}' or its Row shape not found in {}", display_paths(.searched))]
    MemberNotFound {
        /// Requested table
        table: String,
        /// Candidates that parsed successfully
        searched: Vec<PathBuf>,
    },

    /// Every existing candidate failed to parse
    #[error("no type definition file could be parsed:{}", display_failures(.failures))]
    Parse {
        /// Per-candidate failures in candidate order
        failures: Vec<(PathBuf, CandidateError)>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_failures(failures: &[(PathBuf, CandidateError)]) -> String {
    failures.iter().fold(String::new(), |mut out, (path, error)| {
        let _ = write!(out, "\n  {}: {error}", path.display());
        out
    })
}
