//! Candidate discovery and table lookup

use super::error::{CandidateError, SchemaError, SchemaResult};
use super::registry::{SchemaRegistry, TableSchema};
use crate::settings::{SchemaSettings, ShapeMode};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Finds the column schema of a table in the project's type definitions
///
/// Candidate files are probed in priority order. Each request reads and parses
/// the files afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SchemaExtractor {
    project_root: PathBuf,
    candidates: Vec<PathBuf>,
    shape_mode: ShapeMode,
}

impl SchemaExtractor {
    /// Create an extractor for the project at `project_root`
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>, settings: &SchemaSettings) -> Self {
        Self {
            project_root: project_root.into(),
            candidates: settings.candidates.clone(),
            shape_mode: settings.shape_mode,
        }
    }

    /// Absolute paths of the candidate files, in probe order
    #[must_use]
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|candidate| self.project_root.join(candidate))
            .collect()
    }

    /// Extract the schema of `table` (matched case-insensitively)
    ///
    /// The first candidate that parses and declares the table wins. A candidate
    /// that cannot be read or parsed is logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InputNotFound`] if no candidate file exists
    /// - [`SchemaError::MemberNotFound`] if no parsed candidate declares the table
    /// - [`SchemaError::Parse`] if every existing candidate failed
    pub async fn extract_schema(&self, table: &str) -> SchemaResult<TableSchema> {
        let mut parsed = Vec::new();
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            let path = self.project_root.join(candidate);
            let source = match tokio::fs::read_to_string(&path).await {
                Ok(source) => source,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable type definitions");
                    failures.push((path, CandidateError::Read(e)));
                    continue;
                }
            };

            match SchemaRegistry::from_source(&source, self.shape_mode) {
                Ok(registry) => {
                    debug!(path = %path.display(), tables = registry.len(), "Parsed type definitions");
                    if let Some(schema) = registry.get(table) {
                        return Ok(TableSchema {
                            source: Some(candidate.clone()),
                            ..schema.clone()
                        });
                    }
                    parsed.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed type definitions");
                    failures.push((path, CandidateError::Syntax(e)));
                }
            }
        }

        if !parsed.is_empty() {
            return Err(SchemaError::MemberNotFound {
                table: table.to_string(),
                searched: parsed,
            });
        }
        if !failures.is_empty() {
            return Err(SchemaError::Parse { failures });
        }
        Err(SchemaError::InputNotFound {
            searched: self.candidate_paths(),
        })
    }
}
