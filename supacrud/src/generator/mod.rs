//! Template generator
//!
//! Turns a table schema, an [`OperationKind`] and a validated connection into
//! TypeScript data-access modules written to
//! `<project>/<output_dir>/<table>/<operation>.<ext>`.
//!
//! Each single operation renders one handlebars template. The composite
//! [`OperationKind::All`] runs create, read, update, delete and list in that order
//! and keeps going when one of them fails; failures are collected in the
//! [`GenerationReport`].

mod error;
mod operation;
pub mod templates;

pub use error::{GenerateError, GenerateResult};
pub use operation::OperationKind;

use crate::config::{Connection, ValidatedConnection};
use crate::naming::NamingHelpers;
use crate::schema::{ColumnType, Columns, TableSchema};
use crate::settings::GeneratorSettings;
use handlebars::Handlebars;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Id parameter type when the primary key column is unknown
const FALLBACK_ID_TYPE: &str = "string | number";

/// Generated modules use TypeScript syntax, so only TypeScript extensions are written
const EXTENSIONS: [&str; 3] = ["ts", "mts", "cts"];

/// Types exported by `supabase gen types` that column types refer to
const GENERATED_TYPE_NAMES: [&str; 2] = ["Database", "Json"];

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Table the artifact was generated for
    pub table: String,
    /// Single operation it implements
    pub operation: OperationKind,
    /// Absolute destination path
    pub path: PathBuf,
    /// File content
    pub content: String,
}

/// Outcome of one [`TemplateGenerator::generate`] call
#[derive(Debug)]
pub struct GenerationReport {
    /// Requested table
    pub table: String,
    /// Requested operation
    pub operation: OperationKind,
    /// Artifacts written, in generation order
    pub artifacts: Vec<GeneratedArtifact>,
    /// Sub-operations that failed (only populated for `All`)
    pub failures: Vec<(OperationKind, GenerateError)>,
}

impl GenerationReport {
    fn new(table: &str, operation: OperationKind) -> Self {
        Self {
            table: table.to_string(),
            operation,
            artifacts: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether every requested artifact was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders and writes data-access modules
pub struct TemplateGenerator {
    project_root: PathBuf,
    settings: GeneratorSettings,
    handlebars: Handlebars<'static>,
}

impl TemplateGenerator {
    /// Create a generator writing below `project_root`
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnsupportedExtension`] unless the extension is
    /// `ts`, `mts` or `cts`, or an error if a built-in template fails to compile.
    pub fn new(project_root: impl Into<PathBuf>, settings: GeneratorSettings) -> GenerateResult<Self> {
        if !EXTENSIONS.contains(&settings.extension.as_str()) {
            return Err(GenerateError::UnsupportedExtension(settings.extension));
        }

        let mut handlebars = Handlebars::new();

        // Output is TypeScript, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        for kind in OperationKind::COMPOSITE_ORDER {
            handlebars
                .register_template_string(kind.as_str(), template_for(kind))
                .map_err(Box::new)?;
        }

        Ok(Self {
            project_root: project_root.into(),
            settings,
            handlebars,
        })
    }

    /// Project root artifacts are written under
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Destination of the artifact for `table` and a single `operation`
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidTableName`] if the table name cannot be used
    /// as a directory name.
    pub fn destination(&self, table: &str, operation: OperationKind) -> GenerateResult<PathBuf> {
        validate_table_name(table)?;
        let file_name = format!("{}.{}", operation.as_str(), self.settings.extension);
        Ok(self
            .project_root
            .join(&self.settings.output_dir)
            .join(NamingHelpers::to_directory_name(table))
            .join(file_name))
    }

    /// Render one artifact without touching the filesystem
    ///
    /// # Errors
    ///
    /// - [`GenerateError::CompositeRender`] for [`OperationKind::All`]
    /// - [`GenerateError::SchemaNotFound`] if create or update is requested without a schema
    /// - [`GenerateError::InvalidTableName`] or [`GenerateError::Render`] otherwise
    pub fn render(
        &self,
        table: &str,
        operation: OperationKind,
        schema: Option<&TableSchema>,
        connection: &ValidatedConnection,
    ) -> GenerateResult<GeneratedArtifact> {
        if operation == OperationKind::All {
            return Err(GenerateError::CompositeRender);
        }
        let path = self.destination(table, operation)?;

        let shape = match (operation, schema) {
            (OperationKind::Create, Some(schema)) => Some(schema.insert_shape()),
            (OperationKind::Update, Some(schema)) => Some(schema.update_shape()),
            (kind, None) if kind.requires_schema() => {
                return Err(GenerateError::SchemaNotFound {
                    table: table.to_string(),
                    operation,
                });
            }
            _ => None,
        };

        let id_type = schema
            .and_then(|s| s.row().get(&self.settings.primary_key))
            .map_or(FALLBACK_ID_TYPE, |column| column.as_type_text());
        let order_column = schema
            .filter(|s| s.row().keys().any(|c| self.settings.is_audit_column(c)))
            .map(|_| self.settings.audit_column.as_str());

        let type_import = schema
            .zip(shape)
            .and_then(|(schema, columns)| self.type_import(schema, columns));

        let context = json!({
            "bootstrap": bootstrap(connection.connection(), type_import.as_deref()),
            "type_name": NamingHelpers::to_type_name(table),
            "list_name": NamingHelpers::capitalize(table),
            "table_literal": NamingHelpers::to_string_literal(table),
            "table_label": template_literal_text(table),
            "primary_key_literal": NamingHelpers::to_string_literal(&self.settings.primary_key),
            "id_type": id_type,
            "declarations": shape.map(|c| self.declarations(c)).unwrap_or_default(),
            "payload": shape.map(|c| self.payload(c)).unwrap_or_default(),
            "has_order": order_column.is_some(),
            "order_literal": order_column.map(NamingHelpers::to_string_literal).unwrap_or_default(),
        });

        let content = self
            .handlebars
            .render(operation.as_str(), &context)
            .map_err(|e| GenerateError::Render {
                operation,
                source: Box::new(e),
            })?;

        Ok(GeneratedArtifact {
            table: table.to_string(),
            operation,
            path,
            content,
        })
    }

    /// Write an artifact, creating its directory and replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::CreateDir`] or [`GenerateError::Write`] on I/O failure.
    pub async fn write(&self, artifact: &GeneratedArtifact) -> GenerateResult<()> {
        if let Some(parent) = artifact.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| GenerateError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&artifact.path, &artifact.content)
            .await
            .map_err(|source| GenerateError::Write {
                path: artifact.path.clone(),
                source,
            })?;

        info!(
            table = %artifact.table,
            operation = %artifact.operation,
            path = %artifact.path.display(),
            "Wrote artifact"
        );
        Ok(())
    }

    /// Generate and write the artifacts for `table` and `operation`
    ///
    /// A single operation either writes its artifact or returns the error. `All`
    /// always returns a report; sub-operation failures are logged and recorded in
    /// [`GenerationReport::failures`] while the remaining sub-operations still run.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidTableName`] for an unusable table name, or
    /// the failure of a single operation.
    pub async fn generate(
        &self,
        table: &str,
        operation: OperationKind,
        schema: Option<&TableSchema>,
        connection: &ValidatedConnection,
    ) -> GenerateResult<GenerationReport> {
        validate_table_name(table)?;
        let mut report = GenerationReport::new(table, operation);

        if operation != OperationKind::All {
            let artifact = self.generate_one(table, operation, schema, connection).await?;
            report.artifacts.push(artifact);
            return Ok(report);
        }

        for kind in OperationKind::COMPOSITE_ORDER {
            match self.generate_one(table, kind, schema, connection).await {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(e) => {
                    warn!(table, operation = %kind, error = %e, "Sub-operation failed, continuing");
                    report.failures.push((kind, e));
                }
            }
        }

        Ok(report)
    }

    async fn generate_one(
        &self,
        table: &str,
        operation: OperationKind,
        schema: Option<&TableSchema>,
        connection: &ValidatedConnection,
    ) -> GenerateResult<GeneratedArtifact> {
        let artifact = self.render(table, operation, schema, connection)?;
        self.write(&artifact).await?;
        Ok(artifact)
    }

    /// Columns that go into input shapes and payloads
    fn input_columns<'c>(
        &'c self,
        columns: &'c Columns,
    ) -> impl Iterator<Item = (&'c String, &'c ColumnType)> {
        columns
            .iter()
            .filter(|(name, _)| !self.settings.is_audit_column(name))
    }

    fn declarations(&self, columns: &Columns) -> String {
        self.input_columns(columns)
            .map(|(name, ty)| format!("  {}: {};", NamingHelpers::to_property_key(name), ty))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `import type` line for generated types the input columns refer to
    fn type_import(&self, schema: &TableSchema, columns: &Columns) -> Option<String> {
        let source = schema.source.as_deref()?;
        let names: Vec<&str> = GENERATED_TYPE_NAMES
            .into_iter()
            .filter(|name| {
                self.input_columns(columns)
                    .any(|(_, ty)| references(ty.as_type_text(), name))
            })
            .collect();
        if names.is_empty() {
            return None;
        }

        let module = module_specifier(&self.settings.output_dir, source)?;
        Some(format!(
            "import type {{ {} }} from {};",
            names.join(", "),
            NamingHelpers::to_string_literal(&module)
        ))
    }

    fn payload(&self, columns: &Columns) -> String {
        self.input_columns(columns)
            .map(|(name, _)| {
                format!(
                    "      {}: {},",
                    NamingHelpers::to_property_key(name),
                    NamingHelpers::to_property_access("input", name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

const fn template_for(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Create => templates::CREATE,
        OperationKind::Read => templates::READ,
        OperationKind::Update => templates::UPDATE,
        OperationKind::Delete => templates::DELETE,
        OperationKind::List | OperationKind::All => templates::LIST,
    }
}

fn validate_table_name(table: &str) -> GenerateResult<()> {
    let trimmed = table.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains(['/', '\\'])
        || trimmed.chars().any(char::is_control);
    if invalid {
        return Err(GenerateError::InvalidTableName(table.to_string()));
    }
    Ok(())
}

/// Whether `type_text` uses `name` as a whole identifier
fn references(type_text: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    type_text.match_indices(name).any(|(at, _)| {
        let before = type_text[..at].chars().next_back();
        let after = type_text[at + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Relative module path from `<output_dir>/<table>/` to the types file
///
/// `None` when either path is absolute or leaves the project root.
fn module_specifier(output_dir: &Path, source: &Path) -> Option<String> {
    let depth = output_dir
        .components()
        .map(|component| match component {
            Component::Normal(_) => Some(1),
            Component::CurDir => Some(0),
            _ => None,
        })
        .sum::<Option<usize>>()?
        + 1;

    let mut segments = Vec::new();
    for component in source.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    let file = segments.pop()?;
    let module = [".d.ts", ".ts", ".mts", ".cts"]
        .into_iter()
        .find_map(|extension| file.strip_suffix(extension))
        .unwrap_or(file);
    segments.push(module);

    Some(format!("{}{}", "../".repeat(depth), segments.join("/")))
}

/// Import and client construction for a connection
fn bootstrap(connection: &Connection, type_import: Option<&str>) -> String {
    let arguments = match connection {
        Connection::Literal(pair) => format!(
            "{}, {}",
            NamingHelpers::to_string_literal(&pair.endpoint),
            NamingHelpers::to_string_literal(&pair.credential)
        ),
        Connection::Environment { names, .. } => format!(
            "{}!, {}!",
            NamingHelpers::to_property_access("process.env", &names.endpoint),
            NamingHelpers::to_property_access("process.env", &names.credential)
        ),
    };
    let imports = type_import.map_or_else(
        || "import { createClient } from '@supabase/supabase-js';".to_string(),
        |line| format!("import {{ createClient }} from '@supabase/supabase-js';\n{line}"),
    );
    format!("{imports}\n\nconst supabase = createClient({arguments});")
}

/// Escape text for use inside a template literal
fn template_literal_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}
