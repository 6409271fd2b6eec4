//! Generate data-access modules for one or more tables
//!
//! # Example
//!
//! ```bash
//! supacrud -t users -t posts -a
//! supacrud --table users --create --list
//! ```

use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use supacrud::{
    ConfigResolver, EnvScanner, GenerateError, GeneratedArtifact, HttpValidator, OperationKind,
    PersistedStore, SchemaError, SchemaExtractor, Settings, TableSchema, TemplateGenerator,
    ValidatedConnection,
};
use tracing::{debug, warn};

use super::CredentialsCommand;
use crate::cli::Cli;
use crate::prompt::DialoguerPrompter;

/// A `(table, operation)` pair to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Table name as given
    pub table: String,
    /// Requested operation (`All` expands inside the generator)
    pub operation: OperationKind,
}

/// Every unit for the requested tables and operations, table-major
#[must_use]
pub fn plan(tables: &[String], operations: &[OperationKind]) -> Vec<Unit> {
    tables
        .iter()
        .flat_map(|table| {
            operations.iter().map(move |&operation| Unit {
                table: table.clone(),
                operation,
            })
        })
        .collect()
}

/// What a run produced
#[derive(Debug, Default)]
pub struct Summary {
    /// Written files, relative to the project root where possible
    pub written: Vec<PathBuf>,
    /// Human-readable failure lines
    pub failures: Vec<String>,
}

impl Summary {
    fn record_artifacts(&mut self, root: &Path, artifacts: &[GeneratedArtifact]) {
        self.written
            .extend(artifacts.iter().map(|a| relative(root, &a.path).to_path_buf()));
    }

    fn record_failure(&mut self, table: &str, operation: OperationKind, error: &GenerateError) {
        self.failures.push(format!("{table} {operation}: {error}"));
    }

    /// Nothing was written and something failed
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.written.is_empty() && !self.failures.is_empty()
    }
}

enum SchemaOutcome {
    Found(TableSchema),
    Unavailable,
    Skip(String),
}

/// Generate CRUD modules
pub struct GenerateCommand {
    project_root: Option<PathBuf>,
    tables: Vec<String>,
    operations: Vec<OperationKind>,
    set_creds: bool,
    generation_requested: bool,
}

impl GenerateCommand {
    /// Build the command from parsed arguments
    #[must_use]
    pub fn new(cli: &Cli) -> Self {
        Self {
            project_root: cli.project_root.clone(),
            tables: cli.tables.clone(),
            operations: cli.operations(),
            set_creds: cli.set_creds,
            generation_requested: cli.requests_generation(),
        }
    }

    /// Run the command
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded, the connection cannot be
    /// resolved, or no file could be generated at all.
    pub async fn execute(self) -> Result<()> {
        let project_root = match &self.project_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let settings = Settings::load(&project_root).with_context(|| {
            format!(
                "Failed to load {}",
                project_root.join(Settings::FILE_NAME).display()
            )
        })?;
        debug!(?settings, "Loaded settings");

        let prompter = DialoguerPrompter;
        let store = PersistedStore::for_project(&project_root, &settings.connection)
            .await
            .context("Failed to locate the credential store")?;
        let scanner = EnvScanner::new(&project_root, &settings.connection);
        let validator =
            HttpValidator::new(&settings.connection).context("Failed to create HTTP client")?;
        let mut resolver = ConfigResolver::new(store, scanner, prompter, validator);

        if self.set_creds {
            CredentialsCommand::new().execute(&mut resolver).await?;
            if !self.generation_requested {
                return Ok(());
            }
        }

        let tables = if self.tables.is_empty() {
            vec![prompter.table().await.context("Failed to read table name")?]
        } else {
            self.tables.clone()
        };
        let operations = if self.operations.is_empty() {
            vec![prompter.operation().await.context("Failed to read operation")?]
        } else {
            self.operations.clone()
        };

        let connection = resolver
            .resolve()
            .await
            .context("Failed to resolve Supabase connection")?;
        println!(
            "{} Connected to {} ({})",
            style("✓").green(),
            style(connection.connection().endpoint()).cyan(),
            connection.connection().source_kind()
        );

        let extractor = SchemaExtractor::new(&project_root, &settings.schema);
        let generator = TemplateGenerator::new(&project_root, settings.generator.clone())
            .context("Failed to initialize templates")?;

        let mut summary = Summary::default();
        for table in &tables {
            let schema = match Self::load_schema(&extractor, table).await {
                SchemaOutcome::Found(schema) => Some(schema),
                SchemaOutcome::Unavailable => None,
                SchemaOutcome::Skip(reason) => {
                    summary.failures.push(format!("{table}: {reason}"));
                    continue;
                }
            };
            let units = plan(std::slice::from_ref(table), &operations);
            Self::run_units(&generator, &units, schema.as_ref(), &connection, &mut summary)
                .await?;
        }

        Self::print_summary(&summary);
        if summary.is_total_failure() {
            bail!("No files were generated");
        }
        Ok(())
    }

    /// Extract the schema of `table`
    ///
    /// Missing type definitions skip the table. Any other schema error still
    /// lets the schema-free operations run.
    async fn load_schema(extractor: &SchemaExtractor, table: &str) -> SchemaOutcome {
        match extractor.extract_schema(table).await {
            Ok(schema) => {
                debug!(table, columns = schema.row().len(), "Extracted schema");
                SchemaOutcome::Found(schema)
            }
            Err(e @ SchemaError::InputNotFound { .. }) => {
                println!("{} {}: {e}", style("✗").red(), style(table).bold());
                SchemaOutcome::Skip(e.to_string())
            }
            Err(e) => {
                warn!(table, error = %e, "Schema unavailable, generating without it");
                println!("{} {}: {e}", style("!").yellow(), style(table).bold());
                SchemaOutcome::Unavailable
            }
        }
    }

    async fn run_units(
        generator: &TemplateGenerator,
        units: &[Unit],
        schema: Option<&TableSchema>,
        connection: &ValidatedConnection,
        summary: &mut Summary,
    ) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        let root = generator.project_root();
        for unit in units {
            spinner.set_message(format!("Generating {} for {}...", unit.operation, unit.table));
            match generator
                .generate(&unit.table, unit.operation, schema, connection)
                .await
            {
                Ok(report) => {
                    for artifact in &report.artifacts {
                        spinner.println(format!(
                            "  {} {}",
                            style("✓").green(),
                            style(relative(root, &artifact.path).display()).dim()
                        ));
                    }
                    for (operation, error) in &report.failures {
                        spinner.println(format!(
                            "  {} {} {}: {error}",
                            style("✗").red(),
                            unit.table,
                            operation
                        ));
                        summary.record_failure(&unit.table, *operation, error);
                    }
                    summary.record_artifacts(root, &report.artifacts);
                }
                Err(e) => {
                    spinner.println(format!(
                        "  {} {} {}: {e}",
                        style("✗").red(),
                        unit.table,
                        unit.operation
                    ));
                    summary.record_failure(&unit.table, unit.operation, &e);
                }
            }
        }

        spinner.finish_and_clear();
        Ok(())
    }

    fn print_summary(summary: &Summary) {
        println!(
            "\n{} {} files",
            style("Generated").green().bold(),
            summary.written.len()
        );
        for path in &summary.written {
            println!("  {}", style(path.display()).dim());
        }

        if !summary.failures.is_empty() {
            println!(
                "\n{} {}",
                style("Failed").red().bold(),
                summary.failures.len()
            );
            for failure in &summary.failures {
                println!("  {failure}");
            }
        }
    }
}

fn relative<'p>(root: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}
