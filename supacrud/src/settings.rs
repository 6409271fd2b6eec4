//! Tool settings
//!
//! Settings are loaded from several sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `SUPACRUD_` prefix, `__` between sections)
//! 2. `<project>/supacrud.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # supacrud.toml
//! [schema]
//! candidates = ["types/supabase.ts", "src/lib/database.types.ts"]
//! shape_mode = "distinct"
//!
//! [generator]
//! output_dir = "data"
//! audit_column = "inserted_at"
//!
//! [connection]
//! probe_timeout_secs = 5
//! env_file_prefix = ".env"
//! ```
//!
//! The same value from the environment:
//!
//! ```text
//! SUPACRUD_GENERATOR__AUDIT_COLUMN=inserted_at
//! ```

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the `Insert` and `Update` shapes of a table relate to its `Row` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    /// Reuse the `Row` shape for inserts and updates (default)
    #[default]
    Unified,
    /// Read `Insert`/`Update` when declared, falling back to `Row`
    Distinct,
}

/// Type-definition discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Candidate files relative to the project root, in priority order
    pub candidates: Vec<PathBuf>,

    /// Relationship between `Row`, `Insert` and `Update`
    pub shape_mode: ShapeMode,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            candidates: [
                "types/supabase.ts",
                "types/database.types.ts",
                "src/types/supabase.ts",
                "src/types/database.types.ts",
                "lib/database.types.ts",
                "src/lib/database.types.ts",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            shape_mode: ShapeMode::Unified,
        }
    }
}

/// Output settings for generated artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Directory under the project root that receives `<table>/<operation>` files
    pub output_dir: PathBuf,

    /// File extension of generated modules: `ts`, `mts` or `cts`
    pub extension: String,

    /// Column left out of input shapes and payloads (empty disables the filter)
    pub audit_column: String,

    /// Column used by read, update and delete to address a single row
    pub primary_key: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            extension: "ts".to_string(),
            audit_column: "created_at".to_string(),
            primary_key: "id".to_string(),
        }
    }
}

impl GeneratorSettings {
    /// Whether `column` is the configured audit column
    #[must_use]
    pub fn is_audit_column(&self, column: &str) -> bool {
        !self.audit_column.is_empty() && self.audit_column == column
    }
}

/// Connection discovery and validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Table read by the connection probe
    pub probe_table: String,

    /// Upper bound for a single probe request, in seconds
    pub probe_timeout_secs: u64,

    /// Filename prefix of environment-definition files
    pub env_file_prefix: String,

    /// Substring that identifies a project endpoint inside an environment file
    pub endpoint_marker: String,

    /// Directory holding the persisted `config.json` (defaults to the user config dir)
    pub store_dir: Option<PathBuf>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            probe_table: "_test".to_string(),
            probe_timeout_secs: 10,
            env_file_prefix: ".env".to_string(),
            endpoint_marker: ".supabase.co".to_string(),
            store_dir: None,
        }
    }
}

impl ConnectionSettings {
    /// Probe timeout as a [`Duration`]
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Complete supacrud settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Type-definition discovery
    #[serde(default)]
    pub schema: SchemaSettings,

    /// Generated output
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Connection resolution
    #[serde(default)]
    pub connection: ConnectionSettings,
}

impl Settings {
    /// Settings file looked up in the project root
    pub const FILE_NAME: &'static str = "supacrud.toml";

    /// Prefix of environment overrides
    pub const ENV_PREFIX: &'static str = "SUPACRUD_";

    /// Load settings for the project at `project_root`
    ///
    /// A missing `supacrud.toml` is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file or an override cannot be deserialized.
    pub fn load(project_root: &Path) -> figment::Result<Self> {
        Self::figment(project_root).extract()
    }

    /// The layered provider chain used by [`Settings::load`]
    #[must_use]
    pub fn figment(project_root: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(project_root.join(Self::FILE_NAME)))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.schema.candidates[0], PathBuf::from("types/supabase.ts"));
        assert_eq!(settings.schema.shape_mode, ShapeMode::Unified);
        assert_eq!(settings.generator.output_dir, PathBuf::from("data"));
        assert_eq!(settings.generator.extension, "ts");
        assert_eq!(settings.connection.probe_table, "_test");
        assert_eq!(settings.connection.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_audit_column_filter() {
        let mut generator = GeneratorSettings::default();
        assert!(generator.is_audit_column("created_at"));
        assert!(!generator.is_audit_column("id"));

        generator.audit_column = String::new();
        assert!(!generator.is_audit_column(""));
        assert!(!generator.is_audit_column("created_at"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|jail| {
            let settings = Settings::load(jail.directory())?;
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                Settings::FILE_NAME,
                r#"
                [schema]
                shape_mode = "distinct"

                [generator]
                audit_column = "inserted_at"
                extension = "cts"
                "#,
            )?;
            jail.set_env("SUPACRUD_GENERATOR__EXTENSION", "mts");

            let settings = Settings::load(jail.directory())?;
            assert_eq!(settings.schema.shape_mode, ShapeMode::Distinct);
            assert_eq!(settings.generator.audit_column, "inserted_at");
            assert_eq!(settings.generator.extension, "mts");
            assert_eq!(settings.generator.primary_key, "id");
            Ok(())
        });
    }
}
