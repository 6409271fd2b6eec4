//! Table schemas and the per-request registry

use super::error::SyntaxError;
use super::parser::parse_tables;
use crate::settings::ShapeMode;
use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Declared type of a column
///
/// Known types carry the literal source text, generics and unions included.
/// A member declared without an annotation is `Unknown` and renders as `any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Literal type expression from the source
    Known(String),
    /// No usable type annotation
    Unknown,
}

impl ColumnType {
    /// Type text to emit in generated code
    #[must_use]
    pub fn as_type_text(&self) -> &str {
        match self {
            Self::Known(text) => text,
            Self::Unknown => "any",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_type_text())
    }
}

/// Ordered column name to type mapping
pub type Columns = IndexMap<String, ColumnType>;

/// Column schema of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name as declared in the source
    pub name: String,
    /// `Row` columns in declaration order
    pub columns: Columns,
    /// `Insert` columns when read in distinct mode
    pub insert: Option<Columns>,
    /// `Update` columns when read in distinct mode
    pub update: Option<Columns>,
    /// Type-definition file the schema was read from, relative to the project root
    pub source: Option<PathBuf>,
}

impl TableSchema {
    /// Columns of the read shape
    #[must_use]
    pub const fn row(&self) -> &Columns {
        &self.columns
    }

    /// Columns accepted on insert (the row shape unless a distinct one was read)
    #[must_use]
    pub fn insert_shape(&self) -> &Columns {
        self.insert.as_ref().unwrap_or(&self.columns)
    }

    /// Columns accepted on update (the row shape unless a distinct one was read)
    #[must_use]
    pub fn update_shape(&self) -> &Columns {
        self.update.as_ref().unwrap_or(&self.columns)
    }
}

/// Every table declared in one type-definition source
///
/// Keys are lowercased so lookups are case-insensitive; the declared name is
/// kept on each [`TableSchema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// Parse `source` and collect its tables
    ///
    /// A table is a member of a `Tables` literal whose own type literal has a
    /// `Row` member with a literal body. When two declarations name the same
    /// table (case-insensitively), the first one wins.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the source is not valid TypeScript.
    pub fn from_source(source: &str, mode: ShapeMode) -> Result<Self, SyntaxError> {
        let mut registry = Self::default();
        for table in parse_tables(source, mode)? {
            let key = table.name.to_lowercase();
            if registry.tables.contains_key(&key) {
                warn!(table = %table.name, "Duplicate table declaration ignored");
                continue;
            }
            registry.tables.insert(key, table);
        }
        Ok(registry)
    }

    /// Look up a table by name, ignoring case
    #[must_use]
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(&table.to_lowercase())
    }

    /// Declared table names in source order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.values().map(|schema| schema.name.as_str())
    }

    /// Number of tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
