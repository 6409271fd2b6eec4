//! Operation kinds

use super::error::GenerateError;
use std::fmt;
use std::str::FromStr;

/// What a generated module does
///
/// `All` is the composite of the five single operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Insert a row
    Create,
    /// Fetch one row by primary key
    Read,
    /// Update one row by primary key
    Update,
    /// Delete one row by primary key
    Delete,
    /// Fetch every row
    List,
    /// Every operation above, best-effort
    All,
}

impl OperationKind {
    /// Sub-operations run by [`OperationKind::All`], in order
    pub const COMPOSITE_ORDER: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::List,
    ];

    /// Every operation, in menu order
    pub const ALL_KINDS: [Self; 6] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::List,
        Self::All,
    ];

    /// Keyword used on the command line and as the output file stem
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::All => "all",
        }
    }

    /// Short human description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Create => "Create a new record",
            Self::Read => "Read a record by id",
            Self::Update => "Update a record by id",
            Self::Delete => "Delete a record by id",
            Self::List => "List all records",
            Self::All => "All of the above",
        }
    }

    /// Whether the operation declares a typed input shape
    #[must_use]
    pub const fn requires_schema(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_KINDS
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerateError::UnknownOperation(s.to_string()))
    }
}
