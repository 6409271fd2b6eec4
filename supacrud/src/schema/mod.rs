//! Type-definition parsing and schema lookup
//!
//! The extractor reads the TypeScript definitions produced by
//! `supabase gen types typescript`, parses them with oxc and finds the
//! `Tables.<table>.Row` shape of the requested table:
//!
//! ```text
//! export type Database = {
//!   public: {
//!     Tables: {
//!       users: {
//!         Row: { id: string; name: string; created_at: string }
//!         Insert: { ... }
//!         Update: { ... }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Column types are kept as the literal source text; no type resolution happens.

mod error;
mod extractor;
mod parser;
mod registry;

pub use error::{CandidateError, SchemaError, SchemaResult, SyntaxError};
pub use extractor::SchemaExtractor;
pub use registry::{ColumnType, Columns, SchemaRegistry, TableSchema};
