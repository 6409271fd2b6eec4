//! TypeScript parsing and `Tables` discovery
//!
//! The source is parsed with oxc. Type aliases and interfaces are walked
//! depth-first through nested type literals; every property signature directly
//! inside a `Tables` literal whose own literal has a `Row` literal is a table.

use super::error::SyntaxError;
use super::registry::{ColumnType, Columns, TableSchema};
use crate::settings::ShapeMode;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Declaration, PropertyKey, Statement, TSPropertySignature, TSSignature, TSType,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use tracing::warn;

/// Name of the member that holds every table declaration
const TABLES_MEMBER: &str = "Tables";
const ROW_MEMBER: &str = "Row";
const INSERT_MEMBER: &str = "Insert";
const UPDATE_MEMBER: &str = "Update";

/// Every table declared in `source`, in source order
///
/// Duplicates are returned as declared; the registry decides which one wins.
///
/// # Errors
///
/// Returns a [`SyntaxError`] positioned at the first diagnostic if the source
/// is not valid TypeScript.
pub(crate) fn parse_tables(source: &str, mode: ShapeMode) -> Result<Vec<TableSchema>, SyntaxError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::ts()).parse();

    if let Some(diagnostic) = parsed.errors.first() {
        let offset = diagnostic
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map_or(0, |label| label.offset());
        return Err(SyntaxError::at(source, offset, diagnostic.to_string()));
    }
    if parsed.panicked {
        return Err(SyntaxError::at(source, 0, "unrecoverable parse error"));
    }

    let mut walker = TableWalker {
        source,
        mode,
        tables: Vec::new(),
    };
    for statement in parsed.program.body.iter() {
        walker.statement(statement);
    }
    Ok(walker.tables)
}

struct TableWalker<'s> {
    source: &'s str,
    mode: ShapeMode,
    tables: Vec<TableSchema>,
}

impl TableWalker<'_> {
    fn statement(&mut self, statement: &Statement<'_>) {
        match statement {
            Statement::TSTypeAliasDeclaration(alias) => self.ty(&alias.type_annotation, None),
            Statement::TSInterfaceDeclaration(interface) => {
                self.members(&interface.body.body, None);
            }
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::TSTypeAliasDeclaration(alias)) => {
                    self.ty(&alias.type_annotation, None);
                }
                Some(Declaration::TSInterfaceDeclaration(interface)) => {
                    self.members(&interface.body.body, None);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn ty(&mut self, ty: &TSType<'_>, owner: Option<&str>) {
        if let TSType::TSTypeLiteral(literal) = ty {
            self.members(&literal.members, owner);
        }
    }

    fn members(&mut self, members: &[TSSignature<'_>], owner: Option<&str>) {
        for property in properties(members) {
            let Some(name) = property_name(property, self.source) else {
                continue;
            };
            let Some(body) = literal_members(property) else {
                continue;
            };

            if owner == Some(TABLES_MEMBER) {
                if let Some(table) = self.table(name, body) {
                    self.tables.push(table);
                }
            }
            self.members(body, Some(name));
        }
    }

    fn table(&self, name: &str, body: &[TSSignature<'_>]) -> Option<TableSchema> {
        let columns = self.shape(body, ROW_MEMBER)?;
        let (insert, update) = match self.mode {
            ShapeMode::Unified => (None, None),
            ShapeMode::Distinct => (
                self.shape(body, INSERT_MEMBER),
                self.shape(body, UPDATE_MEMBER),
            ),
        };
        Some(TableSchema {
            name: name.to_string(),
            columns,
            insert,
            update,
            source: None,
        })
    }

    /// Columns of `<table>.<shape_name>` if it is a type literal
    fn shape(&self, table: &[TSSignature<'_>], shape_name: &str) -> Option<Columns> {
        let body = properties(table)
            .find(|property| property_name(property, self.source) == Some(shape_name))
            .and_then(literal_members)?;

        let mut columns = Columns::new();
        for property in properties(body) {
            let Some(name) = property_name(property, self.source) else {
                continue;
            };
            if columns.contains_key(name) {
                warn!(column = %name, shape = shape_name, "Duplicate column ignored");
                continue;
            }
            columns.insert(name.to_string(), self.column_type(property));
        }
        Some(columns)
    }

    fn column_type(&self, property: &TSPropertySignature<'_>) -> ColumnType {
        property
            .type_annotation
            .as_ref()
            .and_then(|annotation| slice(self.source, annotation.type_annotation.span()))
            .map_or(ColumnType::Unknown, |text| {
                ColumnType::Known(text.trim().to_string())
            })
    }
}

fn properties<'a, 'b>(
    members: &'b [TSSignature<'a>],
) -> impl Iterator<Item = &'b TSPropertySignature<'a>> {
    members.iter().filter_map(|member| match member {
        TSSignature::TSPropertySignature(property) => Some(&**property),
        _ => None,
    })
}

/// Members of the property's type when it is a type literal
fn literal_members<'a, 'b>(property: &'b TSPropertySignature<'a>) -> Option<&'b [TSSignature<'a>]> {
    match &property.type_annotation.as_ref()?.type_annotation {
        TSType::TSTypeLiteral(literal) => Some(&literal.members[..]),
        _ => None,
    }
}

/// Static name of a property key; computed keys have none
fn property_name<'s>(property: &TSPropertySignature<'_>, source: &'s str) -> Option<&'s str> {
    if property.computed {
        return None;
    }
    match &property.key {
        PropertyKey::StaticIdentifier(_) => slice(source, property.key.span()),
        PropertyKey::StringLiteral(literal) => {
            let quoted = slice(source, literal.span)?;
            quoted.get(1..quoted.len().checked_sub(1)?)
        }
        PropertyKey::NumericLiteral(literal) => slice(source, literal.span),
        _ => None,
    }
}

fn slice(source: &str, span: Span) -> Option<&str> {
    source.get(span.start as usize..span.end as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &Columns) -> Vec<&str> {
        columns.keys().map(String::as_str).collect()
    }

    fn tables(source: &str) -> Vec<TableSchema> {
        parse_tables(source, ShapeMode::Unified).unwrap()
    }

    #[test]
    fn test_generated_file_layout() {
        let source = r#"
export type Json =
  | string
  | number
  | boolean
  | null
  | { [key: string]: Json | undefined }
  | Json[]

export type Database = {
  // Allows to automatically instantiate createClient with right options
  __InternalSupabase: {
    PostgrestVersion: "12.2.3 (519615d)"
  }
  public: {
    Tables: {
      profiles: {
        Row: {
          id: string
          status: Database["public"]["Enums"]["user_status"]
          settings: Json | null
        }
        Insert: {
          id: string
          status?: Database["public"]["Enums"]["user_status"]
          settings?: Json | null
        }
        Update: {
          id?: string
        }
        Relationships: [
          {
            foreignKeyName: "profiles_id_fkey"
            columns: ["id"]
            isOneToOne: true
            referencedRelation: "users"
            referencedColumns: ["id"]
          },
        ]
      }
    }
    Views: {
      [_ in never]: never
    }
    Functions: {
      is_admin: { Args: { uid: string }; Returns: boolean }
    }
    Enums: {
      user_status: "active" | "banned"
    }
  }
}

type DefaultSchema = Database[Extract<keyof Database, "public">]

export type Tables<
  DefaultSchemaTableNameOrOptions extends
    | keyof (DefaultSchema["Tables"] & DefaultSchema["Views"])
    | { schema: keyof Database },
> = DefaultSchemaTableNameOrOptions extends { schema: keyof Database }
  ? Database[DefaultSchemaTableNameOrOptions["schema"]]["Tables"]
  : never

export const Constants = {
  public: {
    Enums: {
      user_status: ["active", "banned"],
    },
  },
} as const
"#;
        let found = tables(source);
        assert_eq!(found.len(), 1);
        let profiles = &found[0];
        assert_eq!(profiles.name, "profiles");
        assert_eq!(names(&profiles.columns), vec!["id", "status", "settings"]);
        assert_eq!(
            profiles.columns["status"].as_type_text(),
            r#"Database["public"]["Enums"]["user_status"]"#
        );
        assert_eq!(profiles.columns["settings"].as_type_text(), "Json | null");
    }

    #[test]
    fn test_interface_with_semicolons_and_comments() {
        let source = r"
/** Don't edit by hand; it's regenerated */
export interface Database {
  public: {
    Tables: {
      posts: {
        Row: {
          id: number; // primary key
          'title': string;
          readonly body?: string | null;
        };
      };
    };
  };
}
";
        let found = tables(source);
        assert_eq!(found.len(), 1);
        assert_eq!(names(&found[0].columns), vec!["id", "title", "body"]);
        assert_eq!(found[0].columns["body"].as_type_text(), "string | null");
    }

    #[test]
    fn test_keys_and_missing_annotations() {
        let source = r#"type A = { Tables: { t: { Row: { "display name": string; 0: boolean; [k: string]: unknown; legacy } } } }"#;
        let found = tables(source);
        assert_eq!(names(&found[0].columns), vec!["display name", "0", "legacy"]);
        assert_eq!(found[0].columns["legacy"], ColumnType::Unknown);
    }

    #[test]
    fn test_distinct_shapes_are_read() {
        let source = "type A = { Tables: { t: { Row: { a: string; b: number }; Insert: { a?: string } } } }";
        let found = parse_tables(source, ShapeMode::Distinct).unwrap();
        let table = &found[0];
        assert_eq!(names(table.insert_shape()), vec!["a"]);
        assert_eq!(table.update, None);
        assert_eq!(table.update_shape(), table.row());
    }

    #[test]
    fn test_generic_type_text_is_verbatim() {
        let source = "type A = { Tables: { t: { Row: { meta: Record<string, Json>; tags: string[] | null } } } }";
        let found = tables(source);
        assert_eq!(found[0].columns["meta"].as_type_text(), "Record<string, Json>");
        assert_eq!(found[0].columns["tags"].as_type_text(), "string[] | null");
    }

    #[test]
    fn test_error_position() {
        let error = parse_tables("type A = {\n  id: string\n  name: 'oops\n}", ShapeMode::Unified)
            .unwrap_err();
        assert_eq!(error.line, 3);
    }
}
