//! Template file contents
//!
//! Every template starts with the connection bootstrap and receives the same
//! context:
//!
//! - `bootstrap`: import and client construction
//! - `type_name`: capitalized singular table name (`Post`)
//! - `list_name`: capitalized table name (`Posts`)
//! - `table_literal`: quoted table name for `.from(..)`
//! - `table_label`: table name inside error messages
//! - `primary_key_literal` / `id_type`: row addressing
//! - `declarations` / `payload`: input shape and insert/update body
//! - `has_order` / `order_literal`: list ordering

/// Insert one row
pub const CREATE: &str = r"{{bootstrap}}

export interface Create{{type_name}}Input {
{{declarations}}
}

export async function create{{type_name}}(input: Create{{type_name}}Input) {
  const { data, error } = await supabase
    .from({{table_literal}})
    .insert({
{{payload}}
    })
    .select();

  if (error) {
    throw new Error(`Error creating {{table_label}}: ${error.message}`);
  }

  return data;
}
";

/// Fetch one row by primary key
pub const READ: &str = r"{{bootstrap}}

export async function read{{type_name}}(id: {{id_type}}) {
  const { data, error } = await supabase
    .from({{table_literal}})
    .select('*')
    .eq({{primary_key_literal}}, id)
    .single();

  if (error) {
    throw new Error(`Error reading {{table_label}}: ${error.message}`);
  }

  return data;
}
";

/// Update one row by primary key
pub const UPDATE: &str = r"{{bootstrap}}

export interface Update{{type_name}}Input {
{{declarations}}
}

export async function update{{type_name}}(id: {{id_type}}, input: Update{{type_name}}Input) {
  const { data, error } = await supabase
    .from({{table_literal}})
    .update({
{{payload}}
    })
    .eq({{primary_key_literal}}, id)
    .select();

  if (error) {
    throw new Error(`Error updating {{table_label}}: ${error.message}`);
  }

  return data;
}
";

/// Delete one row by primary key
pub const DELETE: &str = r"{{bootstrap}}

export async function delete{{type_name}}(id: {{id_type}}) {
  const { error } = await supabase
    .from({{table_literal}})
    .delete()
    .eq({{primary_key_literal}}, id);

  if (error) {
    throw new Error(`Error deleting {{table_label}}: ${error.message}`);
  }

  return { success: true };
}
";

/// Fetch every row
pub const LIST: &str = r"{{bootstrap}}

export async function list{{list_name}}() {
  const { data, error } = await supabase
    .from({{table_literal}})
    .select('*'){{#if has_order}}
    .order({{order_literal}}, { ascending: true }){{/if}};

  if (error) {
    throw new Error(`Error listing {{table_label}}: ${error.message}`);
  }

  return data;
}
";
