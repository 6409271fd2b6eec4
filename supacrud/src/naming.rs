//! Identifier helpers for code generation
//!
//! Table names arrive exactly as they are declared in the database types. The
//! generated modules need a few derived forms of that name: the singular used in
//! function names, the capitalized form used in type names and the lowercased form
//! used as the output directory.

/// Naming helpers used by the template generator
pub struct NamingHelpers;

impl NamingHelpers {
    /// Singularize a table name
    ///
    /// A trailing `ies` becomes `y`, otherwise a single trailing `s` is dropped.
    /// Anything else is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::singularize("posts"), "post");
    /// assert_eq!(NamingHelpers::singularize("categories"), "category");
    /// assert_eq!(NamingHelpers::singularize("data"), "data");
    /// ```
    ///
    /// # Note
    ///
    /// This is a suffix heuristic, not an inflector. Words that end in `s` in their
    /// singular form lose it: `status` becomes `statu`.
    #[must_use]
    pub fn singularize(input: &str) -> String {
        if let Some(stem) = input.strip_suffix("ies") {
            format!("{stem}y")
        } else if let Some(stem) = input.strip_suffix('s') {
            stem.to_string()
        } else {
            input.to_string()
        }
    }

    /// Uppercase the first character and leave the rest untouched
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::capitalize("posts"), "Posts");
    /// assert_eq!(NamingHelpers::capitalize("user_profiles"), "User_profiles");
    /// assert_eq!(NamingHelpers::capitalize(""), "");
    /// ```
    #[must_use]
    pub fn capitalize(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    /// Singular, capitalized form used in type and function names
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::to_type_name("categories"), "Category");
    /// ```
    #[must_use]
    pub fn to_type_name(table: &str) -> String {
        Self::capitalize(&Self::singularize(table))
    }

    /// Directory name for a table's generated files
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::to_directory_name("UserProfiles"), "userprofiles");
    /// ```
    #[must_use]
    pub fn to_directory_name(table: &str) -> String {
        table.to_lowercase()
    }

    /// Whether `name` can be used as a bare TypeScript property name
    #[must_use]
    pub fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    /// Property key as it should appear in an object or interface body
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::to_property_key("title"), "title");
    /// assert_eq!(NamingHelpers::to_property_key("first name"), "'first name'");
    /// ```
    #[must_use]
    pub fn to_property_key(name: &str) -> String {
        if Self::is_identifier(name) {
            name.to_string()
        } else {
            Self::to_string_literal(name)
        }
    }

    /// Member access expression on `target`
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::to_property_access("input", "title"), "input.title");
    /// assert_eq!(NamingHelpers::to_property_access("input", "first name"), "input['first name']");
    /// ```
    #[must_use]
    pub fn to_property_access(target: &str, name: &str) -> String {
        if Self::is_identifier(name) {
            format!("{target}.{name}")
        } else {
            format!("{target}[{}]", Self::to_string_literal(name))
        }
    }

    /// Single-quoted TypeScript string literal
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::NamingHelpers;
    /// assert_eq!(NamingHelpers::to_string_literal("it's"), r"'it\'s'");
    /// ```
    #[must_use]
    pub fn to_string_literal(value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => out.push(c),
            }
        }
        out.push('\'');
        out
    }
}
