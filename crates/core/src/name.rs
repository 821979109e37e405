use std::fmt;

const SCHEMA_SEPARATOR: char = '.';

/// A table reference split into its schema and table parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub schema: String,
    pub table: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Splits `raw` on its first `.`; everything after it is the table, so
    /// `a.b.c` resolves to schema `a` and table `b.c`. Without a separator, or
    /// with an empty schema part, the schema is `default_schema`.
    ///
    /// No other validation happens here. An empty table name is passed through
    /// and surfaces later as a backend error.
    pub fn resolve(raw: &str, default_schema: &str) -> Self {
        match raw.split_once(SCHEMA_SEPARATOR) {
            Some((schema, table)) if !schema.is_empty() => Self::new(schema, table),
            Some((_, table)) => Self::new(default_schema, table),
            None => Self::new(default_schema, raw),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SCHEMA_SEPARATOR}{}", self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::QualifiedName;

    #[test]
    fn bare_name_takes_default_schema() {
        assert_eq!(
            QualifiedName::resolve("users", "public"),
            QualifiedName::new("public", "users")
        );
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(
            QualifiedName::resolve("a.b.c", "public"),
            QualifiedName::new("a", "b.c")
        );
    }

    #[test]
    fn empty_schema_part_falls_back_to_default() {
        assert_eq!(
            QualifiedName::resolve(".users", "main"),
            QualifiedName::new("main", "users")
        );
    }

    #[test]
    fn empty_input_is_not_rejected() {
        let name = QualifiedName::resolve("", "public");

        assert_eq!(name.schema, "public");
        assert!(name.table.is_empty());
    }

    #[test]
    fn display_joins_with_separator() {
        assert_eq!(QualifiedName::new("audit", "events").to_string(), "audit.events");
    }
}
