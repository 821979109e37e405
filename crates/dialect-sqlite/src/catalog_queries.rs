pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SELECT sqlite_version()";

// Internal tables such as `sqlite_sequence` cannot be dropped.
pub(crate) const TABLE_NAMES_QUERY: &str = r#"
SELECT name
FROM sqlite_master
WHERE type = 'table'
  AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name ASC;
"#;

// Table identifiers resolve case-insensitively in SQLite.
pub(crate) fn sqlite_master_exists(table_literal: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = {table_literal} COLLATE NOCASE)"
    )
}
