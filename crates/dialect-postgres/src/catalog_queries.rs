pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SHOW server_version";

// Enumerates the tables a bulk drop removes; `$1` is the schema name.
pub(crate) const TABLE_NAMES_QUERY: &str = r#"
SELECT tablename
FROM pg_catalog.pg_tables
WHERE schemaname = $1
ORDER BY tablename ASC;
"#;

pub(crate) fn information_schema_exists(schema_literal: &str, table_literal: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = {schema_literal} AND table_name = {table_literal})"
    )
}

pub(crate) fn pg_tables_exists(schema_literal: &str, table_literal: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_tables WHERE schemaname = {schema_literal} AND tablename = {table_literal})"
    )
}
