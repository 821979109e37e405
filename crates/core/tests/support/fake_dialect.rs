use std::io;

use schemaops_core::{
    Capabilities, CatalogSource, ConfigError, ConnectionConfig, DatabaseAdapter, DbValue, Dialect,
    RenderedStatement, Result,
};

#[allow(dead_code)]
pub const MULTI_LIST_TABLES_SQL: &str =
    "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = $1 ORDER BY tablename";
#[allow(dead_code)]
pub const SINGLE_LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name";

/// Schema-aware engine in the PostgreSQL mould.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiSchemaDialect;

/// Single-schema engine in the SQLite mould.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleSchemaDialect;

impl Dialect for MultiSchemaDialect {
    fn name(&self) -> &str {
        "multi"
    }

    fn default_schema(&self) -> &str {
        "public"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTI_SCHEMA
    }

    fn preferred_catalog(&self) -> CatalogSource {
        CatalogSource::InformationSchema
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn table_exists_sql(
        &self,
        catalog: CatalogSource,
        schema_literal: &str,
        table_literal: &str,
    ) -> Option<String> {
        Some(match catalog {
            CatalogSource::InformationSchema => format!(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = {schema_literal} AND table_name = {table_literal})"
            ),
            CatalogSource::Native => format!(
                "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_tables WHERE schemaname = {schema_literal} AND tablename = {table_literal})"
            ),
        })
    }

    fn list_tables(&self, schema: &str) -> RenderedStatement {
        RenderedStatement::new(MULTI_LIST_TABLES_SQL).with_params([DbValue::from(schema)])
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        Err(connect_unavailable(config))
    }
}

impl Dialect for SingleSchemaDialect {
    fn name(&self) -> &str {
        "single"
    }

    fn default_schema(&self) -> &str {
        "main"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE_SCHEMA
    }

    fn preferred_catalog(&self) -> CatalogSource {
        CatalogSource::Native
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn table_exists_sql(
        &self,
        catalog: CatalogSource,
        _schema_literal: &str,
        table_literal: &str,
    ) -> Option<String> {
        match catalog {
            CatalogSource::InformationSchema => None,
            CatalogSource::Native => Some(format!(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = {table_literal})"
            )),
        }
    }

    fn list_tables(&self, _schema: &str) -> RenderedStatement {
        RenderedStatement::new(SINGLE_LIST_TABLES_SQL)
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        Err(connect_unavailable(config))
    }
}

#[allow(dead_code)]
pub fn multi_exists_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = '{schema}' AND table_name = '{table}')"
    )
}

#[allow(dead_code)]
pub fn single_exists_sql(table: &str) -> String {
    format!("SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '{table}')")
}

fn connect_unavailable(config: &ConnectionConfig) -> schemaops_core::Error {
    ConfigError::Connect {
        dialect: "fake",
        database: config.database.clone(),
        source: Box::new(io::Error::other("fake dialects have no live connection")),
    }
    .into()
}
