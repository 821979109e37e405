mod adapter;
mod catalog_queries;

use schemaops_core::{
    Capabilities, CatalogSource, ConnectionConfig, DatabaseAdapter, Dialect, RenderedStatement,
    Result,
};

/// SQLite has no schemas; the attached main database stands in for one.
const DEFAULT_SCHEMA: &str = "main";

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

pub fn table_names_query() -> &'static str {
    catalog_queries::TABLE_NAMES_QUERY
}

pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn default_schema(&self) -> &str {
        DEFAULT_SCHEMA
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE_SCHEMA
    }

    fn preferred_catalog(&self) -> CatalogSource {
        CatalogSource::Native
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_identifier(ident)
    }

    fn table_exists_sql(
        &self,
        catalog: CatalogSource,
        _schema_literal: &str,
        table_literal: &str,
    ) -> Option<String> {
        match catalog {
            CatalogSource::InformationSchema => None,
            CatalogSource::Native => Some(catalog_queries::sqlite_master_exists(table_literal)),
        }
    }

    fn list_tables(&self, _schema: &str) -> RenderedStatement {
        RenderedStatement::new(catalog_queries::TABLE_NAMES_QUERY)
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }
}
