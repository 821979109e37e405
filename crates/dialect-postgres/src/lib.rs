mod adapter;
mod array;
mod catalog_queries;
mod quote;

use schemaops_core::{
    Capabilities, CatalogSource, ConnectionConfig, DatabaseAdapter, DbValue, Dialect,
    RenderedStatement, Result,
};

pub use array::parse_string_array;
pub use quote::{escape_literal, quote_identifier};

const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

pub fn table_names_query() -> &'static str {
    catalog_queries::TABLE_NAMES_QUERY
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn default_schema(&self) -> &str {
        DEFAULT_SCHEMA
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTI_SCHEMA
    }

    fn preferred_catalog(&self) -> CatalogSource {
        CatalogSource::InformationSchema
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_identifier(ident)
    }

    fn table_exists_sql(
        &self,
        catalog: CatalogSource,
        schema_literal: &str,
        table_literal: &str,
    ) -> Option<String> {
        Some(match catalog {
            CatalogSource::InformationSchema => {
                catalog_queries::information_schema_exists(schema_literal, table_literal)
            }
            CatalogSource::Native => {
                catalog_queries::pg_tables_exists(schema_literal, table_literal)
            }
        })
    }

    fn list_tables(&self, schema: &str) -> RenderedStatement {
        RenderedStatement::new(catalog_queries::TABLE_NAMES_QUERY)
            .with_params([DbValue::from(schema)])
    }

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(config)
    }
}
