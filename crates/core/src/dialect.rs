use crate::{ConnectionConfig, DatabaseAdapter, QualifiedName, RenderedStatement, Result};

/// Statement variants and catalog forms an engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Table references carry a schema part.
    pub schemas: bool,
    /// `DROP ... CASCADE` and `TRUNCATE ... CASCADE`.
    pub cascade: bool,
    pub truncate: bool,
    pub restart_identity: bool,
    /// `ALTER TABLE ... ADD CONSTRAINT`.
    pub add_constraint: bool,
    pub information_schema: bool,
}

impl Capabilities {
    /// PostgreSQL-like engines.
    pub const MULTI_SCHEMA: Self = Self {
        schemas: true,
        cascade: true,
        truncate: true,
        restart_identity: true,
        add_constraint: true,
        information_schema: true,
    };

    /// SQLite-like engines.
    pub const SINGLE_SCHEMA: Self = Self {
        schemas: false,
        cascade: false,
        truncate: false,
        restart_identity: false,
        add_constraint: false,
        information_schema: false,
    };
}

/// Where existence checks read table metadata from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// The standard `information_schema.tables` view.
    InformationSchema,
    /// The engine's own catalog, e.g. `pg_catalog.pg_tables` or `sqlite_master`.
    Native,
}

pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    fn default_schema(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Catalog used by existence-gated operations unless overridden.
    fn preferred_catalog(&self) -> CatalogSource;

    fn quote_ident(&self, ident: &str) -> String;

    /// `SELECT EXISTS (...)` against `catalog`, with both values already
    /// escaped as literals. `None` when the engine has no such catalog.
    fn table_exists_sql(
        &self,
        catalog: CatalogSource,
        schema_literal: &str,
        table_literal: &str,
    ) -> Option<String>;

    /// Query returning one table name per row for `schema`.
    fn list_tables(&self, schema: &str) -> RenderedStatement;

    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>>;

    fn resolve(&self, raw: &str) -> QualifiedName {
        QualifiedName::resolve(raw, self.default_schema())
    }

    /// Renders a resolved name as it appears in DDL. Identifiers are not
    /// quoted.
    fn qualify(&self, name: &QualifiedName) -> String {
        if self.capabilities().schemas {
            format!("{}.{}", name.schema, name.table)
        } else {
            name.table.clone()
        }
    }
}
