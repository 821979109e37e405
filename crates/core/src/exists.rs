use tracing::debug;

use crate::{
    CatalogSource, DatabaseAdapter, DbValue, Dialect, ExecContext, ObjectContext, OperationKind,
    QualifiedName, Result, ScanError, StatementBuilder,
};

/// Read-only catalog lookup answering whether a table exists.
pub struct ExistenceChecker<'a> {
    dialect: &'a dyn Dialect,
    adapter: &'a dyn DatabaseAdapter,
    catalog: CatalogSource,
}

impl<'a> ExistenceChecker<'a> {
    #[must_use]
    pub fn new(
        dialect: &'a dyn Dialect,
        adapter: &'a dyn DatabaseAdapter,
        catalog: CatalogSource,
    ) -> Self {
        Self {
            dialect,
            adapter,
            catalog,
        }
    }

    pub fn exists(&self, ctx: &ExecContext, name: &QualifiedName) -> Result<bool> {
        let escape = |value: &str| self.adapter.escape_literal(value);
        let statement =
            StatementBuilder::new(self.dialect).table_exists(name, self.catalog, &escape)?;

        debug!(
            schema = %name.schema,
            table = %name.table,
            catalog = ?self.catalog,
            sql = statement.sql(),
            "checking table existence"
        );

        let mut exists = None;
        self.adapter
            .query_row(
                ctx,
                statement.sql(),
                statement.params(),
                &mut |row: &[DbValue]| {
                    let value = row.first().unwrap_or(&DbValue::Null);
                    exists = Some(value.as_bool().ok_or(ScanError::TypeMismatch {
                        target: "bool",
                        found: value.type_name(),
                    })?);
                    Ok(())
                },
            )
            .map_err(|error| error.with_object(self.object_context(name)))?;

        Ok(exists.unwrap_or(false))
    }

    fn object_context(&self, name: &QualifiedName) -> ObjectContext {
        let schema = self
            .dialect
            .capabilities()
            .schemas
            .then_some(name.schema.as_str());
        ObjectContext::new(OperationKind::ExistenceCheck, schema, name.table.as_str())
    }
}
