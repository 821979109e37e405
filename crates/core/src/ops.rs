use tracing::{debug, info, warn};

use crate::{
    CatalogSource, DatabaseAdapter, DbValue, Dialect, ExecContext, ExistenceChecker, ForeignKey,
    ObjectContext, OperationIntent, OperationKind, QualifiedName, RenderedStatement, Result,
    ScanError, StatementBuilder,
};

/// What an existence-gated batch does when one of its tables is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTablePolicy {
    /// Return success at the first absent table without touching the names
    /// after it.
    #[default]
    StopBatch,
    /// Skip the absent table and carry on with the rest of the batch.
    SkipAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpsOptions {
    /// Catalog for existence checks; `None` uses the dialect's preference.
    pub catalog: Option<CatalogSource>,
    pub missing_table: MissingTablePolicy,
}

/// Entry points for schema maintenance on one connection.
///
/// Every batch runs in caller order and stops at the first error. Nothing is
/// wrapped in a transaction, so statements that already ran stay applied.
pub struct SchemaOps<'a> {
    dialect: &'a dyn Dialect,
    adapter: &'a dyn DatabaseAdapter,
    options: OpsOptions,
}

impl<'a> SchemaOps<'a> {
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect, adapter: &'a dyn DatabaseAdapter) -> Self {
        Self {
            dialect,
            adapter,
            options: OpsOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: OpsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> OpsOptions {
        self.options
    }

    /// `DROP TABLE IF EXISTS ... CASCADE` for each name. Absent tables are
    /// not an error.
    pub fn drop_tables(&self, ctx: &ExecContext, names: &[&str]) -> Result<()> {
        let builder = self.builder();
        for raw in names {
            let name = self.dialect.resolve(raw);
            let statement = builder.drop_table(&name);
            self.submit(ctx, &statement, self.object(OperationKind::DropTable, &name))?;
        }
        Ok(())
    }

    pub fn delete_all(&self, ctx: &ExecContext, names: &[&str]) -> Result<()> {
        self.run_existence_gated(
            ctx,
            OperationKind::DeleteAll,
            OperationIntent::DeleteAll,
            names,
        )
    }

    pub fn truncate_cascade(&self, ctx: &ExecContext, names: &[&str]) -> Result<()> {
        self.run_existence_gated(
            ctx,
            OperationKind::TruncateCascade,
            OperationIntent::TruncateCascade,
            names,
        )
    }

    pub fn truncate_cascade_restart_identity(
        &self,
        ctx: &ExecContext,
        names: &[&str],
    ) -> Result<()> {
        self.run_existence_gated(
            ctx,
            OperationKind::TruncateCascadeRestartIdentity,
            OperationIntent::TruncateCascadeRestartIdentity,
            names,
        )
    }

    pub fn create_index(&self, ctx: &ExecContext, table: &str, fields: &[&str]) -> Result<()> {
        let statement = self.builder().create_index(table, fields);
        self.submit(
            ctx,
            &statement,
            ObjectContext::new(OperationKind::CreateIndex, None, table),
        )
    }

    /// One index per field list, stopping at the first failure.
    pub fn create_indexes(
        &self,
        ctx: &ExecContext,
        table: &str,
        field_sets: &[&[&str]],
    ) -> Result<()> {
        for fields in field_sets {
            self.create_index(ctx, table, fields)?;
        }
        Ok(())
    }

    /// Not idempotent: fails if the constraint already exists.
    pub fn add_foreign_key_cascade_delete(
        &self,
        ctx: &ExecContext,
        foreign_key: &ForeignKey,
    ) -> Result<()> {
        let statement = self.builder().add_foreign_key_cascade_delete(foreign_key)?;
        self.submit(
            ctx,
            &statement,
            ObjectContext::new(
                OperationKind::AddForeignKeyCascadeDelete,
                None,
                foreign_key.table.as_str(),
            ),
        )
    }

    /// Drops every table of `schemas` (the default schema when empty).
    ///
    /// All schemas are enumerated before the first drop. A failure part way
    /// through leaves the earlier drops in place.
    pub fn drop_all_tables(&self, ctx: &ExecContext, schemas: &[&str]) -> Result<()> {
        let default_schema = [self.dialect.default_schema()];
        // Single-schema engines list the same tables whatever schema is named.
        let schemas = if schemas.is_empty() || !self.dialect.capabilities().schemas {
            &default_schema[..]
        } else {
            schemas
        };

        let mut listed = Vec::new();
        for schema in schemas {
            listed.extend(self.list_tables(ctx, schema)?);
        }
        debug!(
            schemas = ?schemas,
            tables = listed.len(),
            "dropping all listed tables"
        );

        let builder = self.builder();
        for name in &listed {
            let statement = builder.drop_listed_table(&name.schema, &name.table);
            self.submit(ctx, &statement, self.object(OperationKind::DropAllInSchema, name))?;
        }
        Ok(())
    }

    pub fn table_exists(&self, ctx: &ExecContext, raw: &str) -> Result<bool> {
        self.table_exists_in(ctx, raw, self.catalog())
    }

    pub fn table_exists_in(
        &self,
        ctx: &ExecContext,
        raw: &str,
        catalog: CatalogSource,
    ) -> Result<bool> {
        ctx.ensure_active()?;
        let name = self.dialect.resolve(raw);
        ExistenceChecker::new(self.dialect, self.adapter, catalog).exists(ctx, &name)
    }

    fn run_existence_gated(
        &self,
        ctx: &ExecContext,
        operation: OperationKind,
        intent: fn(QualifiedName) -> OperationIntent,
        names: &[&str],
    ) -> Result<()> {
        let builder = self.builder();
        builder.ensure_supported(operation)?;

        let checker = ExistenceChecker::new(self.dialect, self.adapter, self.catalog());
        let escape = |value: &str| self.adapter.escape_literal(value);

        for (position, raw) in names.iter().enumerate() {
            let name = self.dialect.resolve(raw);
            ctx.ensure_active()?;

            if !checker.exists(ctx, &name)? {
                match self.options.missing_table {
                    MissingTablePolicy::StopBatch => {
                        let remaining = &names[position + 1..];
                        if remaining.is_empty() {
                            info!(operation = %operation, table = %name, "table missing; skipped");
                        } else {
                            warn!(
                                operation = %operation,
                                table = %name,
                                not_processed = ?remaining,
                                "table missing; stopping batch"
                            );
                        }
                        return Ok(());
                    }
                    MissingTablePolicy::SkipAndContinue => {
                        info!(operation = %operation, table = %name, "table missing; skipped");
                        continue;
                    }
                }
            }

            let object = self.object(operation, &name);
            let statement = builder.build(&intent(name), &escape)?;
            self.submit(ctx, &statement, object)?;
        }
        Ok(())
    }

    fn list_tables(&self, ctx: &ExecContext, schema: &str) -> Result<Vec<QualifiedName>> {
        ctx.ensure_active()?;
        let statement = self.dialect.list_tables(schema);
        debug!(schema, sql = statement.sql(), "listing tables");

        let mut tables = Vec::new();
        self.adapter
            .query(
                ctx,
                statement.sql(),
                statement.params(),
                &mut |row: &[DbValue]| {
                    let value = row.first().unwrap_or(&DbValue::Null);
                    let table = value.as_str().ok_or(ScanError::TypeMismatch {
                        target: "table name",
                        found: value.type_name(),
                    })?;
                    tables.push(QualifiedName::new(schema, table));
                    Ok(())
                },
            )
            .map_err(|error| {
                error.with_object(ObjectContext::new(
                    OperationKind::DropAllInSchema,
                    Some(schema),
                    "*",
                ))
            })?;
        Ok(tables)
    }

    fn submit(
        &self,
        ctx: &ExecContext,
        statement: &RenderedStatement,
        object: ObjectContext,
    ) -> Result<()> {
        ctx.ensure_active()?;
        debug!(
            operation = %object.operation,
            schema = object.schema.as_deref(),
            table = %object.table,
            sql = statement.sql(),
            "submitting statement"
        );

        self.adapter
            .execute(ctx, statement.sql(), statement.params())
            .map(|_| ())
            .map_err(|error| error.with_object(object))
    }

    fn object(&self, operation: OperationKind, name: &QualifiedName) -> ObjectContext {
        let schema = self
            .dialect
            .capabilities()
            .schemas
            .then_some(name.schema.as_str());
        ObjectContext::new(operation, schema, name.table.as_str())
    }

    fn catalog(&self) -> CatalogSource {
        self.options
            .catalog
            .unwrap_or_else(|| self.dialect.preferred_catalog())
    }

    fn builder(&self) -> StatementBuilder<'a> {
        StatementBuilder::new(self.dialect)
    }
}
