use crate::{
    CatalogSource, Dialect, ForeignKey, GenerateError, OperationIntent, OperationKind,
    QualifiedName, RenderedStatement, Result,
};

/// Renders operation intents into SQL for one dialect.
///
/// Caller-supplied identifiers (schemas, tables, fields) are inlined
/// unquoted and must come from trusted code. Only value literals go through
/// the `escape` callback.
pub struct StatementBuilder<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> StatementBuilder<'a> {
    #[must_use]
    pub const fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn build(
        &self,
        intent: &OperationIntent,
        escape: &dyn Fn(&str) -> String,
    ) -> Result<RenderedStatement> {
        match intent {
            OperationIntent::DropTable(name) => Ok(self.drop_table(name)),
            OperationIntent::DeleteAll(name) => Ok(self.delete_all(name)),
            OperationIntent::TruncateCascade(name) => self.truncate_cascade(name, false),
            OperationIntent::TruncateCascadeRestartIdentity(name) => {
                self.truncate_cascade(name, true)
            }
            OperationIntent::CreateIndex { table, fields } => Ok(self.create_index(table, fields)),
            OperationIntent::AddForeignKeyCascadeDelete(foreign_key) => {
                self.add_foreign_key_cascade_delete(foreign_key)
            }
            OperationIntent::DropAllInSchema { schema } => Ok(self.dialect.list_tables(schema)),
            OperationIntent::ExistenceCheck { name, catalog } => {
                self.table_exists(name, *catalog, escape)
            }
        }
    }

    /// Fails when the dialect cannot express `operation` at all.
    pub fn ensure_supported(&self, operation: OperationKind) -> Result<()> {
        let capabilities = self.dialect.capabilities();
        let supported = match operation {
            OperationKind::TruncateCascade => capabilities.truncate,
            OperationKind::TruncateCascadeRestartIdentity => {
                capabilities.truncate && capabilities.restart_identity
            }
            OperationKind::AddForeignKeyCascadeDelete => capabilities.add_constraint,
            _ => true,
        };

        if supported {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }

    pub fn drop_table(&self, name: &QualifiedName) -> RenderedStatement {
        let target = self.dialect.qualify(name);
        RenderedStatement::new(self.with_cascade(format!("DROP TABLE IF EXISTS {target}")))
    }

    pub fn delete_all(&self, name: &QualifiedName) -> RenderedStatement {
        RenderedStatement::new(format!("DELETE FROM {}", self.dialect.qualify(name)))
    }

    pub fn truncate_cascade(
        &self,
        name: &QualifiedName,
        restart_identity: bool,
    ) -> Result<RenderedStatement> {
        let operation = if restart_identity {
            OperationKind::TruncateCascadeRestartIdentity
        } else {
            OperationKind::TruncateCascade
        };
        self.ensure_supported(operation)?;

        let target = self.dialect.qualify(name);
        let sql = if restart_identity {
            format!("TRUNCATE TABLE {target} RESTART IDENTITY CASCADE")
        } else {
            format!("TRUNCATE TABLE {target} CASCADE")
        };
        Ok(RenderedStatement::new(sql))
    }

    /// `CREATE INDEX IF NOT EXISTS <table>_<f1>_<f2>_idx ON <table> (<f1>,<f2>)`
    pub fn create_index<S>(&self, table: &str, fields: &[S]) -> RenderedStatement
    where
        S: AsRef<str>,
    {
        let fields = fields.iter().map(AsRef::as_ref).collect::<Vec<_>>();
        RenderedStatement::new(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {table} ({})",
            index_name(table, &fields),
            fields.join(",")
        ))
    }

    pub fn add_foreign_key_cascade_delete(
        &self,
        foreign_key: &ForeignKey,
    ) -> Result<RenderedStatement> {
        self.ensure_supported(OperationKind::AddForeignKeyCascadeDelete)?;

        Ok(RenderedStatement::new(format!(
            "ALTER TABLE {table} ADD CONSTRAINT {constraint} FOREIGN KEY ({field}) REFERENCES {ref_table}({ref_field}) ON DELETE CASCADE",
            table = foreign_key.table,
            constraint = foreign_key.constraint_name(),
            field = foreign_key.field,
            ref_table = foreign_key.ref_table,
            ref_field = foreign_key.ref_field,
        )))
    }

    /// Second phase of a bulk drop. `table` was read back from the catalog,
    /// so unlike caller-supplied names it is quoted.
    pub fn drop_listed_table(&self, schema: &str, table: &str) -> RenderedStatement {
        let target = if self.dialect.capabilities().schemas {
            format!(
                "{}.{}",
                self.dialect.quote_ident(schema),
                self.dialect.quote_ident(table)
            )
        } else {
            self.dialect.quote_ident(table)
        };
        RenderedStatement::new(self.with_cascade(format!("DROP TABLE IF EXISTS {target}")))
    }

    pub fn table_exists(
        &self,
        name: &QualifiedName,
        catalog: CatalogSource,
        escape: &dyn Fn(&str) -> String,
    ) -> Result<RenderedStatement> {
        let schema_literal = escape(&name.schema);
        let table_literal = escape(&name.table);
        let sql = self
            .dialect
            .table_exists_sql(catalog, &schema_literal, &table_literal)
            .ok_or_else(|| self.unsupported(OperationKind::ExistenceCheck))?;

        let literals = if self.dialect.capabilities().schemas {
            vec![schema_literal, table_literal]
        } else {
            vec![table_literal]
        };
        Ok(RenderedStatement::new(sql).with_literals(literals))
    }

    fn with_cascade(&self, mut sql: String) -> String {
        if self.dialect.capabilities().cascade {
            sql.push_str(" CASCADE");
        }
        sql
    }

    fn unsupported(&self, operation: OperationKind) -> crate::Error {
        GenerateError::UnsupportedOperation {
            operation,
            dialect: self.dialect.name().to_string(),
        }
        .into()
    }
}

/// Index names are derived from the table and field list only, so two calls
/// with the same fields always name the same index.
pub fn index_name(table: &str, fields: &[&str]) -> String {
    format!("{table}_{}_idx", fields.join("_"))
}

#[cfg(test)]
mod tests {
    use super::index_name;

    #[test]
    fn index_name_joins_fields_with_underscore() {
        assert_eq!(index_name("users", &["email"]), "users_email_idx");
        assert_eq!(
            index_name("orders", &["user_id", "created_at"]),
            "orders_user_id_created_at_idx"
        );
    }
}
