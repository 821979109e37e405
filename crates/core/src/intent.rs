use std::fmt;

use crate::{CatalogSource, QualifiedName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    DropTable,
    DeleteAll,
    TruncateCascade,
    TruncateCascadeRestartIdentity,
    CreateIndex,
    AddForeignKeyCascadeDelete,
    DropAllInSchema,
    ExistenceCheck,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DropTable => "drop_table",
            Self::DeleteAll => "delete_all",
            Self::TruncateCascade => "truncate_cascade",
            Self::TruncateCascadeRestartIdentity => "truncate_cascade_restart_identity",
            Self::CreateIndex => "create_index",
            Self::AddForeignKeyCascadeDelete => "add_foreign_key_cascade_delete",
            Self::DropAllInSchema => "drop_all_in_schema",
            Self::ExistenceCheck => "existence_check",
        }
    }

    /// Operations whose statement has no `IF EXISTS` guard and therefore must
    /// be preceded by a catalog lookup.
    pub const fn is_existence_gated(self) -> bool {
        matches!(
            self,
            Self::DeleteAll | Self::TruncateCascade | Self::TruncateCascadeRestartIdentity
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `ALTER TABLE <table> ADD CONSTRAINT ... REFERENCES <ref_table>(<ref_field>)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub field: String,
    pub ref_table: String,
    pub ref_field: String,
}

impl ForeignKey {
    pub fn new(
        table: impl Into<String>,
        field: impl Into<String>,
        ref_table: impl Into<String>,
        ref_field: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            ref_table: ref_table.into(),
            ref_field: ref_field.into(),
        }
    }

    pub fn constraint_name(&self) -> String {
        format!("{}_{}_fkey", self.table, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationIntent {
    DropTable(QualifiedName),
    DeleteAll(QualifiedName),
    TruncateCascade(QualifiedName),
    TruncateCascadeRestartIdentity(QualifiedName),
    CreateIndex { table: String, fields: Vec<String> },
    AddForeignKeyCascadeDelete(ForeignKey),
    /// Renders the enumeration query of a bulk drop; the per-table drops are
    /// produced from its result rows.
    DropAllInSchema { schema: String },
    ExistenceCheck {
        name: QualifiedName,
        catalog: CatalogSource,
    },
}

impl OperationIntent {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::DropTable(_) => OperationKind::DropTable,
            Self::DeleteAll(_) => OperationKind::DeleteAll,
            Self::TruncateCascade(_) => OperationKind::TruncateCascade,
            Self::TruncateCascadeRestartIdentity(_) => {
                OperationKind::TruncateCascadeRestartIdentity
            }
            Self::CreateIndex { .. } => OperationKind::CreateIndex,
            Self::AddForeignKeyCascadeDelete(_) => OperationKind::AddForeignKeyCascadeDelete,
            Self::DropAllInSchema { .. } => OperationKind::DropAllInSchema,
            Self::ExistenceCheck { .. } => OperationKind::ExistenceCheck,
        }
    }
}
