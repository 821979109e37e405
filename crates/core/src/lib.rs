//! Qualified-name resolution and DDL synthesis for schema maintenance in
//! tests and tooling.
//!
//! A [`SchemaOps`] resolves raw `schema.table` references, gates destructive
//! statements on catalog lookups, renders dialect-specific SQL through a
//! [`StatementBuilder`] and submits it to a [`DatabaseAdapter`].

mod adapter;
mod builder;
mod config;
mod context;
mod dialect;
mod error;
mod exists;
mod intent;
mod name;
mod ops;
mod scan;
mod statement;
mod value;

pub use adapter::{DatabaseAdapter, RowHandler, quote_string_literal};
pub use builder::{StatementBuilder, index_name};
pub use config::{ConnectionConfig, Version};
pub use context::{CancelHandle, ExecContext};
pub use dialect::{Capabilities, CatalogSource, Dialect};
pub use error::{
    BoxedError, ConfigError, Error, ExecutionError, GenerateError, ObjectContext, QueryError,
    Result, ScanError,
};
pub use exists::ExistenceChecker;
pub use intent::{ForeignKey, OperationIntent, OperationKind};
pub use name::QualifiedName;
pub use ops::{MissingTablePolicy, OpsOptions, SchemaOps};
pub use scan::{FromDbValue, NullBytes, NullUuid, Nullable};
pub use statement::RenderedStatement;
pub use value::DbValue;
