use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::OperationKind;

pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The object an operation was acting on when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContext {
    pub operation: OperationKind,
    pub schema: Option<String>,
    pub table: String,
}

impl ObjectContext {
    pub fn new(operation: OperationKind, schema: Option<&str>, table: impl Into<String>) -> Self {
        Self {
            operation,
            schema: schema.map(str::to_string),
            table: table.into(),
        }
    }
}

impl fmt::Display for ObjectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{} {}.{}", self.operation, schema, self.table),
            None => write!(f, "{} {}", self.operation, self.table),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query failed (object={}): {source}; sql={sql}", render_context(.context))]
    Failed {
        sql: String,
        context: Option<Box<ObjectContext>>,
        source: BoxedError,
    },
    #[error("query returned no rows (object={}); sql={sql}", render_context(.context))]
    NoRows {
        sql: String,
        context: Option<Box<ObjectContext>>,
    },
}

impl QueryError {
    pub fn failed<E>(sql: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failed {
            sql: sql.into(),
            context: None,
            source: Box::new(source),
        }
    }

    pub fn no_rows(sql: impl Into<String>) -> Self {
        Self::NoRows {
            sql: sql.into(),
            context: None,
        }
    }

    pub fn sql(&self) -> &str {
        match self {
            Self::Failed { sql, .. } | Self::NoRows { sql, .. } => sql,
        }
    }

    pub fn context(&self) -> Option<&ObjectContext> {
        match self {
            Self::Failed { context, .. } | Self::NoRows { context, .. } => context.as_deref(),
        }
    }

    fn with_context(self, object: ObjectContext) -> Self {
        match self {
            Self::Failed { sql, source, .. } => Self::Failed {
                sql,
                context: Some(Box::new(object)),
                source,
            },
            Self::NoRows { sql, .. } => Self::NoRows {
                sql,
                context: Some(Box::new(object)),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("statement failed (object={}): {source}; sql={sql}", render_context(.context))]
    StatementFailed {
        sql: String,
        context: Option<Box<ObjectContext>>,
        source: BoxedError,
    },
}

impl ExecutionError {
    pub fn statement_failed<E>(sql: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::StatementFailed {
            sql: sql.into(),
            context: None,
            source: Box::new(source),
        }
    }

    pub fn sql(&self) -> &str {
        match self {
            Self::StatementFailed { sql, .. } => sql,
        }
    }

    pub fn context(&self) -> Option<&ObjectContext> {
        match self {
            Self::StatementFailed { context, .. } => context.as_deref(),
        }
    }

    fn with_context(self, object: ObjectContext) -> Self {
        match self {
            Self::StatementFailed { sql, source, .. } => Self::StatementFailed {
                sql,
                context: Some(Box::new(object)),
                source,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("operation `{operation}` is not supported by dialect `{dialect}`")]
    UnsupportedOperation {
        operation: OperationKind,
        dialect: String,
    },
}

/// Failures decoding a raw database value into a nullable wrapper.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot parse {target} from `{value}`: {source}")]
    Format {
        target: &'static str,
        value: String,
        source: BoxedError,
    },
    #[error("cannot scan type `{found}` into {target}")]
    TypeMismatch {
        target: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to connect to {dialect} database `{database}`: {source}")]
    Connect {
        dialect: &'static str,
        database: String,
        source: BoxedError,
    },
    #[error("failed to parse {dialect} server version string: `{raw}`")]
    InvalidVersion { dialect: &'static str, raw: String },
    #[error("{dialect} server version `{raw}` is not supported; requires {minimum}+")]
    UnsupportedVersion {
        dialect: &'static str,
        raw: String,
        minimum: String,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Attaches the operation and target object to query and execution
    /// failures. Other variants are returned unchanged.
    #[must_use]
    pub fn with_object(self, object: ObjectContext) -> Self {
        match self {
            Self::Query(error) => Self::Query(error.with_context(object)),
            Self::Execute(error) => Self::Execute(error.with_context(object)),
            other => other,
        }
    }

    pub fn object_context(&self) -> Option<&ObjectContext> {
        match self {
            Self::Query(error) => error.context(),
            Self::Execute(error) => error.context(),
            _ => None,
        }
    }
}

fn render_context(context: &Option<Box<ObjectContext>>) -> String {
    context
        .as_deref()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}
