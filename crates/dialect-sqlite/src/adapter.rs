use std::{
    io,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{
    Connection, params_from_iter,
    types::{Value, ValueRef},
};
use schemaops_core::{
    ConfigError, ConnectionConfig, DatabaseAdapter, DbValue, ExecContext, ExecutionError,
    QueryError, Result, RowHandler, Version, quote_string_literal,
};
use tracing::debug;

use crate::catalog_queries;

const DIALECT_NAME: &str = "sqlite";
const MINIMUM_SQLITE_VERSION: Version = Version::new(3, 8, 0);
const SERVER_VERSION_OVERRIDE_KEY: &str = "sqlite.server_version";
const POISONED_CONNECTION_MESSAGE: &str = "sqlite connection state was poisoned";

pub(crate) struct SqliteAdapter {
    connection: Mutex<Connection>,
    server_version: Version,
}

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        ensure_minimum_version(raw_version)?;
    }

    let connection = Connection::open(config.database.as_str()).map_err(|source| {
        ConfigError::Connect {
            dialect: DIALECT_NAME,
            database: config.database.clone(),
            source: Box::new(source),
        }
    })?;

    let server_version_raw =
        if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
            raw_version.clone()
        } else {
            query_server_version(&connection)?
        };
    let server_version = ensure_minimum_version(&server_version_raw)?;
    debug!(
        database = %config.database,
        version = %server_version,
        "opened sqlite database"
    );

    Ok(Box::new(SqliteAdapter {
        connection: Mutex::new(connection),
        server_version,
    }))
}

impl SqliteAdapter {
    fn lock_connection(&self) -> io::Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| io::Error::other(POISONED_CONNECTION_MESSAGE))
    }

    /// Decodes every row while holding the connection, so row handlers are
    /// free to call back into the adapter.
    fn fetch_rows(&self, sql: &str, params: &[DbValue]) -> Result<Vec<Vec<DbValue>>> {
        let connection = self
            .lock_connection()
            .map_err(|source| QueryError::failed(sql, source))?;
        let mut statement = connection
            .prepare(sql)
            .map_err(|source| QueryError::failed(sql, source))?;
        let column_count = statement.column_count();
        let mut rows = statement
            .query(params_from_iter(params.iter().map(bind_value)))
            .map_err(|source| QueryError::failed(sql, source))?;

        let mut decoded = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|source| QueryError::failed(sql, source))?
        {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value = row
                    .get_ref(index)
                    .map_err(|source| QueryError::failed(sql, source))?;
                values.push(decode_value(value));
            }
            decoded.push(values);
        }
        Ok(decoded)
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn execute(&self, ctx: &ExecContext, sql: &str, params: &[DbValue]) -> Result<u64> {
        ctx.ensure_active()?;
        let connection = self
            .lock_connection()
            .map_err(|source| ExecutionError::statement_failed(sql, source))?;
        let affected = connection
            .execute(sql, params_from_iter(params.iter().map(bind_value)))
            .map_err(|source| ExecutionError::statement_failed(sql, source))?;
        Ok(affected as u64)
    }

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
        params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()> {
        ctx.ensure_active()?;
        let rows = self.fetch_rows(sql, params)?;
        for row in &rows {
            on_row(row.as_slice())?;
        }
        Ok(())
    }

    fn escape_literal(&self, value: &str) -> String {
        quote_string_literal(value)
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.server_version)
    }
}

fn query_server_version(connection: &Connection) -> Result<String> {
    let sql = catalog_queries::SHOW_SERVER_VERSION_QUERY;
    connection
        .query_row(sql, [], |row| row.get(0))
        .map_err(|source| QueryError::failed(sql, source).into())
}

fn ensure_minimum_version(raw_version: &str) -> Result<Version> {
    let version = Version::parse(raw_version).ok_or_else(|| ConfigError::InvalidVersion {
        dialect: DIALECT_NAME,
        raw: raw_version.to_string(),
    })?;
    if version >= MINIMUM_SQLITE_VERSION {
        return Ok(version);
    }

    Err(ConfigError::UnsupportedVersion {
        dialect: DIALECT_NAME,
        raw: raw_version.to_string(),
        minimum: MINIMUM_SQLITE_VERSION.to_string(),
    }
    .into())
}

fn bind_value(value: &DbValue) -> Value {
    match value {
        DbValue::Null => Value::Null,
        DbValue::Bool(value) => Value::Integer(i64::from(*value)),
        DbValue::Int(value) => Value::Integer(*value),
        DbValue::Float(value) => Value::Real(*value),
        DbValue::Text(value) => Value::Text(value.clone()),
        DbValue::Bytes(value) => Value::Blob(value.clone()),
    }
}

fn decode_value(value: ValueRef<'_>) -> DbValue {
    match value {
        ValueRef::Null => DbValue::Null,
        ValueRef::Integer(value) => DbValue::Int(value),
        ValueRef::Real(value) => DbValue::Float(value),
        ValueRef::Text(bytes) => DbValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => DbValue::Bytes(bytes.to_vec()),
    }
}
