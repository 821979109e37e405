use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use postgres::{
    Client, NoTls, Row,
    types::{FromSql, ToSql, Type},
};
use schemaops_core::{
    ConfigError, ConnectionConfig, DatabaseAdapter, DbValue, ExecContext, ExecutionError,
    QueryError, Result, RowHandler, Version,
};
use tracing::debug;

use crate::{catalog_queries, quote};

const DIALECT_NAME: &str = "postgres";
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
// CREATE INDEX IF NOT EXISTS first shipped in 9.5.
const MINIMUM_POSTGRES_VERSION: Version = Version::new(9, 5, 0);
const SERVER_VERSION_OVERRIDE_KEY: &str = "postgres.server_version";
const POISONED_CLIENT_MESSAGE: &str = "postgres connection state was poisoned";

pub(crate) struct PostgresAdapter {
    client: Mutex<Client>,
    server_version: Version,
}

type BoxedParam = Box<dyn ToSql + Sync>;

pub(crate) fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseAdapter>> {
    if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
        ensure_minimum_version(raw_version)?;
    }

    let mut client = connect_client(config)?;
    let server_version_raw =
        if let Some(raw_version) = config.extra.get(SERVER_VERSION_OVERRIDE_KEY) {
            raw_version.clone()
        } else {
            query_server_version(&mut client)?
        };
    let server_version = ensure_minimum_version(&server_version_raw)?;
    debug!(
        database = %config.database,
        version = %server_version,
        "connected to postgres"
    );

    Ok(Box::new(PostgresAdapter {
        client: Mutex::new(client),
        server_version,
    }))
}

impl PostgresAdapter {
    fn lock_client(&self) -> io::Result<MutexGuard<'_, Client>> {
        self.client
            .lock()
            .map_err(|_| io::Error::other(POISONED_CLIENT_MESSAGE))
    }
}

impl DatabaseAdapter for PostgresAdapter {
    fn execute(&self, ctx: &ExecContext, sql: &str, params: &[DbValue]) -> Result<u64> {
        ctx.ensure_active()?;
        let bound = bind_params(params);
        let mut client = self
            .lock_client()
            .map_err(|source| ExecutionError::statement_failed(sql, source))?;
        client
            .execute(sql, &param_refs(&bound))
            .map_err(|source| ExecutionError::statement_failed(sql, source).into())
    }

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
        params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()> {
        ctx.ensure_active()?;
        let bound = bind_params(params);
        let rows = {
            let mut client = self
                .lock_client()
                .map_err(|source| QueryError::failed(sql, source))?;
            client
                .query(sql, &param_refs(&bound))
                .map_err(|source| QueryError::failed(sql, source))?
        };

        for row in &rows {
            let values = decode_row(row, sql)?;
            on_row(values.as_slice())?;
        }
        Ok(())
    }

    fn escape_literal(&self, value: &str) -> String {
        quote::escape_literal(value)
    }

    fn server_version(&self) -> Result<Version> {
        Ok(self.server_version)
    }
}

fn connect_client(config: &ConnectionConfig) -> Result<Client> {
    let mut postgres_config = postgres::Config::new();

    if let Some(socket_path) = &config.socket {
        postgres_config.host_path(socket_path);
    } else if let Some(host) = &config.host {
        postgres_config.host(host);
    } else {
        postgres_config.host(DEFAULT_POSTGRES_HOST);
    }

    if let Some(port) = config.port {
        postgres_config.port(port);
    }
    if let Some(user) = &config.user {
        postgres_config.user(user);
    }
    if let Some(password) = &config.password {
        postgres_config.password(password);
    }
    postgres_config.dbname(&config.database);

    postgres_config
        .connect(NoTls)
        .map_err(|source| connect_error(config, source))
}

fn query_server_version(client: &mut Client) -> Result<String> {
    let sql = catalog_queries::SHOW_SERVER_VERSION_QUERY;
    let row = client
        .query_one(sql, &[])
        .map_err(|source| QueryError::failed(sql, source))?;
    row.try_get::<_, String>(0)
        .map_err(|source| QueryError::failed(sql, source).into())
}

fn ensure_minimum_version(raw_version: &str) -> Result<Version> {
    let version = Version::parse(raw_version).ok_or_else(|| ConfigError::InvalidVersion {
        dialect: DIALECT_NAME,
        raw: raw_version.to_string(),
    })?;
    if version >= MINIMUM_POSTGRES_VERSION {
        return Ok(version);
    }

    Err(ConfigError::UnsupportedVersion {
        dialect: DIALECT_NAME,
        raw: raw_version.to_string(),
        minimum: format!(
            "{}.{}",
            MINIMUM_POSTGRES_VERSION.major, MINIMUM_POSTGRES_VERSION.minor
        ),
    }
    .into())
}

fn bind_params(params: &[DbValue]) -> Vec<BoxedParam> {
    params
        .iter()
        .map(|param| -> BoxedParam {
            match param {
                DbValue::Null => Box::new(Option::<String>::None),
                DbValue::Bool(value) => Box::new(*value),
                DbValue::Int(value) => Box::new(*value),
                DbValue::Float(value) => Box::new(*value),
                DbValue::Text(value) => Box::new(value.clone()),
                DbValue::Bytes(value) => Box::new(value.clone()),
            }
        })
        .collect()
}

fn param_refs(bound: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    bound.iter().map(|param| param.as_ref()).collect()
}

fn decode_row(row: &Row, sql: &str) -> Result<Vec<DbValue>> {
    (0..row.len())
        .map(|index| decode_column(row, index, sql))
        .collect()
}

fn decode_column(row: &Row, index: usize, sql: &str) -> Result<DbValue> {
    let value = match *row.columns()[index].type_() {
        Type::BOOL => row_value::<bool>(row, index, sql)?.map(DbValue::Bool),
        Type::INT2 => row_value::<i16>(row, index, sql)?.map(|value| DbValue::Int(value.into())),
        Type::INT4 => row_value::<i32>(row, index, sql)?.map(|value| DbValue::Int(value.into())),
        Type::INT8 => row_value::<i64>(row, index, sql)?.map(DbValue::Int),
        Type::OID => row_value::<u32>(row, index, sql)?.map(|value| DbValue::Int(value.into())),
        Type::FLOAT4 => {
            row_value::<f32>(row, index, sql)?.map(|value| DbValue::Float(value.into()))
        }
        Type::FLOAT8 => row_value::<f64>(row, index, sql)?.map(DbValue::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            row_value::<String>(row, index, sql)?.map(DbValue::Text)
        }
        _ => row_value::<RawValue>(row, index, sql)?.map(|raw| DbValue::Bytes(raw.0)),
    };
    Ok(value.unwrap_or(DbValue::Null))
}

fn row_value<T>(row: &Row, index: usize, sql: &str) -> Result<Option<T>>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get::<_, Option<T>>(index)
        .map_err(|source| QueryError::failed(sql, source).into())
}

/// Binary wire representation of a column with no dedicated mapping, e.g.
/// the 16 bytes of a `uuid`.
struct RawValue(Vec<u8>);

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn StdError + Sync + Send>> {
        Ok(Self(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn connect_error(config: &ConnectionConfig, source: postgres::Error) -> schemaops_core::Error {
    ConfigError::Connect {
        dialect: DIALECT_NAME,
        database: config.database.clone(),
        source: Box::new(source),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use schemaops_core::{ConfigError, Error, Version};

    use super::ensure_minimum_version;

    #[test]
    fn accepts_supported_versions() {
        assert_eq!(
            ensure_minimum_version("16.2 (Debian 16.2-1.pgdg120+2)").expect("16 is supported"),
            Version::new(16, 2, 0)
        );
        assert_eq!(
            ensure_minimum_version("9.5.25").expect("9.5 is supported"),
            Version::new(9, 5, 25)
        );
    }

    #[test]
    fn rejects_versions_without_index_if_not_exists() {
        let error = ensure_minimum_version("9.4.26").expect_err("9.4 is too old");

        assert!(matches!(
            error,
            Error::Config(ConfigError::UnsupportedVersion { .. })
        ));
        assert!(error.to_string().contains("9.5+"));
    }

    #[test]
    fn rejects_unparsable_versions() {
        let error = ensure_minimum_version("devel").expect_err("not a version");

        assert!(matches!(
            error,
            Error::Config(ConfigError::InvalidVersion { .. })
        ));
    }
}
