use std::{cell::RefCell, collections::BTreeMap};

use schemaops_core::{
    CatalogSource, DatabaseAdapter, DbValue, Dialect, ExecContext, ExecutionError, QueryError,
    Result, RowHandler, StatementBuilder, Version, quote_string_literal,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Execute,
    Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub sql: String,
    pub params: Vec<DbValue>,
}

#[derive(Debug, Error)]
#[error("{0}")]
struct ScriptedFailure(String);

struct BoundResponse {
    sql: String,
    params: Vec<DbValue>,
    rows: Vec<Vec<DbValue>>,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<RecordedCall>,
    rows: BTreeMap<String, Vec<Vec<DbValue>>>,
    bound_rows: Vec<BoundResponse>,
    default_rows: Vec<Vec<DbValue>>,
    failures: BTreeMap<String, String>,
}

/// Execution collaborator that records every submission.
///
/// Standalone it answers queries from scripted rows keyed by exact SQL.
/// Wrapped around a live adapter it records and forwards instead.
pub struct RecordingAdapter<'a> {
    inner: Option<&'a dyn DatabaseAdapter>,
    server_version: Version,
    state: RefCell<RecordingState>,
}

impl Default for RecordingAdapter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingAdapter<'static> {
    pub fn new() -> Self {
        Self {
            inner: None,
            server_version: Version::new(0, 0, 0),
            state: RefCell::new(RecordingState::default()),
        }
    }
}

impl<'a> RecordingAdapter<'a> {
    pub fn wrapping(inner: &'a dyn DatabaseAdapter) -> Self {
        Self {
            inner: Some(inner),
            server_version: Version::new(0, 0, 0),
            state: RefCell::new(RecordingState::default()),
        }
    }

    #[must_use]
    pub fn with_server_version(mut self, version: Version) -> Self {
        self.server_version = version;
        self
    }

    pub fn respond(&self, sql: impl Into<String>, rows: Vec<Vec<DbValue>>) {
        self.state.borrow_mut().rows.insert(sql.into(), rows);
    }

    /// Like [`Self::respond`], but only for calls binding exactly `params`.
    /// Takes precedence over responses keyed by SQL alone.
    pub fn respond_bound(
        &self,
        sql: impl Into<String>,
        params: Vec<DbValue>,
        rows: Vec<Vec<DbValue>>,
    ) {
        self.state.borrow_mut().bound_rows.push(BoundResponse {
            sql: sql.into(),
            params,
            rows,
        });
    }

    /// Rows answered for any query without a scripted response.
    pub fn respond_default(&self, rows: Vec<Vec<DbValue>>) {
        self.state.borrow_mut().default_rows = rows;
    }

    pub fn fail_on(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.state
            .borrow_mut()
            .failures
            .insert(sql.into(), message.into());
    }

    /// Scripts the existence check `dialect` issues for `raw` against
    /// `catalog`.
    pub fn script_existence(
        &self,
        dialect: &dyn Dialect,
        catalog: CatalogSource,
        raw: &str,
        exists: bool,
    ) -> Result<()> {
        let name = dialect.resolve(raw);
        let escape = |value: &str| self.escape_literal(value);
        let statement = StatementBuilder::new(dialect).table_exists(&name, catalog, &escape)?;
        self.respond(statement.sql(), vec![vec![DbValue::Bool(exists)]]);
        Ok(())
    }

    /// Scripts the table listing of `schema` used by bulk drops.
    pub fn script_tables(&self, dialect: &dyn Dialect, schema: &str, tables: &[&str]) {
        let statement = dialect.list_tables(schema);
        let rows = tables
            .iter()
            .map(|table| vec![DbValue::from(*table)])
            .collect();
        self.respond_bound(statement.sql(), statement.params().to_vec(), rows);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.sql_of(CallKind::Execute)
    }

    pub fn queried_sql(&self) -> Vec<String> {
        self.sql_of(CallKind::Query)
    }

    fn sql_of(&self, kind: CallKind) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.kind == kind)
            .map(|call| call.sql.clone())
            .collect()
    }

    fn record(&self, kind: CallKind, sql: &str, params: &[DbValue]) {
        self.state.borrow_mut().calls.push(RecordedCall {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }

    fn failure_for(&self, sql: &str) -> Option<ScriptedFailure> {
        self.state
            .borrow()
            .failures
            .get(sql)
            .map(|message| ScriptedFailure(message.clone()))
    }

    fn scripted_rows(&self, sql: &str, params: &[DbValue]) -> Vec<Vec<DbValue>> {
        let state = self.state.borrow();
        if let Some(response) = state
            .bound_rows
            .iter()
            .rev()
            .find(|response| response.sql == sql && response.params == params)
        {
            return response.rows.clone();
        }
        state
            .rows
            .get(sql)
            .unwrap_or(&state.default_rows)
            .clone()
    }
}

impl DatabaseAdapter for RecordingAdapter<'_> {
    fn execute(&self, ctx: &ExecContext, sql: &str, params: &[DbValue]) -> Result<u64> {
        ctx.ensure_active()?;
        self.record(CallKind::Execute, sql, params);
        if let Some(failure) = self.failure_for(sql) {
            return Err(ExecutionError::statement_failed(sql, failure).into());
        }

        match self.inner {
            Some(inner) => inner.execute(ctx, sql, params),
            None => Ok(0),
        }
    }

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
        params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()> {
        ctx.ensure_active()?;
        self.record(CallKind::Query, sql, params);
        if let Some(failure) = self.failure_for(sql) {
            return Err(QueryError::failed(sql, failure).into());
        }

        if let Some(inner) = self.inner {
            return inner.query(ctx, sql, params, on_row);
        }
        for row in self.scripted_rows(sql, params) {
            on_row(row.as_slice())?;
        }
        Ok(())
    }

    fn escape_literal(&self, value: &str) -> String {
        match self.inner {
            Some(inner) => inner.escape_literal(value),
            None => quote_string_literal(value),
        }
    }

    fn server_version(&self) -> Result<Version> {
        match self.inner {
            Some(inner) => inner.server_version(),
            None => Ok(self.server_version),
        }
    }
}
