use std::{cell::RefCell, collections::BTreeMap, error::Error as StdError, fmt};

use schemaops_core::{
    DatabaseAdapter, DbValue, ExecContext, ExecutionError, QueryError, Result, RowHandler, Version,
    quote_string_literal,
};

#[derive(Debug, Default)]
struct FailureRule {
    sql: String,
    message: String,
}

#[derive(Debug, Default)]
pub struct FakeAdapter {
    state: RefCell<FakeAdapterState>,
}

#[derive(Debug, Default)]
struct FakeAdapterState {
    executed_sql: Vec<String>,
    queried_sql: Vec<String>,
    rows: BTreeMap<String, Vec<Vec<DbValue>>>,
    default_rows: Vec<Vec<DbValue>>,
    fail_on_sql: Option<FailureRule>,
}

#[allow(dead_code)]
impl FakeAdapter {
    pub fn set_rows(&self, sql: impl Into<String>, rows: Vec<Vec<DbValue>>) {
        self.state.borrow_mut().rows.insert(sql.into(), rows);
    }

    /// Rows answered for any query without an explicit response.
    pub fn set_default_rows(&self, rows: Vec<Vec<DbValue>>) {
        self.state.borrow_mut().default_rows = rows;
    }

    pub fn set_fail_on_sql(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.state.borrow_mut().fail_on_sql = Some(FailureRule {
            sql: sql.into(),
            message: message.into(),
        });
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.borrow().executed_sql.clone()
    }

    pub fn queried_sql(&self) -> Vec<String> {
        self.state.borrow().queried_sql.clone()
    }

    fn failure_for(&self, sql: &str) -> Option<String> {
        self.state
            .borrow()
            .fail_on_sql
            .as_ref()
            .filter(|rule| rule.sql == sql)
            .map(|rule| rule.message.clone())
    }
}

impl DatabaseAdapter for FakeAdapter {
    fn execute(&self, ctx: &ExecContext, sql: &str, _params: &[DbValue]) -> Result<u64> {
        ctx.ensure_active()?;
        if let Some(message) = self.failure_for(sql) {
            return Err(ExecutionError::statement_failed(sql, FakeSourceError(message)).into());
        }

        self.state.borrow_mut().executed_sql.push(sql.to_string());
        Ok(0)
    }

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
        _params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()> {
        ctx.ensure_active()?;
        if let Some(message) = self.failure_for(sql) {
            return Err(QueryError::failed(sql, FakeSourceError(message)).into());
        }

        let rows = {
            let mut state = self.state.borrow_mut();
            state.queried_sql.push(sql.to_string());
            state
                .rows
                .get(sql)
                .cloned()
                .unwrap_or_else(|| state.default_rows.clone())
        };
        for row in &rows {
            on_row(row.as_slice())?;
        }
        Ok(())
    }

    fn escape_literal(&self, value: &str) -> String {
        quote_string_literal(value)
    }

    fn server_version(&self) -> Result<Version> {
        Ok(Version::new(0, 0, 0))
    }
}

#[derive(Debug)]
struct FakeSourceError(String);

impl fmt::Display for FakeSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for FakeSourceError {}
