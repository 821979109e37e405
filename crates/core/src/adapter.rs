use crate::{DbValue, ExecContext, QueryError, Result, Version};

/// Callback receiving one result row at a time.
pub type RowHandler<'h> = dyn FnMut(&[DbValue]) -> Result<()> + 'h;

/// Execution collaborator that owns a live connection.
///
/// Implementations must check `ctx` before submitting anything.
pub trait DatabaseAdapter {
    /// Submits a statement and returns the number of affected rows.
    fn execute(&self, ctx: &ExecContext, sql: &str, params: &[DbValue]) -> Result<u64>;

    fn query(
        &self,
        ctx: &ExecContext,
        sql: &str,
        params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()>;

    /// Hands the first row to `on_row` and fails with
    /// [`QueryError::NoRows`] when there is none.
    fn query_row(
        &self,
        ctx: &ExecContext,
        sql: &str,
        params: &[DbValue],
        on_row: &mut RowHandler<'_>,
    ) -> Result<()> {
        let mut seen = false;
        self.query(ctx, sql, params, &mut |row: &[DbValue]| {
            if seen {
                return Ok(());
            }
            seen = true;
            on_row(row)
        })?;

        if seen {
            Ok(())
        } else {
            Err(QueryError::no_rows(sql).into())
        }
    }

    /// Renders `value` as a string literal that is safe to inline.
    fn escape_literal(&self, value: &str) -> String;

    fn server_version(&self) -> Result<Version>;
}

/// Standard SQL string literal: wraps in single quotes and doubles embedded
/// quotes.
pub fn quote_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
