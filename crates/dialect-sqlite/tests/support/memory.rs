use schemaops_core::{ConnectionConfig, DatabaseAdapter, Dialect, ExecContext};
use schemaops_dialect_sqlite::SqliteDialect;

pub fn in_memory_adapter() -> Box<dyn DatabaseAdapter> {
    SqliteDialect
        .connect(&ConnectionConfig::database(":memory:"))
        .expect("sqlite connect should succeed for in-memory database")
}

#[allow(dead_code)]
pub fn seed(adapter: &dyn DatabaseAdapter, statements: &[&str]) {
    let ctx = ExecContext::background();
    for sql in statements {
        adapter
            .execute(&ctx, sql, &[])
            .unwrap_or_else(|error| panic!("seed statement must succeed: {sql}\n{error}"));
    }
}

#[allow(dead_code)]
pub fn table_names(adapter: &dyn DatabaseAdapter) -> Vec<String> {
    let ctx = ExecContext::background();
    let mut names = Vec::new();
    adapter
        .query(
            &ctx,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            &[],
            &mut |row: &[schemaops_core::DbValue]| {
                if let Some(name) = row.first().and_then(|value| value.as_str()) {
                    names.push(name.to_string());
                }
                Ok(())
            },
        )
        .expect("listing tables must succeed");
    names
}
