use std::{collections::BTreeMap, fs, path::PathBuf};

use schemaops_core::{ConnectionConfig, DatabaseAdapter, Dialect, ExecContext, SchemaOps};
use schemaops_dialect_postgres::PostgresDialect;
use schemaops_testkit::{TestResult, load_test_cases_from_path, run_online_test};

#[test]
#[ignore = "requires postgres container runtime"]
fn schema_ops_smoke_test_with_container_runtime() {
    let Some(adapter) = connect_from_env() else {
        return;
    };
    let ctx = ExecContext::background();
    for sql in [
        "DROP SCHEMA IF EXISTS schemaops_smoke CASCADE",
        "CREATE SCHEMA schemaops_smoke",
        "CREATE TABLE schemaops_smoke.users (id serial PRIMARY KEY, email text)",
        "CREATE TABLE schemaops_smoke.orders (id serial PRIMARY KEY, user_id integer)",
        "INSERT INTO schemaops_smoke.users (email) VALUES ('a@example.com')",
    ] {
        adapter
            .execute(&ctx, sql, &[])
            .unwrap_or_else(|error| panic!("setup must succeed: {sql}\n{error}"));
    }

    let ops = SchemaOps::new(&PostgresDialect, adapter.as_ref());
    assert!(
        ops.table_exists(&ctx, "schemaops_smoke.users")
            .expect("check must succeed")
    );
    ops.truncate_cascade_restart_identity(&ctx, &["schemaops_smoke.users"])
        .expect("truncate must succeed");
    ops.drop_all_tables(&ctx, &["schemaops_smoke"])
        .expect("bulk drop must succeed");
    assert!(
        !ops.table_exists(&ctx, "schemaops_smoke.orders")
            .expect("check must succeed")
    );

    adapter
        .execute(&ctx, "DROP SCHEMA schemaops_smoke CASCADE", &[])
        .expect("cleanup must succeed");
}

#[test]
#[ignore = "requires postgres container runtime"]
fn postgres_yaml_cases_pass_online_runner() {
    let Some(adapter) = connect_from_env() else {
        return;
    };
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/postgres/online");
    let Ok(entries) = fs::read_dir(&root) else {
        return;
    };

    for entry in entries {
        let path = entry.expect("directory entry must be readable").path();
        let cases = load_test_cases_from_path(&path)
            .unwrap_or_else(|error| panic!("failed to load '{}': {error}", path.display()));
        for (case_name, case) in cases {
            let result = run_online_test(&PostgresDialect, adapter.as_ref(), &case);
            if let TestResult::Failed(reason) = result {
                panic!("testcase '{case_name}' failed: {reason}");
            }
        }
    }
}

fn connect_from_env() -> Option<Box<dyn DatabaseAdapter>> {
    if std::env::var("SCHEMAOPS_POSTGRES_ENABLE_IGNORED").as_deref() != Ok("1") {
        return None;
    }

    let host =
        std::env::var("SCHEMAOPS_POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("SCHEMAOPS_POSTGRES_PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(5432);
    let user =
        std::env::var("SCHEMAOPS_POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("SCHEMAOPS_POSTGRES_PASSWORD").unwrap_or_default();
    let database =
        std::env::var("SCHEMAOPS_POSTGRES_DATABASE").unwrap_or_else(|_| "postgres".to_string());

    let connection = ConnectionConfig {
        host: Some(host),
        port: Some(port),
        user: Some(user),
        password: Some(password),
        database,
        socket: None,
        extra: BTreeMap::new(),
    };

    Some(
        PostgresDialect
            .connect(&connection)
            .expect("connect should succeed for integration runtime"),
    )
}
