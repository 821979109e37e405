use schemaops_dialect_postgres::PostgresDialect;
use schemaops_dialect_sqlite::SqliteDialect;
use schemaops_testkit::{
    MissingTableCase, Operation, TestCase, TestResult, matches_dialect, run_offline_test,
};

#[test]
fn offline_runner_validates_expected_sql() {
    let mut testcase = drop_case();
    testcase.expected = Some("DROP TABLE IF EXISTS public.unexpected CASCADE".to_string());

    let result = run_offline_test(&PostgresDialect, &testcase);
    assert!(
        matches!(result, TestResult::Failed(ref reason) if reason.contains("mismatch")),
        "offline runner must fail when submitted SQL does not match, got: {result:?}"
    );
}

#[test]
fn offline_runner_ignores_trailing_semicolons_and_blank_lines() {
    let mut testcase = drop_case();
    testcase.expected = Some("\nDROP TABLE IF EXISTS public.users CASCADE;\n\n".to_string());

    assert_eq!(run_offline_test(&PostgresDialect, &testcase), TestResult::Passed);
}

#[test]
fn offline_runner_scripts_existence_from_existing_list() {
    let testcase = TestCase {
        operation: Operation::DeleteAll,
        names: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        existing: Some(vec!["a".to_string(), "c".to_string()]),
        missing_table: Some(MissingTableCase::SkipAndContinue),
        expected: Some("DELETE FROM public.a\nDELETE FROM public.c".to_string()),
        ..TestCase::default()
    };

    assert_eq!(run_offline_test(&PostgresDialect, &testcase), TestResult::Passed);
}

#[test]
fn offline_runner_enforces_expected_error_contract() {
    let matching = TestCase {
        operation: Operation::TruncateCascade,
        names: vec!["users".to_string()],
        error: Some("operation `truncate_cascade` is not supported by dialect `sqlite`".to_string()),
        ..TestCase::default()
    };
    assert_eq!(run_offline_test(&SqliteDialect, &matching), TestResult::Passed);

    let mut missing_error = drop_case();
    missing_error.error = Some("boom".to_string());
    assert!(
        matches!(
            run_offline_test(&PostgresDialect, &missing_error),
            TestResult::Failed(ref reason) if reason.contains("but got no error")
        ),
        "successful execution with `error` expectation must fail"
    );

    let mut wrong_error = matching.clone();
    wrong_error.error = Some("something else".to_string());
    assert!(matches!(
        run_offline_test(&SqliteDialect, &wrong_error),
        TestResult::Failed(_)
    ));
}

#[test]
fn offline_runner_checks_table_exists_result() {
    let mut testcase = TestCase {
        operation: Operation::TableExists,
        names: vec!["audit.logs".to_string()],
        existing: Some(Vec::new()),
        exists: Some(false),
        ..TestCase::default()
    };
    assert_eq!(run_offline_test(&PostgresDialect, &testcase), TestResult::Passed);

    testcase.exists = Some(true);
    assert!(matches!(
        run_offline_test(&PostgresDialect, &testcase),
        TestResult::Failed(_)
    ));
}

#[test]
fn offline_runner_reports_missing_inputs() {
    let testcase = TestCase {
        operation: Operation::CreateIndex,
        fields: vec![vec!["email".to_string()]],
        ..TestCase::default()
    };

    assert!(matches!(
        run_offline_test(&PostgresDialect, &testcase),
        TestResult::Failed(ref reason) if reason.contains("`table`")
    ));
}

#[test]
fn dialect_requirement_skips_other_dialects() {
    let mut testcase = drop_case();
    testcase.dialect = Some("sqlite".to_string());

    assert!(matches!(
        run_offline_test(&PostgresDialect, &testcase),
        TestResult::Skipped(_)
    ));

    assert!(matches_dialect(None, "postgres"));
    assert!(matches_dialect(Some(" "), "postgres"));
    assert!(matches_dialect(Some("postgres"), "postgres"));
    assert!(!matches_dialect(Some("!postgres"), "postgres"));
    assert!(matches_dialect(Some("!sqlite"), "postgres"));
}

fn drop_case() -> TestCase {
    TestCase {
        operation: Operation::DropTables,
        names: vec!["users".to_string()],
        expected: Some("DROP TABLE IF EXISTS public.users CASCADE".to_string()),
        ..TestCase::default()
    }
}
