use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use schemaops_core::{
    CatalogSource, DatabaseAdapter, Dialect, ExecContext, ForeignKey, MissingTablePolicy,
    OpsOptions, SchemaOps, Version,
};
use serde::Deserialize;
use thiserror::Error;

use crate::RecordingAdapter;

/// One YAML scenario: an operation, its inputs, and what it must submit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestCase {
    pub operation: Operation,
    pub names: Vec<String>,
    pub table: Option<String>,
    pub fields: Vec<Vec<String>>,
    pub foreign_key: Option<ForeignKeyCase>,
    pub schemas: Vec<String>,
    /// Offline only: tables the catalog reports per schema for bulk drops.
    pub catalog_tables: BTreeMap<String, Vec<String>>,
    /// Offline only: names that exist. `None` means every name exists.
    pub existing: Option<Vec<String>>,
    pub missing_table: Option<MissingTableCase>,
    pub catalog: Option<CatalogCase>,
    /// Online only: statements run before the operation.
    pub setup: Vec<String>,
    /// Submitted statements, one per line, in order.
    pub expected: Option<String>,
    pub exists: Option<bool>,
    pub error: Option<String>,
    pub dialect: Option<String>,
    pub min_version: Option<String>,
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    DropTables,
    DeleteAll,
    TruncateCascade,
    TruncateCascadeRestartIdentity,
    CreateIndex,
    AddForeignKeyCascadeDelete,
    DropAllTables,
    TableExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyCase {
    pub table: String,
    pub field: String,
    pub ref_table: String,
    pub ref_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTableCase {
    StopBatch,
    SkipAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogCase {
    InformationSchema,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read testcase file `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse testcase yaml{}: {source}", render_location(.source))]
    Parse { source: serde_yaml::Error },
}

/// Why a scenario did not pass.
#[derive(Debug)]
enum RunnerFailure {
    Operation(schemaops_core::Error),
    Assertion(String),
}

impl From<schemaops_core::Error> for RunnerFailure {
    fn from(error: schemaops_core::Error) -> Self {
        Self::Operation(error)
    }
}

type RunnerResult<T = ()> = std::result::Result<T, RunnerFailure>;

pub fn load_test_cases_from_str(yaml: &str) -> Result<BTreeMap<String, TestCase>, LoadError> {
    serde_yaml::from_str(yaml).map_err(|source| LoadError::Parse { source })
}

pub fn load_test_cases_from_path(path: &Path) -> Result<BTreeMap<String, TestCase>, LoadError> {
    let yaml = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_test_cases_from_str(&yaml)
}

/// `requirement` is a dialect name, optionally negated with `!`.
pub fn matches_dialect(requirement: Option<&str>, dialect: &str) -> bool {
    let Some(requirement) = requirement.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };

    if let Some(excluded) = requirement.strip_prefix('!') {
        return excluded != dialect;
    }

    requirement == dialect
}

/// Runs `test` against a [`RecordingAdapter`] scripted from the case's
/// `existing` and `catalog_tables`.
pub fn run_offline_test(dialect: &dyn Dialect, test: &TestCase) -> TestResult {
    if let Some(reason) = dialect_skip_reason(dialect, test) {
        return TestResult::Skipped(reason);
    }

    let adapter = RecordingAdapter::new();
    script_offline_catalog(dialect, &adapter, test);
    let outcome = run_operation(dialect, &adapter, test);
    finish(test, &adapter, outcome)
}

/// Runs `test` against a live adapter. Setup statements are applied first
/// and are not part of the expected output.
pub fn run_online_test(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> TestResult {
    if test.offline {
        return TestResult::Skipped("offline-only testcase".to_string());
    }
    if let Some(reason) = dialect_skip_reason(dialect, test) {
        return TestResult::Skipped(reason);
    }
    match version_skip_reason(adapter, test) {
        Ok(Some(reason)) => return TestResult::Skipped(reason),
        Ok(None) => {}
        Err(RunnerFailure::Operation(error)) => return TestResult::Failed(error.to_string()),
        Err(RunnerFailure::Assertion(message)) => return TestResult::Failed(message),
    }

    let recording = RecordingAdapter::wrapping(adapter);
    let ctx = ExecContext::background();
    for statement in &test.setup {
        if let Err(error) = adapter.execute(&ctx, statement, &[]) {
            return TestResult::Failed(format!("setup statement failed: {error}"));
        }
    }

    let outcome = run_operation(dialect, &recording, test);
    finish(test, &recording, outcome)
}

fn dialect_skip_reason(dialect: &dyn Dialect, test: &TestCase) -> Option<String> {
    if matches_dialect(test.dialect.as_deref(), dialect.name()) {
        return None;
    }
    Some(format!(
        "testcase requires dialect '{}', running on '{}'",
        test.dialect.as_deref().unwrap_or_default(),
        dialect.name()
    ))
}

fn finish(
    test: &TestCase,
    adapter: &RecordingAdapter<'_>,
    outcome: RunnerResult<bool>,
) -> TestResult {
    let checked = match evaluate_expected_error(test, outcome) {
        Ok(Some(exists)) => assert_exists(test, exists)
            .and_then(|()| assert_expected_sql(test, &adapter.executed_sql())),
        Ok(None) => Ok(()),
        Err(failure) => Err(failure),
    };

    match checked {
        Ok(()) => TestResult::Passed,
        Err(RunnerFailure::Operation(error)) => TestResult::Failed(error.to_string()),
        Err(RunnerFailure::Assertion(message)) => TestResult::Failed(message),
    }
}

fn script_offline_catalog(
    dialect: &dyn Dialect,
    adapter: &RecordingAdapter<'_>,
    test: &TestCase,
) {
    let catalog = catalog_for(dialect, test);
    for raw in &test.names {
        let exists = test
            .existing
            .as_ref()
            .is_none_or(|existing| existing.contains(raw));
        // Unsupported catalogs surface when the operation runs.
        if adapter
            .script_existence(dialect, catalog, raw, exists)
            .is_err()
        {
            break;
        }
    }

    for (schema, tables) in &test.catalog_tables {
        let tables = tables.iter().map(String::as_str).collect::<Vec<_>>();
        adapter.script_tables(dialect, schema, &tables);
    }
}

/// Returns the existence result for `table_exists` and `false` otherwise.
fn run_operation(
    dialect: &dyn Dialect,
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<bool> {
    let ops = SchemaOps::new(dialect, adapter).with_options(OpsOptions {
        catalog: test.catalog.map(CatalogSource::from),
        missing_table: test
            .missing_table
            .map(MissingTablePolicy::from)
            .unwrap_or_default(),
    });
    let ctx = ExecContext::background();
    let names = test.names.iter().map(String::as_str).collect::<Vec<_>>();

    match test.operation {
        Operation::DropTables => ops.drop_tables(&ctx, &names)?,
        Operation::DeleteAll => ops.delete_all(&ctx, &names)?,
        Operation::TruncateCascade => ops.truncate_cascade(&ctx, &names)?,
        Operation::TruncateCascadeRestartIdentity => {
            ops.truncate_cascade_restart_identity(&ctx, &names)?;
        }
        Operation::CreateIndex => {
            let table = required(test.table.as_deref(), "table")?;
            for fields in &test.fields {
                let fields = fields.iter().map(String::as_str).collect::<Vec<_>>();
                ops.create_index(&ctx, table, &fields)?;
            }
        }
        Operation::AddForeignKeyCascadeDelete => {
            let foreign_key = required(test.foreign_key.as_ref(), "foreign_key")?;
            ops.add_foreign_key_cascade_delete(
                &ctx,
                &ForeignKey::new(
                    foreign_key.table.as_str(),
                    foreign_key.field.as_str(),
                    foreign_key.ref_table.as_str(),
                    foreign_key.ref_field.as_str(),
                ),
            )?;
        }
        Operation::DropAllTables => {
            let schemas = test.schemas.iter().map(String::as_str).collect::<Vec<_>>();
            ops.drop_all_tables(&ctx, &schemas)?;
        }
        Operation::TableExists => {
            let raw = names.first().copied().unwrap_or_default();
            return Ok(ops.table_exists(&ctx, raw)?);
        }
    }
    Ok(false)
}

fn required<'t, T: ?Sized>(value: Option<&'t T>, field: &str) -> RunnerResult<&'t T> {
    value.ok_or_else(|| RunnerFailure::Assertion(format!("testcase is missing `{field}`")))
}

fn catalog_for(dialect: &dyn Dialect, test: &TestCase) -> CatalogSource {
    test.catalog
        .map(CatalogSource::from)
        .unwrap_or_else(|| dialect.preferred_catalog())
}

/// `Ok(Some(_))` carries the operation result on to the output checks;
/// `Ok(None)` means an expected error matched.
fn evaluate_expected_error(
    test: &TestCase,
    outcome: RunnerResult<bool>,
) -> RunnerResult<Option<bool>> {
    let Some(expected_error) = test.error.as_deref() else {
        return outcome.map(Some);
    };

    match outcome {
        Ok(_) => Err(RunnerFailure::Assertion(format!(
            "expected error: {expected_error}, but got no error"
        ))),
        Err(RunnerFailure::Operation(actual)) => {
            let actual = actual.to_string();
            if actual == expected_error {
                Ok(None)
            } else {
                Err(RunnerFailure::Assertion(format!(
                    "expected error: {expected_error}, but got: {actual}"
                )))
            }
        }
        Err(failure) => Err(failure),
    }
}

fn assert_exists(test: &TestCase, actual: bool) -> RunnerResult {
    if test.operation != Operation::TableExists {
        return Ok(());
    }
    match test.exists {
        Some(expected) if expected != actual => Err(RunnerFailure::Assertion(format!(
            "expected table_exists to return {expected}, got {actual}"
        ))),
        _ => Ok(()),
    }
}

fn assert_expected_sql(test: &TestCase, executed: &[String]) -> RunnerResult {
    let Some(expected) = test.expected.as_deref() else {
        return Ok(());
    };

    let expected = expected
        .lines()
        .map(normalize_sql)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let actual = executed
        .iter()
        .map(|sql| normalize_sql(sql))
        .collect::<Vec<_>>();
    if expected == actual {
        return Ok(());
    }

    Err(RunnerFailure::Assertion(format!(
        "submitted SQL mismatch; expected:\n{}\nactual:\n{}",
        expected.join("\n"),
        actual.join("\n")
    )))
}

fn normalize_sql(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

fn version_skip_reason(
    adapter: &dyn DatabaseAdapter,
    test: &TestCase,
) -> RunnerResult<Option<String>> {
    let Some(min_version) = test
        .min_version
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Ok(None);
    };

    let required = Version::parse(min_version).ok_or_else(|| {
        RunnerFailure::Assertion(format!("invalid version requirement '{min_version}'"))
    })?;
    let actual = adapter.server_version()?;
    if actual.cmp(&required) == Ordering::Less {
        return Ok(Some(format!(
            "Version '{actual}' is smaller than min_version '{min_version}'"
        )));
    }
    Ok(None)
}

fn render_location(source: &serde_yaml::Error) -> String {
    source
        .location()
        .map(|location| format!(" at line {} column {}", location.line(), location.column()))
        .unwrap_or_default()
}

impl From<MissingTableCase> for MissingTablePolicy {
    fn from(value: MissingTableCase) -> Self {
        match value {
            MissingTableCase::StopBatch => Self::StopBatch,
            MissingTableCase::SkipAndContinue => Self::SkipAndContinue,
        }
    }
}

impl From<CatalogCase> for CatalogSource {
    fn from(value: CatalogCase) -> Self {
        match value {
            CatalogCase::InformationSchema => Self::InformationSchema,
            CatalogCase::Native => Self::Native,
        }
    }
}
