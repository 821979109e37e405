mod recording;
mod yaml_runner;

pub use recording::{CallKind, RecordedCall, RecordingAdapter};
pub use yaml_runner::{
    CatalogCase, ForeignKeyCase, LoadError, MissingTableCase, Operation, TestCase, TestResult,
    load_test_cases_from_path, load_test_cases_from_str, matches_dialect, run_offline_test,
    run_online_test,
};
