//! lintgate-engine: ESLint as a lint engine
//!
//! Runs ESLint with `--format json` on the lint targets and folds its report
//! into the check-run output the gate publishes.

pub mod eslint;
pub mod report;

pub use eslint::{EslintConfig, EslintEngine, DEFAULT_COMMAND};
pub use report::{build_report, parse_report, EslintFileResult, EslintMessage, MAX_ANNOTATIONS};
