//! lintgate-core: Pull Request Lint Gate
//!
//! Decides which files of a pull request get linted and reconciles the single
//! check run that reports the result on the head commit.
//!
//! ## Key Components
//!
//! - `PatternMatcher`: expands ignore-file globs against the repository tree
//! - `select`: narrows the changed files to the lint target list
//! - `CheckRunCoordinator`: finds or creates the gate's check run
//! - `ReportPublisher`: completes the check run from the lint outcome
//! - `LintGate`: runs one invocation over the collaborator traits

pub mod config;
pub mod coordinator;
mod error;
pub mod fakes;
pub mod gate;
pub mod model;
pub mod pattern;
pub mod publisher;
pub mod select;
pub mod telemetry;
pub mod traits;

pub use config::{GateConfig, DEFAULT_CHECK_NAME, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_FILE};
pub use coordinator::{CheckRunCoordinator, CheckRunHandle};
pub use error::{EngineError, GateError, SourceError, StoreError};
pub use gate::{GateOutcome, LintGate};
pub use model::{
    Annotation, AnnotationLevel, ChangedFile, CheckRun, CheckRunId, CheckRunOutput,
    CheckRunStatus, CheckRunUpdate, Conclusion, HeadCommit, InvalidRepository, LintOutcome,
    LintReport, NewCheckRun, PullRequestInfo, Repository,
};
pub use pattern::{excluded_among, excluded_paths, match_patterns, IgnorePatternSet, PatternMatcher};
pub use publisher::{ReportPublisher, LINT_FAILURE_MESSAGE};
pub use select::{extension_of, select, LintTargetList};
pub use traits::{CheckRunStore, LintEngine, PullRequestSource, StoreResult};
