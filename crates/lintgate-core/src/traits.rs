//! Collaborator trait definitions for lintgate
//!
//! The gate talks to three external systems:
//! - `PullRequestSource`: changed files and head commit of a pull request
//! - `CheckRunStore`: list / create / update check runs on a commit
//! - `LintEngine`: lints a list of paths and returns a structured report
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;

use crate::error::{EngineError, SourceError, StoreError};
use crate::model::{
    CheckRun, CheckRunId, CheckRunStatus, CheckRunUpdate, HeadCommit, LintReport, NewCheckRun,
    PullRequestInfo,
};

/// Result type for check-run store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Pull request metadata query.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetch the changed files and head commit of a pull request.
    ///
    /// Returns `Ok(None)` when the pull request cannot be found or has no
    /// commits yet.
    async fn pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>, SourceError>;
}

/// Check-run record store scoped to one repository.
///
/// Guarantees expected of implementations:
/// - `create` returns the id of a new record in the requested status.
/// - `update` moves a record to `completed` with the given conclusion.
#[async_trait]
pub trait CheckRunStore: Send + Sync {
    /// List check runs on `head` that currently have `status`.
    async fn list(&self, head: &HeadCommit, status: CheckRunStatus)
        -> StoreResult<Vec<CheckRun>>;

    /// Create a check run, returning its id.
    async fn create(&self, run: NewCheckRun) -> StoreResult<CheckRunId>;

    /// Apply the terminal update to a check run.
    async fn update(&self, update: CheckRunUpdate) -> StoreResult<()>;
}

/// External lint engine.
#[async_trait]
pub trait LintEngine: Send + Sync {
    /// Lint `paths` (repository-relative).
    ///
    /// Lint findings are reported through `LintReport::conclusion`; `Err` is
    /// reserved for the engine itself failing.
    async fn run(&self, paths: &[String]) -> Result<LintReport, EngineError>;
}
