//! Domain types shared by the gate and its collaborators.
//!
//! Check-run types mirror the fields the platform's check-run API reads and
//! writes; they serialize to the same snake_case JSON.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Pull request metadata
// ---------------------------------------------------------------------------

/// A repository identified as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid repository {0:?}, expected owner/name")]
pub struct InvalidRepository(pub String);

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for Repository {
    type Err = InvalidRepository;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(InvalidRepository(s.to_string())),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One file touched by the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path, `/`-separated.
    pub path: String,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Commit id of the pull request's most recent commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadCommit(pub String);

impl HeadCommit {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HeadCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the gate needs to know about a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Changed files in the order the platform lists them.
    pub files: Vec<ChangedFile>,
    pub head: HeadCommit,
}

// ---------------------------------------------------------------------------
// Check runs
// ---------------------------------------------------------------------------

/// Platform-assigned check run identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckRunId(pub u64);

impl std::fmt::Display for CheckRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

impl CheckRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckRunStatus::Queued => "queued",
            CheckRunStatus::InProgress => "in_progress",
            CheckRunStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CheckRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal verdict of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
}

/// A finding pinned to a line range of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub annotation_level: AnnotationLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Structured report attached to a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A check run as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub id: CheckRunId,
    pub name: String,
    pub head_sha: String,
    pub status: CheckRunStatus,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payload for creating a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheckRun {
    pub name: String,
    pub head_sha: String,
    pub status: CheckRunStatus,
    pub started_at: DateTime<Utc>,
}

/// Payload for the single terminal update of a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRunUpdate {
    #[serde(skip)]
    pub check_run_id: CheckRunId,
    pub completed_at: DateTime<Utc>,
    pub conclusion: Conclusion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckRunOutput>,
}

// ---------------------------------------------------------------------------
// Lint results
// ---------------------------------------------------------------------------

/// Structured result returned by a lint engine that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintReport {
    pub conclusion: Conclusion,
    pub output: CheckRunOutput,
}

impl LintReport {
    pub fn success(output: CheckRunOutput) -> Self {
        Self {
            conclusion: Conclusion::Success,
            output,
        }
    }

    pub fn failure(output: CheckRunOutput) -> Self {
        Self {
            conclusion: Conclusion::Failure,
            output,
        }
    }
}

/// What came back from one lint engine invocation.
#[derive(Debug)]
pub enum LintOutcome {
    /// No violations.
    Success(CheckRunOutput),
    /// Violations found.
    Failure(CheckRunOutput),
    /// The engine raised instead of reporting.
    EngineError(EngineError),
}

impl From<Result<LintReport, EngineError>> for LintOutcome {
    fn from(result: Result<LintReport, EngineError>) -> Self {
        match result {
            Ok(LintReport {
                conclusion: Conclusion::Success,
                output,
            }) => LintOutcome::Success(output),
            Ok(LintReport {
                conclusion: Conclusion::Failure,
                output,
            }) => LintOutcome::Failure(output),
            Err(err) => LintOutcome::EngineError(err),
        }
    }
}
