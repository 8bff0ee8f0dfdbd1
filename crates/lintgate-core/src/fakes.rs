//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `MemoryPullRequestSource`, `MemoryCheckRunStore`, and
//! `ScriptedLintEngine` that satisfy the trait contracts without any
//! network or subprocess access.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{EngineError, SourceError, StoreError};
use crate::model::*;
use crate::traits::*;

// ---------------------------------------------------------------------------
// MemoryPullRequestSource
// ---------------------------------------------------------------------------

/// Pull request source answering from a fixed value.
#[derive(Debug, Default)]
pub struct MemoryPullRequestSource {
    info: Option<PullRequestInfo>,
    error: Option<String>,
    calls: Mutex<Vec<u64>>,
}

impl MemoryPullRequestSource {
    /// A source that knows one pull request.
    pub fn new(files: &[&str], head_sha: &str) -> Self {
        Self {
            info: Some(PullRequestInfo {
                files: files.iter().map(|p| ChangedFile::new(*p)).collect(),
                head: HeadCommit(head_sha.to_string()),
            }),
            ..Self::default()
        }
    }

    /// A source that finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A source whose query fails.
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Pull request numbers queried so far.
    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestSource for MemoryPullRequestSource {
    async fn pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>, SourceError> {
        self.calls.lock().unwrap().push(number);
        if let Some(message) = &self.error {
            return Err(SourceError::Transport(message.clone()));
        }
        Ok(self.info.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryCheckRunStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StoredRun {
    run: CheckRun,
    output: Option<CheckRunOutput>,
}

#[derive(Debug, Default)]
struct StoreState {
    runs: BTreeMap<u64, StoredRun>,
    next_id: u64,
    list_calls: usize,
    create_calls: usize,
    update_calls: usize,
    reject_create: Option<String>,
    reject_update: Option<String>,
}

impl StoreState {
    fn insert(&mut self, run: NewCheckRun) -> CheckRunId {
        self.next_id += 1;
        let id = CheckRunId(self.next_id);
        self.runs.insert(
            id.0,
            StoredRun {
                run: CheckRun {
                    id,
                    name: run.name,
                    head_sha: run.head_sha,
                    status: run.status,
                    conclusion: None,
                    started_at: Some(run.started_at),
                    completed_at: None,
                },
                output: None,
            },
        );
        id
    }
}

/// Check-run store backed by a `BTreeMap<id, run>`.
///
/// Enforces the single `in_progress -> completed` transition: updating a run
/// that is not in progress fails with `StoreError::InvalidState`.
#[derive(Debug, Default)]
pub struct MemoryCheckRunStore {
    state: Mutex<StoreState>,
}

impl MemoryCheckRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run directly, bypassing the call counters.
    pub fn seed(&self, name: &str, head_sha: &str, status: CheckRunStatus) -> CheckRunId {
        self.state.lock().unwrap().insert(NewCheckRun {
            name: name.to_string(),
            head_sha: head_sha.to_string(),
            status,
            started_at: chrono::Utc::now(),
        })
    }

    pub fn get(&self, id: CheckRunId) -> Option<CheckRun> {
        self.state
            .lock()
            .unwrap()
            .runs
            .get(&id.0)
            .map(|s| s.run.clone())
    }

    /// Output attached by the terminal update, if any.
    pub fn output(&self, id: CheckRunId) -> Option<CheckRunOutput> {
        self.state
            .lock()
            .unwrap()
            .runs
            .get(&id.0)
            .and_then(|s| s.output.clone())
    }

    pub fn runs(&self) -> Vec<CheckRun> {
        self.state
            .lock()
            .unwrap()
            .runs
            .values()
            .map(|s| s.run.clone())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    /// Update attempts, rejected ones included.
    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    /// Make the next `create` fail with a transport error.
    pub fn reject_next_create(&self, message: &str) {
        self.state.lock().unwrap().reject_create = Some(message.to_string());
    }

    /// Make the next `update` fail with a transport error.
    pub fn reject_next_update(&self, message: &str) {
        self.state.lock().unwrap().reject_update = Some(message.to_string());
    }
}

#[async_trait]
impl CheckRunStore for MemoryCheckRunStore {
    async fn list(
        &self,
        head: &HeadCommit,
        status: CheckRunStatus,
    ) -> StoreResult<Vec<CheckRun>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state
            .runs
            .values()
            .filter(|s| s.run.head_sha == head.as_str() && s.run.status == status)
            .map(|s| s.run.clone())
            .collect())
    }

    async fn create(&self, run: NewCheckRun) -> StoreResult<CheckRunId> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(message) = state.reject_create.take() {
            return Err(StoreError::Transport(message));
        }
        Ok(state.insert(run))
    }

    async fn update(&self, update: CheckRunUpdate) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        if let Some(message) = state.reject_update.take() {
            return Err(StoreError::Transport(message));
        }
        let id = update.check_run_id;
        let stored = state
            .runs
            .get_mut(&id.0)
            .ok_or(StoreError::NotFound { id: id.0 })?;
        if stored.run.status != CheckRunStatus::InProgress {
            return Err(StoreError::InvalidState {
                id: id.0,
                status: stored.run.status.to_string(),
            });
        }
        stored.run.status = CheckRunStatus::Completed;
        stored.run.conclusion = Some(update.conclusion);
        stored.run.completed_at = Some(update.completed_at);
        stored.output = update.output;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedLintEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Script {
    Report(LintReport),
    Error(String),
}

/// Lint engine that returns a preset result and records what it was given.
#[derive(Debug)]
pub struct ScriptedLintEngine {
    script: Script,
    received: Mutex<Vec<Vec<String>>>,
}

impl ScriptedLintEngine {
    pub fn reporting(report: LintReport) -> Self {
        Self {
            script: Script::Report(report),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Reports success with an empty output.
    pub fn passing() -> Self {
        Self::reporting(LintReport::success(CheckRunOutput {
            title: "0 error(s), 0 warning(s)".to_string(),
            summary: "No problems found".to_string(),
            annotations: Vec::new(),
        }))
    }

    /// Raises `EngineError::Internal(message)`.
    pub fn erroring(message: &str) -> Self {
        Self {
            script: Script::Error(message.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Path lists passed to `run`, one entry per call.
    pub fn received(&self) -> Vec<Vec<String>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl LintEngine for ScriptedLintEngine {
    async fn run(&self, paths: &[String]) -> Result<LintReport, EngineError> {
        self.received.lock().unwrap().push(paths.to_vec());
        match &self.script {
            Script::Report(report) => Ok(report.clone()),
            Script::Error(message) => Err(EngineError::Internal(message.clone())),
        }
    }
}
