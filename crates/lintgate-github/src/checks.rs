//! Check-run operations over the REST API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lintgate_core::{
    CheckRun, CheckRunId, CheckRunStatus, CheckRunStore, CheckRunUpdate, Conclusion, HeadCommit,
    NewCheckRun, StoreResult,
};
use serde::Deserialize;
use tracing::debug;

use crate::client::GithubClient;

/// Check runs requested per page when listing.
pub const CHECK_RUNS_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct CheckRunList {
    #[serde(default)]
    check_runs: Vec<WireCheckRun>,
}

/// Check run as GitHub sends it. Status and conclusion carry more values
/// than the gate distinguishes.
#[derive(Debug, Deserialize)]
struct WireCheckRun {
    id: u64,
    name: String,
    head_sha: String,
    status: String,
    conclusion: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<WireCheckRun> for CheckRun {
    fn from(run: WireCheckRun) -> Self {
        let status = match run.status.as_str() {
            "in_progress" => CheckRunStatus::InProgress,
            "completed" => CheckRunStatus::Completed,
            _ => CheckRunStatus::Queued,
        };
        let conclusion = match run.conclusion.as_deref() {
            Some("success") => Some(Conclusion::Success),
            Some("failure") => Some(Conclusion::Failure),
            _ => None,
        };
        CheckRun {
            id: CheckRunId(run.id),
            name: run.name,
            head_sha: run.head_sha,
            status,
            conclusion,
            started_at: run.started_at,
            completed_at: run.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[async_trait]
impl CheckRunStore for GithubClient {
    async fn list(
        &self,
        head: &HeadCommit,
        status: CheckRunStatus,
    ) -> StoreResult<Vec<CheckRun>> {
        let url = self.repo_url(&format!("commits/{}/check-runs", head.as_str()));
        let mut runs = Vec::new();
        let mut page = 1usize;

        loop {
            let query = [
                ("status", status.as_str().to_string()),
                ("per_page", CHECK_RUNS_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let list: CheckRunList = self.get(&url, &query).await?;
            let fetched = list.check_runs.len();
            runs.extend(list.check_runs.into_iter().map(CheckRun::from));
            if fetched < CHECK_RUNS_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        debug!(head_sha = %head, status = %status, count = runs.len(), "Listed check runs");
        Ok(runs)
    }

    async fn create(&self, run: NewCheckRun) -> StoreResult<CheckRunId> {
        let created: Created = self.post(&self.repo_url("check-runs"), &run).await?;
        Ok(CheckRunId(created.id))
    }

    async fn update(&self, update: CheckRunUpdate) -> StoreResult<()> {
        let url = self.repo_url(&format!("check-runs/{}", update.check_run_id));
        self.patch(&url, &update).await?;
        Ok(())
    }
}
