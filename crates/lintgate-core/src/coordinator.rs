//! Find-or-create of the check run that carries this gate's status.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::DEFAULT_CHECK_NAME;
use crate::model::{CheckRunId, CheckRunStatus, HeadCommit, NewCheckRun};
use crate::traits::{CheckRunStore, StoreResult};

/// The one check run an invocation reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckRunHandle {
    pub id: CheckRunId,

    /// Whether an existing in-progress run was picked up.
    pub reused: bool,
}

pub struct CheckRunCoordinator {
    store: Arc<dyn CheckRunStore>,
}

impl CheckRunCoordinator {
    pub fn new(store: Arc<dyn CheckRunStore>) -> Self {
        Self { store }
    }

    /// Obtain the handle for `head`.
    ///
    /// With a `configured_name`, an in-progress run of that name on `head` is
    /// reused, so retried invocations converge on one record. Otherwise a new
    /// in-progress run named [`DEFAULT_CHECK_NAME`] is created.
    ///
    /// Two invocations racing on the same commit can both miss each other and
    /// create separate runs.
    pub async fn acquire(
        &self,
        head: &HeadCommit,
        configured_name: Option<&str>,
    ) -> StoreResult<CheckRunHandle> {
        if let Some(name) = configured_name.filter(|n| !n.is_empty()) {
            let runs = self.store.list(head, CheckRunStatus::InProgress).await?;
            debug!(head_sha = %head, candidates = runs.len(), "Listed in-progress check runs");
            if let Some(run) = runs.into_iter().find(|run| run.name == name) {
                info!(check_run_id = %run.id, name, "Reusing in-progress check run");
                return Ok(CheckRunHandle {
                    id: run.id,
                    reused: true,
                });
            }
        }

        let id = self
            .store
            .create(NewCheckRun {
                name: DEFAULT_CHECK_NAME.to_string(),
                head_sha: head.as_str().to_string(),
                status: CheckRunStatus::InProgress,
                started_at: Utc::now(),
            })
            .await?;
        info!(check_run_id = %id, head_sha = %head, "Created check run");

        Ok(CheckRunHandle { id, reused: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemoryCheckRunStore;

    fn head() -> HeadCommit {
        HeadCommit("abc123".to_string())
    }

    #[tokio::test]
    async fn test_reuses_matching_in_progress_run() {
        let store = Arc::new(MemoryCheckRunStore::new());
        let existing = store.seed("lint", "abc123", CheckRunStatus::InProgress);
        let coordinator = CheckRunCoordinator::new(store.clone());

        let handle = coordinator.acquire(&head(), Some("lint")).await.unwrap();

        assert_eq!(handle.id, existing);
        assert!(handle.reused);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_creates_when_no_name_configured() {
        let store = Arc::new(MemoryCheckRunStore::new());
        store.seed("lint", "abc123", CheckRunStatus::InProgress);
        let coordinator = CheckRunCoordinator::new(store.clone());

        let handle = coordinator.acquire(&head(), None).await.unwrap();

        assert!(!handle.reused);
        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.list_calls(), 0);
        let run = store.get(handle.id).unwrap();
        assert_eq!(run.name, DEFAULT_CHECK_NAME);
        assert_eq!(run.status, CheckRunStatus::InProgress);
        assert_eq!(run.head_sha, "abc123");
        assert!(run.started_at.is_some());
    }

    #[tokio::test]
    async fn test_creates_when_name_does_not_match() {
        let store = Arc::new(MemoryCheckRunStore::new());
        store.seed("other", "abc123", CheckRunStatus::InProgress);
        let coordinator = CheckRunCoordinator::new(store.clone());

        let handle = coordinator.acquire(&head(), Some("lint")).await.unwrap();

        assert!(!handle.reused);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_ignores_completed_run_and_other_commits() {
        let store = Arc::new(MemoryCheckRunStore::new());
        store.seed("lint", "abc123", CheckRunStatus::Completed);
        store.seed("lint", "def456", CheckRunStatus::InProgress);
        let coordinator = CheckRunCoordinator::new(store.clone());

        let handle = coordinator.acquire(&head(), Some("lint")).await.unwrap();

        assert!(!handle.reused);
        assert_eq!(store.create_calls(), 1);
    }
}
