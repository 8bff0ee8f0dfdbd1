//! One gate invocation, end to end.
//!
//! Remote calls are awaited one at a time in this order:
//! pull request query, check-run list/create, lint engine, check-run update.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GateConfig;
use crate::coordinator::CheckRunCoordinator;
use crate::error::GateError;
use crate::model::{CheckRunId, LintOutcome};
use crate::pattern::excluded_among;
use crate::publisher::ReportPublisher;
use crate::select::select;
use crate::traits::{CheckRunStore, LintEngine, PullRequestSource};

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    /// The pull request could not be found; nothing was touched.
    NoPullRequest,

    /// No changed file qualified for linting; nothing was touched.
    NothingToLint,

    /// The check run completed as `success`.
    Passed { check_run_id: CheckRunId },

    /// The check run completed as `failure`; the process must fail too.
    Failed {
        check_run_id: CheckRunId,
        message: String,
    },
}

impl GateOutcome {
    /// Whether the process should exit successfully.
    pub fn is_success(&self) -> bool {
        !matches!(self, GateOutcome::Failed { .. })
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            GateOutcome::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn check_run_id(&self) -> Option<CheckRunId> {
        match self {
            GateOutcome::Passed { check_run_id } | GateOutcome::Failed { check_run_id, .. } => {
                Some(*check_run_id)
            }
            _ => None,
        }
    }
}

/// The lint gate wired to its collaborators.
pub struct LintGate {
    source: Arc<dyn PullRequestSource>,
    store: Arc<dyn CheckRunStore>,
    engine: Arc<dyn LintEngine>,
}

impl LintGate {
    pub fn new(
        source: Arc<dyn PullRequestSource>,
        store: Arc<dyn CheckRunStore>,
        engine: Arc<dyn LintEngine>,
    ) -> Self {
        Self {
            source,
            store,
            engine,
        }
    }

    /// Run one invocation.
    ///
    /// Errors before a check run is acquired propagate as `Err`. Once a
    /// check run exists, engine failures finalize it as `failure` and come
    /// back as [`GateOutcome::Failed`].
    pub async fn run(&self, config: &GateConfig) -> Result<GateOutcome, GateError> {
        let Some(pr) = self.source.pull_request(config.pr_number).await? else {
            warn!(pr_number = config.pr_number, "No PR info retrieved");
            return Ok(GateOutcome::NoPullRequest);
        };
        info!(
            pr_number = config.pr_number,
            head_sha = %pr.head,
            changed = pr.files.len(),
            "Fetched pull request"
        );

        let excluded = excluded_among(&config.ignore_file_path(), &config.root, &pr.files)?;
        debug!(ignored = ?excluded, "Ignored files");

        let targets = select(&pr.files, &config.extensions, &excluded);
        if targets.is_empty() {
            let extensions: Vec<&str> = config.extensions.iter().map(String::as_str).collect();
            warn!(
                "No files with [{}] extensions added or modified in this PR, nothing to lint...",
                extensions.join(", ")
            );
            return Ok(GateOutcome::NothingToLint);
        }
        info!(targets = targets.len(), files = ?targets.paths(), "Files to lint");

        let handle = CheckRunCoordinator::new(self.store.clone())
            .acquire(&pr.head, config.check_name.as_deref())
            .await?;

        let outcome = LintOutcome::from(self.engine.run(targets.paths()).await);

        let result = ReportPublisher::new(self.store.clone())
            .finalize(&handle, outcome)
            .await?;
        Ok(result)
    }
}
