//! Terminal update of the gate's check run.
//!
//! Every invocation that reaches the lint stage ends here exactly once.
//! Each branch leaves the check run `completed`:
//!
//! - success          -> `completed/success` with the engine's output
//! - lint violations  -> `completed/failure` with the engine's output
//! - engine error     -> `completed/failure` without output
//!
//! If the update carrying the engine's output is itself rejected, the run is
//! finalized through the engine-error branch with the rejection's message.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::coordinator::CheckRunHandle;
use crate::gate::GateOutcome;
use crate::model::{CheckRunOutput, CheckRunUpdate, Conclusion, LintOutcome};
use crate::traits::{CheckRunStore, StoreResult};

/// Process failure message for lint violations.
pub const LINT_FAILURE_MESSAGE: &str = "ESLint found some errors";

pub struct ReportPublisher {
    store: Arc<dyn CheckRunStore>,
}

impl ReportPublisher {
    pub fn new(store: Arc<dyn CheckRunStore>) -> Self {
        Self { store }
    }

    /// Complete the check run at `handle` according to `outcome`.
    ///
    /// `Err` only when the failure-path update itself cannot be delivered;
    /// the check run is then left to the platform.
    pub async fn finalize(
        &self,
        handle: &CheckRunHandle,
        outcome: LintOutcome,
    ) -> StoreResult<GateOutcome> {
        let (conclusion, output) = match outcome {
            LintOutcome::Success(output) => (Conclusion::Success, output),
            LintOutcome::Failure(output) => (Conclusion::Failure, output),
            LintOutcome::EngineError(err) => {
                error!(check_run_id = %handle.id, error = %err, "Lint engine failed");
                return self.fail(handle, err.to_string()).await;
            }
        };

        match self.complete(handle, conclusion, output).await {
            Ok(()) => {
                info!(
                    check_run_id = %handle.id,
                    conclusion = conclusion.as_str(),
                    "Check run completed"
                );
                Ok(match conclusion {
                    Conclusion::Success => GateOutcome::Passed {
                        check_run_id: handle.id,
                    },
                    Conclusion::Failure => GateOutcome::Failed {
                        check_run_id: handle.id,
                        message: LINT_FAILURE_MESSAGE.to_string(),
                    },
                })
            }
            Err(err) => {
                warn!(check_run_id = %handle.id, error = %err, "Report update rejected");
                self.fail(handle, err.to_string()).await
            }
        }
    }

    async fn complete(
        &self,
        handle: &CheckRunHandle,
        conclusion: Conclusion,
        output: CheckRunOutput,
    ) -> StoreResult<()> {
        self.store
            .update(CheckRunUpdate {
                check_run_id: handle.id,
                completed_at: Utc::now(),
                conclusion,
                output: Some(output),
            })
            .await
    }

    async fn fail(&self, handle: &CheckRunHandle, message: String) -> StoreResult<GateOutcome> {
        self.store
            .update(CheckRunUpdate {
                check_run_id: handle.id,
                completed_at: Utc::now(),
                conclusion: Conclusion::Failure,
                output: None,
            })
            .await?;
        info!(check_run_id = %handle.id, "Check run completed as failure");
        Ok(GateOutcome::Failed {
            check_run_id: handle.id,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::fakes::MemoryCheckRunStore;
    use crate::model::{Annotation, AnnotationLevel, CheckRunStatus};

    fn output() -> CheckRunOutput {
        CheckRunOutput {
            title: "1 error(s), 0 warning(s)".to_string(),
            summary: "a.ts: 1 error(s)".to_string(),
            annotations: vec![Annotation {
                path: "a.ts".to_string(),
                start_line: 3,
                end_line: 3,
                annotation_level: AnnotationLevel::Failure,
                message: "Unexpected var".to_string(),
                title: Some("no-var".to_string()),
            }],
        }
    }

    fn setup() -> (Arc<MemoryCheckRunStore>, CheckRunHandle, ReportPublisher) {
        let store = Arc::new(MemoryCheckRunStore::new());
        let id = store.seed("ESLint", "abc123", CheckRunStatus::InProgress);
        let publisher = ReportPublisher::new(store.clone());
        (store, CheckRunHandle { id, reused: true }, publisher)
    }

    #[tokio::test]
    async fn test_success_completes_with_output() {
        let (store, handle, publisher) = setup();

        let outcome = publisher
            .finalize(&handle, LintOutcome::Success(output()))
            .await
            .unwrap();

        assert!(outcome.is_success());
        let run = store.get(handle.id).unwrap();
        assert_eq!(run.status, CheckRunStatus::Completed);
        assert_eq!(run.conclusion, Some(Conclusion::Success));
        assert!(run.completed_at.is_some());
        assert_eq!(store.output(handle.id), Some(output()));
        assert_eq!(store.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_completes_with_output_and_fails_process() {
        let (store, handle, publisher) = setup();

        let outcome = publisher
            .finalize(&handle, LintOutcome::Failure(output()))
            .await
            .unwrap();

        assert_eq!(outcome.failure_message(), Some(LINT_FAILURE_MESSAGE));
        let run = store.get(handle.id).unwrap();
        assert_eq!(run.conclusion, Some(Conclusion::Failure));
        assert_eq!(store.output(handle.id), Some(output()));
    }

    #[tokio::test]
    async fn test_engine_error_completes_without_output() {
        let (store, handle, publisher) = setup();

        let outcome = publisher
            .finalize(
                &handle,
                LintOutcome::EngineError(EngineError::Internal("eslint crashed".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(outcome.failure_message(), Some("eslint crashed"));
        let run = store.get(handle.id).unwrap();
        assert_eq!(run.status, CheckRunStatus::Completed);
        assert_eq!(run.conclusion, Some(Conclusion::Failure));
        assert_eq!(store.output(handle.id), None);
        assert_eq!(store.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_report_update_falls_back_to_failure() {
        let (store, handle, publisher) = setup();
        store.reject_next_update("output too large");

        let outcome = publisher
            .finalize(&handle, LintOutcome::Success(output()))
            .await
            .unwrap();

        assert_eq!(
            outcome.failure_message(),
            Some("Check run request failed: output too large")
        );
        let run = store.get(handle.id).unwrap();
        assert_eq!(run.status, CheckRunStatus::Completed);
        assert_eq!(run.conclusion, Some(Conclusion::Failure));
        assert_eq!(store.output(handle.id), None);
    }
}
