//! Completion tracker - submit, poll, resolve
//!
//! Composes [`TaskSubmitter`], [`StatusPoller`] and [`ResultResolver`] into a
//! single call that ends in exactly one outcome: a result, a failure, or a
//! timeout. Each call runs its own session; trackers can be shared freely
//! between concurrent callers.

use crate::channel::ResponseChannel;
use crate::executor::{ContentFetcher, ExecutorClient};
use crate::poller::{PollOutcome, StatusPoller};
use crate::resolver::ResultResolver;
use crate::session::TrackingBudget;
use crate::submitter::TaskSubmitter;
use crate::task::{TaskId, TaskSpec, WorkspaceId};
use relay_foundation::Result;
use std::sync::Arc;
use tracing::info;

/// Reply used when the budget runs out before the task finishes
pub const TIMEOUT_MESSAGE: &str = "Timeout. The task might still be processing.";

/// Terminal outcome of a tracking call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Task finished; resolved result text
    Completed(String),

    /// Executor reported `error`
    Failed,

    /// Budget exhausted; the task may still be running
    TimedOut,
}

impl TrackOutcome {
    /// `Some(result)`, `None` on failure, or `Some(TIMEOUT_MESSAGE)`
    pub fn into_reply(self) -> Option<String> {
        match self {
            TrackOutcome::Completed(result) => Some(result),
            TrackOutcome::Failed => None,
            TrackOutcome::TimedOut => Some(TIMEOUT_MESSAGE.to_string()),
        }
    }
}

/// Tracks submitted tasks to completion
#[derive(Clone)]
pub struct CompletionTracker {
    client: Arc<dyn ExecutorClient>,
    submitter: TaskSubmitter,
    poller: StatusPoller,
    resolver: ResultResolver,
}

impl CompletionTracker {
    /// Create a tracker with the default budget (120s, polled every 5s)
    pub fn new(client: Arc<dyn ExecutorClient>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            submitter: TaskSubmitter::new(Arc::clone(&client)),
            poller: StatusPoller::new(Arc::clone(&client), TrackingBudget::default()),
            resolver: ResultResolver::new(Arc::clone(&client), fetcher),
            client,
        }
    }

    /// Set the tracking budget
    pub fn with_budget(mut self, budget: TrackingBudget) -> Self {
        self.poller = StatusPoller::new(Arc::clone(&self.client), budget);
        self
    }

    pub fn budget(&self) -> TrackingBudget {
        self.poller.budget()
    }

    pub fn submitter(&self) -> &TaskSubmitter {
        &self.submitter
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// Track an already submitted task to its terminal outcome
    pub async fn track(
        &self,
        task_id: TaskId,
        workspace: WorkspaceId,
        channel: &dyn ResponseChannel,
    ) -> TrackOutcome {
        match self.poller.poll_until_terminal(task_id, workspace, channel).await {
            PollOutcome::Done(detail) => {
                info!("Task {} completed", detail.id);
                TrackOutcome::Completed(self.resolver.resolve(workspace, &detail).await)
            }
            PollOutcome::Failed(_) => TrackOutcome::Failed,
            PollOutcome::TimedOut => TrackOutcome::TimedOut,
        }
    }

    /// Result text, `None` if the task failed, or the timeout message
    pub async fn track_to_completion(
        &self,
        task_id: TaskId,
        workspace: WorkspaceId,
        channel: &dyn ResponseChannel,
    ) -> Option<String> {
        self.track(task_id, workspace, channel).await.into_reply()
    }

    /// Submit a spec and track it. Submission errors are returned as-is.
    pub async fn submit_and_track(
        &self,
        spec: TaskSpec,
        channel: &dyn ResponseChannel,
    ) -> Result<TrackOutcome> {
        let task = self.submitter.submit(spec).await?;
        let outcome = self.track(task.id.clone(), task.workspace, channel).await;
        info!(
            "Task {} ({}) submitted at {} ended: {:?}",
            task.id,
            task.description,
            task.submitted_at.to_rfc3339(),
            outcome
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_replies() {
        assert_eq!(
            TrackOutcome::Completed("42".into()).into_reply(),
            Some("42".to_string())
        );
        assert_eq!(TrackOutcome::Failed.into_reply(), None);
        assert_eq!(
            TrackOutcome::TimedOut.into_reply(),
            Some(TIMEOUT_MESSAGE.to_string())
        );
    }
}
