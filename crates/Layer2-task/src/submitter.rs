//! Task submission

use crate::executor::ExecutorClient;
use crate::task::{SubmittedTask, TaskSpec};
use chrono::Utc;
use relay_foundation::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Creates tasks on the executor
#[derive(Clone)]
pub struct TaskSubmitter {
    client: Arc<dyn ExecutorClient>,
}

impl TaskSubmitter {
    pub fn new(client: Arc<dyn ExecutorClient>) -> Self {
        Self { client }
    }

    /// Submit a task spec
    ///
    /// Any executor failure comes back as `Error::Submission`; no tracking
    /// session should be started for it.
    pub async fn submit(&self, spec: TaskSpec) -> Result<SubmittedTask> {
        if spec.description.trim().is_empty() {
            return Err(Error::InvalidInput("task description is empty".into()));
        }
        if spec.input.trim().is_empty() {
            return Err(Error::InvalidInput("task input is empty".into()));
        }

        let handle = self.client.submit_task(&spec).await.map_err(|e| {
            error!("Task submission to {} failed: {}", self.client.name(), e);
            Error::submission(e)
        })?;

        info!(
            "Task created with ID: {} (workspace {}, assignee {})",
            handle.id, spec.workspace, spec.assignee
        );

        Ok(SubmittedTask {
            id: handle.id,
            workspace: spec.workspace,
            description: spec.description,
            submitted_at: Utc::now(),
        })
    }
}
