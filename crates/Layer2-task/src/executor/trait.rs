//! Executor client traits

use crate::task::{FileId, StoredFile, TaskDetail, TaskHandle, TaskId, TaskSpec, WorkspaceId};
use async_trait::async_trait;
use relay_foundation::Result;

/// Executor client trait - implement to talk to a task-execution backend
///
/// Implementations are shared across concurrent tracking sessions and must
/// be safe to call from several tasks at once.
#[async_trait]
pub trait ExecutorClient: Send + Sync {
    /// Create a task
    async fn submit_task(&self, spec: &TaskSpec) -> Result<TaskHandle>;

    /// Fetch the current status snapshot of a task
    async fn get_task_status(&self, task_id: &TaskId, workspace: WorkspaceId)
        -> Result<TaskDetail>;

    /// List all files visible in a workspace
    async fn list_files(&self, workspace: WorkspaceId) -> Result<Vec<StoredFile>>;

    /// Delete a stored file
    async fn delete_file(&self, workspace: WorkspaceId, file_id: &FileId) -> Result<()>;

    /// Get client name
    fn name(&self) -> &'static str;
}

/// Downloads stored file content from its content URL
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
