//! Scripted executor for tests
//!
//! `MockExecutorClient` replays a fixed sequence of status responses and
//! records every call so tests can assert on cadence and cleanup.

use super::r#trait::{ContentFetcher, ExecutorClient};
use crate::state::TaskStatus;
use crate::task::{FileId, StoredFile, TaskDetail, TaskHandle, TaskId, TaskSpec, WorkspaceId};
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_foundation::{Error, Result};
use std::collections::{HashMap, VecDeque};
use tokio::time::Instant;

/// One scripted answer to `get_task_status`
#[derive(Debug, Clone)]
pub enum StatusStep {
    Snapshot(TaskDetail),
    Fail(String),
}

/// Executor that replays scripted status responses
///
/// Once the script is exhausted the last snapshot is repeated, so a script of
/// `[pending]` keeps the task pending forever.
pub struct MockExecutorClient {
    next_task_id: Mutex<u64>,
    script: Mutex<VecDeque<StatusStep>>,
    last_snapshot: Mutex<Option<TaskDetail>>,
    files: Mutex<Vec<StoredFile>>,
    submit_error: Mutex<Option<String>>,
    list_error: Mutex<Option<String>>,
    delete_error: Mutex<Option<String>>,
    /// Submitted specs, in order
    pub submitted: Mutex<Vec<TaskSpec>>,
    /// Instants at which `get_task_status` was called
    pub status_calls: Mutex<Vec<Instant>>,
    /// Number of `list_files` calls
    pub list_calls: Mutex<usize>,
    /// Deletion attempts: (workspace, file id)
    pub deleted: Mutex<Vec<(WorkspaceId, FileId)>>,
}

impl Default for MockExecutorClient {
    fn default() -> Self {
        Self {
            next_task_id: Mutex::new(1),
            script: Mutex::new(VecDeque::new()),
            last_snapshot: Mutex::new(None),
            files: Mutex::new(Vec::new()),
            submit_error: Mutex::new(None),
            list_error: Mutex::new(None),
            delete_error: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl MockExecutorClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a status sequence for `task_id`, one step per poll
    pub fn with_statuses(task_id: u64, statuses: &[TaskStatus]) -> Self {
        let mock = Self::new();
        for status in statuses {
            mock.push_snapshot(TaskDetail::new(task_id, *status));
        }
        mock
    }

    /// Id handed out by the next `submit_task`
    pub fn set_next_task_id(&self, id: u64) {
        *self.next_task_id.lock() = id;
    }

    pub fn push_snapshot(&self, detail: TaskDetail) {
        self.script.lock().push_back(StatusStep::Snapshot(detail));
    }

    pub fn push_status_error(&self, message: impl Into<String>) {
        self.script.lock().push_back(StatusStep::Fail(message.into()));
    }

    pub fn add_file(&self, file: StoredFile) {
        self.files.lock().push(file);
    }

    pub fn fail_submit(&self, message: impl Into<String>) {
        *self.submit_error.lock() = Some(message.into());
    }

    pub fn fail_list_files(&self, message: impl Into<String>) {
        *self.list_error.lock() = Some(message.into());
    }

    pub fn fail_delete(&self, message: impl Into<String>) {
        *self.delete_error.lock() = Some(message.into());
    }

    /// Number of status polls received so far
    pub fn poll_count(&self) -> usize {
        self.status_calls.lock().len()
    }

    /// Files still stored (deleted ones are removed)
    pub fn remaining_files(&self) -> Vec<StoredFile> {
        self.files.lock().clone()
    }
}

#[async_trait]
impl ExecutorClient for MockExecutorClient {
    async fn submit_task(&self, spec: &TaskSpec) -> Result<TaskHandle> {
        if let Some(message) = self.submit_error.lock().clone() {
            return Err(Error::api(401, message));
        }
        self.submitted.lock().push(spec.clone());
        let mut next = self.next_task_id.lock();
        let id = TaskId::from(*next);
        *next += 1;
        Ok(TaskHandle { id })
    }

    async fn get_task_status(
        &self,
        task_id: &TaskId,
        _workspace: WorkspaceId,
    ) -> Result<TaskDetail> {
        self.status_calls.lock().push(Instant::now());

        let step = self.script.lock().pop_front();
        match step {
            Some(StatusStep::Snapshot(detail)) => {
                *self.last_snapshot.lock() = Some(detail.clone());
                Ok(detail)
            }
            Some(StatusStep::Fail(message)) => Err(Error::Http(message)),
            None => self
                .last_snapshot
                .lock()
                .clone()
                .ok_or_else(|| Error::NotFound(format!("task {}", task_id))),
        }
    }

    async fn list_files(&self, _workspace: WorkspaceId) -> Result<Vec<StoredFile>> {
        *self.list_calls.lock() += 1;
        if let Some(message) = self.list_error.lock().clone() {
            return Err(Error::Http(message));
        }
        Ok(self.files.lock().clone())
    }

    async fn delete_file(&self, workspace: WorkspaceId, file_id: &FileId) -> Result<()> {
        self.deleted.lock().push((workspace, file_id.clone()));
        if let Some(message) = self.delete_error.lock().clone() {
            return Err(Error::Http(message));
        }
        self.files.lock().retain(|f| &f.id != file_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Content fetcher serving canned bodies by URL
#[derive(Default)]
pub struct MockContentFetcher {
    bodies: Mutex<HashMap<String, String>>,
    /// URLs requested, in order
    pub fetched: Mutex<Vec<String>>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.lock().insert(url.into(), body.into());
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetched.lock().push(url.to_string());
        self.bodies
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::api(404, format!("no content at {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_repeats_last_snapshot() {
        let mock = MockExecutorClient::with_statuses(3, &[TaskStatus::Pending]);
        let id = TaskId::from(3u64);

        for _ in 0..3 {
            let detail = mock.get_task_status(&id, WorkspaceId(1)).await.unwrap();
            assert_eq!(detail.status, TaskStatus::Pending);
        }
        assert_eq!(mock.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_submit_allocates_ids() {
        let mock = MockExecutorClient::new();
        mock.set_next_task_id(42);
        let spec = TaskSpec::new(WorkspaceId(1), crate::task::AgentId(2), "d", "i");

        let first = mock.submit_task(&spec).await.unwrap();
        let second = mock.submit_task(&spec).await.unwrap();
        assert_eq!(first.id.as_str(), "42");
        assert_eq!(second.id.as_str(), "43");
        assert_eq!(mock.submitted.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let mock = MockExecutorClient::new();
        mock.add_file(StoredFile::new("1", "a.txt", "http://f/a"));

        mock.delete_file(WorkspaceId(1), &FileId::new("1")).await.unwrap();
        assert!(mock.remaining_files().is_empty());
        assert_eq!(mock.deleted.lock().len(), 1);
    }
}
