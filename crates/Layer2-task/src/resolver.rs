//! Result resolution for completed tasks
//!
//! A finished task can carry its result two ways: as a file attachment in the
//! workspace, or as inline output. Attachments win. Anything that goes wrong
//! while reading an attachment falls back to the inline output, and a
//! completed task always resolves to some text.

use crate::executor::{ContentFetcher, ExecutorClient};
use crate::task::{Attachment, StoredFile, TaskDetail, WorkspaceId};
use relay_foundation::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Returned when a completed task has neither a file nor inline output
pub const COMPLETED_PLACEHOLDER: &str = "Task completed.";

/// Returned when the matched result file is empty
pub const EMPTY_FILE_PLACEHOLDER: &str = "Task completed but could not retrieve result.";

/// First file whose storage path contains any attachment path
///
/// This is a best-effort association, not a unique join: several files may
/// match and the first one listed wins. Empty attachment paths are skipped.
pub fn find_result_file<'a>(
    files: &'a [StoredFile],
    attachments: &[Attachment],
) -> Option<&'a StoredFile> {
    files.iter().find(|file| {
        attachments
            .iter()
            .any(|att| !att.path.is_empty() && file.path.contains(att.path.as_str()))
    })
}

/// Turns a `done` task into its result text
#[derive(Clone)]
pub struct ResultResolver {
    client: Arc<dyn ExecutorClient>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl ResultResolver {
    pub fn new(client: Arc<dyn ExecutorClient>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { client, fetcher }
    }

    /// Resolve the result of a completed task. Never fails, never empty.
    pub async fn resolve(&self, workspace: WorkspaceId, detail: &TaskDetail) -> String {
        if !detail.attachments.is_empty() {
            match self.read_attachment(workspace, detail).await {
                Ok(Some(content)) => return content,
                Ok(None) => debug!(
                    "No stored file matches the {} attachment(s) of task {}",
                    detail.attachments.len(),
                    detail.id
                ),
                Err(e) => error!("Error reading result file for task {}: {}", detail.id, e),
            }
        }

        if let Some(output) = detail.inline_output() {
            return output.to_string();
        }

        COMPLETED_PLACEHOLDER.to_string()
    }

    /// Fetch the matched attachment and clean it up. `Ok(None)` when no file matches.
    async fn read_attachment(
        &self,
        workspace: WorkspaceId,
        detail: &TaskDetail,
    ) -> Result<Option<String>> {
        let files = self.client.list_files(workspace).await?;
        let Some(file) = find_result_file(&files, &detail.attachments) else {
            return Ok(None);
        };

        info!("Reading result file {} ({}) for task {}", file.id, file.path, detail.id);
        let content = self.fetcher.fetch(&file.full_url).await?;

        if let Err(e) = self.client.delete_file(workspace, &file.id).await {
            debug!("Cleanup of file {} failed (ignored): {}", file.id, e);
        }

        if content.is_empty() {
            return Ok(Some(EMPTY_FILE_PLACEHOLDER.to_string()));
        }
        Ok(Some(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{MockContentFetcher, MockExecutorClient};
    use crate::state::TaskStatus;
    use crate::task::FileId;

    fn files() -> Vec<StoredFile> {
        vec![
            StoredFile::new("1", "workspace/notes.txt", "http://files/1"),
            StoredFile::new("2", "workspace/tasks/42/answer.md", "http://files/2"),
            StoredFile::new("3", "archive/tasks/42/answer.md", "http://files/3"),
        ]
    }

    fn resolver(
        mock: &Arc<MockExecutorClient>,
        fetcher: &Arc<MockContentFetcher>,
    ) -> ResultResolver {
        ResultResolver::new(mock.clone(), fetcher.clone())
    }

    #[test]
    fn test_find_first_of_multiple_matches() {
        let files = files();
        let found = find_result_file(&files, &[Attachment::new("tasks/42/answer.md")]);
        assert_eq!(found.map(|f| f.id.as_str()), Some("2"));
    }

    #[test]
    fn test_find_any_attachment() {
        let files = files();
        let found = find_result_file(
            &files,
            &[Attachment::new("missing.md"), Attachment::new("notes.txt")],
        );
        assert_eq!(found.map(|f| f.id.as_str()), Some("1"));
    }

    #[test]
    fn test_find_no_match() {
        let files = files();
        assert!(find_result_file(&files, &[Attachment::new("other.md")]).is_none());
        assert!(find_result_file(&files, &[]).is_none());
    }

    #[test]
    fn test_empty_attachment_path_matches_nothing() {
        let files = files();
        assert!(find_result_file(&files, &[Attachment::new("")]).is_none());
    }

    #[tokio::test]
    async fn test_attachment_wins_and_is_deleted() {
        let mock = Arc::new(MockExecutorClient::new());
        for file in files() {
            mock.add_file(file);
        }
        let fetcher = Arc::new(MockContentFetcher::new());
        fetcher.serve("http://files/2", "file answer");

        let detail = TaskDetail::new(42u64, TaskStatus::Done)
            .with_output("inline answer")
            .with_attachment("tasks/42/answer.md");

        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, "file answer");
        assert_eq!(
            mock.deleted.lock().clone(),
            vec![(WorkspaceId(1), FileId::new("2"))]
        );
    }

    #[tokio::test]
    async fn test_unmatched_attachment_falls_back_to_output() {
        let mock = Arc::new(MockExecutorClient::new());
        for file in files() {
            mock.add_file(file);
        }
        let fetcher = Arc::new(MockContentFetcher::new());

        let detail = TaskDetail::new(42u64, TaskStatus::Done)
            .with_output("inline answer")
            .with_attachment("nowhere/result.md");

        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, "inline answer");
        assert!(fetcher.fetched.lock().is_empty());
        assert!(mock.deleted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_falls_back_without_delete() {
        let mock = Arc::new(MockExecutorClient::new());
        mock.add_file(StoredFile::new("9", "out/result.txt", "http://files/9"));
        // fetcher serves nothing: 404
        let fetcher = Arc::new(MockContentFetcher::new());

        let detail = TaskDetail::new(1u64, TaskStatus::Done)
            .with_output("inline")
            .with_attachment("result.txt");

        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, "inline");
        assert_eq!(fetcher.fetched.lock().len(), 1);
        assert!(mock.deleted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_list_error_falls_back_to_placeholder() {
        let mock = Arc::new(MockExecutorClient::new());
        mock.fail_list_files("503 from file service");
        let fetcher = Arc::new(MockContentFetcher::new());

        let detail = TaskDetail::new(1u64, TaskStatus::Done).with_attachment("result.txt");
        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, COMPLETED_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_delete_failure_is_ignored() {
        let mock = Arc::new(MockExecutorClient::new());
        mock.add_file(StoredFile::new("4", "out/answer.txt", "http://files/4"));
        mock.fail_delete("forbidden");
        let fetcher = Arc::new(MockContentFetcher::new());
        fetcher.serve("http://files/4", "from file");

        let detail = TaskDetail::new(1u64, TaskStatus::Done).with_attachment("answer.txt");
        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, "from file");
        assert_eq!(mock.deleted.lock().len(), 1);
        assert_eq!(mock.remaining_files().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_file_content() {
        let mock = Arc::new(MockExecutorClient::new());
        mock.add_file(StoredFile::new("5", "out/empty.txt", "http://files/5"));
        let fetcher = Arc::new(MockContentFetcher::new());
        fetcher.serve("http://files/5", "");

        let detail = TaskDetail::new(1u64, TaskStatus::Done)
            .with_output("inline")
            .with_attachment("empty.txt");
        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, EMPTY_FILE_PLACEHOLDER);
        assert_eq!(mock.deleted.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_no_attachment_no_output() {
        let mock = Arc::new(MockExecutorClient::new());
        let fetcher = Arc::new(MockContentFetcher::new());

        let detail = TaskDetail::new(1u64, TaskStatus::Done).with_output("");
        let result = resolver(&mock, &fetcher).resolve(WorkspaceId(1), &detail).await;

        assert_eq!(result, COMPLETED_PLACEHOLDER);
        assert_eq!(*mock.list_calls.lock(), 0);
    }
}
