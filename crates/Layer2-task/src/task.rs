//! Task definition and types

use crate::state::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Executor ids arrive as JSON numbers but are treated as opaque text here.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// Numeric-looking ids go back out as numbers.
fn serialize_opaque<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match id.parse::<u64>() {
        Ok(n) => serializer.serialize_u64(n),
        Err(_) => serializer.serialize_str(id),
    }
}

/// Opaque task identifier allocated by the executor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_opaque(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

/// Opaque stored-file identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_opaque(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
    }
}

/// Workspace the task and its files live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub u64);

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent the task is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A work item to submit to the executor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Workspace to create the task in (part of the request path)
    #[serde(skip)]
    pub workspace: WorkspaceId,

    /// Agent that should pick the task up
    pub assignee: AgentId,

    /// Short human-readable description
    pub description: String,

    /// Context for the assignee
    pub body: String,

    /// Raw input
    pub input: String,

    /// What a good result looks like
    pub expected_output: String,

    /// Tasks that must complete first
    pub dependencies: Vec<TaskId>,
}

impl TaskSpec {
    /// Create a new task spec with no dependencies
    pub fn new(
        workspace: WorkspaceId,
        assignee: AgentId,
        description: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            workspace,
            assignee,
            description: description.into(),
            body: String::new(),
            input: input.into(),
            expected_output: String::new(),
            dependencies: Vec::new(),
        }
    }

    /// Spec for answering a user question
    pub fn question(workspace: WorkspaceId, assignee: AgentId, question: &str) -> Self {
        Self::new(workspace, assignee, "Answer user question", question)
            .with_body(format!(
                "User asked: \"{}\"\n\nPlease provide a helpful and accurate answer.",
                question
            ))
            .with_expected_output("A clear and helpful answer to the user question")
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = expected.into();
        self
    }
}

/// What the executor returns for a created task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskHandle {
    pub id: TaskId,
}

/// A task accepted by the executor
#[derive(Debug, Clone)]
pub struct SubmittedTask {
    pub id: TaskId,
    pub workspace: WorkspaceId,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

/// Reference from a task to a stored file believed to hold its result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub path: String,
}

impl Attachment {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Status snapshot of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: TaskId,

    #[serde(default)]
    pub description: String,

    pub status: TaskStatus,

    /// Inline textual output
    #[serde(default)]
    pub output: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub attachments: Vec<Attachment>,
}

impl TaskDetail {
    pub fn new(id: impl Into<TaskId>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            status,
            output: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_attachment(mut self, path: impl Into<String>) -> Self {
        self.attachments.push(Attachment::new(path));
        self
    }

    /// Inline output, if present and non-empty
    pub fn inline_output(&self) -> Option<&str> {
        self.output.as_deref().filter(|o| !o.is_empty())
    }
}

/// A file stored in the executor workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: FileId,

    /// Storage path, matched against attachment paths
    #[serde(default)]
    pub path: String,

    /// Where the content can be downloaded from
    #[serde(default)]
    pub full_url: String,

    #[serde(default)]
    pub workspace_id: Option<WorkspaceId>,
}

impl StoredFile {
    pub fn new(id: impl Into<String>, path: impl Into<String>, full_url: impl Into<String>) -> Self {
        Self {
            id: FileId::new(id),
            path: path.into(),
            full_url: full_url.into(),
            workspace_id: None,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_id_from_number_or_string() {
        let numeric: TaskId = serde_json::from_value(json!(42)).unwrap();
        let text: TaskId = serde_json::from_value(json!("abc-1")).unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "abc-1");

        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("abc-1"));
    }

    #[test]
    fn test_question_spec() {
        let spec = TaskSpec::question(WorkspaceId(1), AgentId(2), "What is Rust?");
        assert_eq!(spec.description, "Answer user question");
        assert_eq!(spec.input, "What is Rust?");
        assert!(spec.body.contains("User asked: \"What is Rust?\""));
        assert!(spec.dependencies.is_empty());

        let body = serde_json::to_value(&spec).unwrap();
        assert_eq!(body["assignee"], json!(2));
        assert_eq!(
            body["expectedOutput"],
            json!("A clear and helpful answer to the user question")
        );
        assert_eq!(body["dependencies"], json!([]));
        assert!(body.get("workspace").is_none());
    }

    #[test]
    fn test_detail_with_null_attachments() {
        let detail: TaskDetail = serde_json::from_value(json!({
            "id": 7,
            "status": "in-progress",
            "output": null,
            "attachments": null,
            "assignee": 3
        }))
        .unwrap();

        assert_eq!(detail.id, TaskId::from(7u64));
        assert_eq!(detail.status, TaskStatus::Running);
        assert!(detail.attachments.is_empty());
        assert!(detail.inline_output().is_none());
    }

    #[test]
    fn test_empty_output_is_not_inline() {
        let detail = TaskDetail::new(1u64, TaskStatus::Done).with_output("");
        assert!(detail.inline_output().is_none());
    }

    #[test]
    fn test_stored_file_wire_format() {
        let file: StoredFile = serde_json::from_value(json!({
            "id": 11,
            "path": "tasks/42/answer.md",
            "fullUrl": "https://files.example/answer.md",
            "workspaceId": 5
        }))
        .unwrap();

        assert_eq!(file.id.as_str(), "11");
        assert_eq!(file.full_url, "https://files.example/answer.md");
        assert_eq!(file.workspace_id, Some(WorkspaceId(5)));
    }
}
