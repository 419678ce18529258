//! Task status as reported by the executor

use serde::{Deserialize, Serialize};

/// Status of a remote task
///
/// Only `Done` and `Error` are terminal. Statuses the executor reports that
/// this crate does not know about deserialize to `Unknown` and keep polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is waiting to be picked up
    #[serde(alias = "to-do")]
    Pending,

    /// Task is being worked on
    #[serde(alias = "in-progress")]
    Running,

    /// Task finished and its result can be resolved
    Done,

    /// Task failed on the executor side
    Error,

    /// Any other status string
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }

    /// Check if task completed successfully
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Error => "error",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// Get a symbol for the state (for console output)
    pub fn symbol(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "◯",
            TaskStatus::Running => "⟳",
            TaskStatus::Done => "✓",
            TaskStatus::Error => "✗",
            TaskStatus::Unknown => "?",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> TaskStatus {
        serde_json::from_str(&format!("\"{}\"", raw)).unwrap()
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(parse("to-do"), TaskStatus::Pending);
        assert_eq!(parse("pending"), TaskStatus::Pending);
        assert_eq!(parse("in-progress"), TaskStatus::Running);
        assert_eq!(parse("running"), TaskStatus::Running);
        assert_eq!(parse("done"), TaskStatus::Done);
        assert_eq!(parse("error"), TaskStatus::Error);
        assert_eq!(parse("human-assistance-required"), TaskStatus::Unknown);
    }

    #[test]
    fn test_terminal() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Unknown.is_terminal());
        assert!(!TaskStatus::Error.is_success());
    }
}
