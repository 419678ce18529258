//! Question relay - turns a user question into a tracked task

use crate::channel::ResponseChannel;
use crate::tracker::{CompletionTracker, TrackOutcome, TIMEOUT_MESSAGE};
use crate::task::{AgentId, TaskSpec, WorkspaceId};
use tracing::{error, info, warn};

pub const WELCOME_TEXT: &str = "Task Relay\n\n\
Usage: ask [your question]\n\
Example: ask What can the workspace agent do?";

pub const HELP_TEXT: &str = "Help:\n\n\
Commands:\n\
  start            - Show the welcome message\n\
  ask [question]   - Ask a question\n\
  track [task id]  - Wait for an existing task\n\
  help             - Show this help message\n\n\
Example:\n\
  ask Summarize the latest workspace report";

pub const USAGE_HINT: &str = "Please write a question: ask [your question]";

pub const FAILURE_REPLY: &str = "Sorry, I could not answer your question. Please try again.";

pub const ERROR_REPLY: &str = "An error occurred. Please try again.";

/// Submits questions for one agent in one workspace
#[derive(Clone)]
pub struct QuestionRelay {
    tracker: CompletionTracker,
    workspace: WorkspaceId,
    assignee: AgentId,
}

impl QuestionRelay {
    pub fn new(tracker: CompletionTracker, workspace: WorkspaceId, assignee: AgentId) -> Self {
        Self {
            tracker,
            workspace,
            assignee,
        }
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    /// Ask a question and deliver the reply through `channel`
    ///
    /// The reply is also returned. Every question ends in exactly one reply.
    pub async fn ask(&self, question: &str, channel: &dyn ResponseChannel) -> String {
        let question = question.trim();
        let reply = if question.is_empty() {
            USAGE_HINT.to_string()
        } else {
            self.answer(question, channel).await
        };

        if let Err(e) = channel.send_reply(&reply).await {
            error!("Failed to deliver reply: {}", e);
        }
        reply
    }

    async fn answer(&self, question: &str, channel: &dyn ResponseChannel) -> String {
        info!("Question received: \"{}\"", question);
        let ping_budget = self.tracker.budget().poll_interval;
        match tokio::time::timeout(ping_budget, channel.send_working()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Progress ping failed: {}", e),
            Err(_) => warn!("Progress ping timed out after {:?}", ping_budget),
        }

        let spec = TaskSpec::question(self.workspace, self.assignee, question);
        match self.tracker.submit_and_track(spec, channel).await {
            Ok(TrackOutcome::Completed(result)) => result,
            Ok(TrackOutcome::Failed) => FAILURE_REPLY.to_string(),
            Ok(TrackOutcome::TimedOut) => TIMEOUT_MESSAGE.to_string(),
            Err(e) => {
                error!("Error processing question: {}", e);
                ERROR_REPLY.to_string()
            }
        }
    }
}
