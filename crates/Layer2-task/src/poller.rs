//! Status poller
//!
//! Polls a task's status at a fixed interval until it reaches a terminal
//! status or the session deadline passes. The sequence is a lazy stream:
//! nothing is polled until the stream is, and each call to
//! [`StatusPoller::events`] starts a fresh session.
//!
//! Status fetch errors never end the stream. They are logged and the next
//! check happens after the usual interval. The deadline is the only bound.

use crate::channel::ResponseChannel;
use crate::executor::ExecutorClient;
use crate::session::{TrackingBudget, TrackingSession};
use crate::state::TaskStatus;
use crate::task::{TaskDetail, TaskId, WorkspaceId};
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One step of a tracking session
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Non-terminal status observed
    Snapshot(TaskDetail),

    /// Status fetch failed; polling continues
    TransientError { poll: u32, message: String },

    /// Task reached `done`. Last event.
    Done(TaskDetail),

    /// Task reached `error`. Last event.
    Failed(TaskDetail),

    /// Deadline passed without a terminal status. Last event.
    TimedOut { polls: u32 },
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollEvent::Done(_) | PollEvent::Failed(_) | PollEvent::TimedOut { .. }
        )
    }
}

/// How a polling session ended
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Done(TaskDetail),
    Failed(TaskDetail),
    TimedOut,
}

/// Polls the executor for task status
#[derive(Clone)]
pub struct StatusPoller {
    client: Arc<dyn ExecutorClient>,
    budget: TrackingBudget,
}

impl StatusPoller {
    pub fn new(client: Arc<dyn ExecutorClient>, budget: TrackingBudget) -> Self {
        Self { client, budget }
    }

    pub fn budget(&self) -> TrackingBudget {
        self.budget
    }

    /// Stream of poll events for one session
    ///
    /// A progress ping goes to `channel` before every status check.
    pub fn events<'a>(
        &self,
        task_id: TaskId,
        workspace: WorkspaceId,
        channel: &'a dyn ResponseChannel,
    ) -> impl Stream<Item = PollEvent> + Send + 'a {
        let client = Arc::clone(&self.client);
        let budget = self.budget;

        stream! {
            let mut session = TrackingSession::start(task_id, workspace, budget);
            debug!(
                "Tracking session {} started for task {} (budget {:?}, interval {:?})",
                session.id, session.task_id, budget.timeout, budget.poll_interval
            );

            loop {
                if session.is_expired() {
                    info!(
                        "Task {} timeout after {} polls ({:?} since {})",
                        session.task_id,
                        session.polls(),
                        session.elapsed(),
                        session.started_wall.to_rfc3339()
                    );
                    yield PollEvent::TimedOut { polls: session.polls() };
                    break;
                }

                let ping_budget = session.remaining().min(session.poll_interval);
                match tokio::time::timeout(ping_budget, channel.send_working()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => debug!("Progress ping failed (ignored): {}", e),
                    Err(_) => debug!("Progress ping timed out after {:?} (ignored)", ping_budget),
                }

                let poll = session.record_poll();
                match client.get_task_status(&session.task_id, session.workspace).await {
                    Ok(detail) => {
                        info!(
                            "Task {} status: {} {} (poll {})",
                            session.task_id,
                            detail.status.symbol(),
                            detail.status,
                            poll
                        );
                        match detail.status {
                            TaskStatus::Done => {
                                yield PollEvent::Done(detail);
                                break;
                            }
                            TaskStatus::Error => {
                                warn!("Task {} failed", session.task_id);
                                yield PollEvent::Failed(detail);
                                break;
                            }
                            _ => yield PollEvent::Snapshot(detail),
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Error during polling task {} (poll {}, retryable: {}): {}",
                            session.task_id,
                            poll,
                            e.is_retryable(),
                            e
                        );
                        yield PollEvent::TransientError { poll, message: e.to_string() };
                    }
                }

                tokio::time::sleep(session.poll_interval).await;
            }
        }
    }

    /// Drain a session down to its terminal outcome
    pub async fn poll_until_terminal(
        &self,
        task_id: TaskId,
        workspace: WorkspaceId,
        channel: &dyn ResponseChannel,
    ) -> PollOutcome {
        let events = self.events(task_id, workspace, channel);
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                PollEvent::Done(detail) => return PollOutcome::Done(detail),
                PollEvent::Failed(detail) => return PollOutcome::Failed(detail),
                PollEvent::TimedOut { .. } => return PollOutcome::TimedOut,
                PollEvent::Snapshot(_) | PollEvent::TransientError { .. } => {}
            }
        }
        PollOutcome::TimedOut
    }
}
