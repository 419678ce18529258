//! Tracking session - one bounded wait on one task

use crate::task::{TaskId, WorkspaceId};
use chrono::{DateTime, Utc};
use relay_foundation::TrackingSettings;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Budget for a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingBudget {
    /// Hard deadline, measured from session start
    pub timeout: Duration,
    /// Fixed sleep between status checks
    pub poll_interval: Duration,
}

impl Default for TrackingBudget {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl From<TrackingSettings> for TrackingBudget {
    fn from(settings: TrackingSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            poll_interval: settings.poll_interval(),
        }
    }
}

/// State of a single tracking call
///
/// Owned by the call that created it and dropped when that call returns.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    pub id: Uuid,
    pub task_id: TaskId,
    pub workspace: WorkspaceId,
    pub started_at: Instant,
    pub started_wall: DateTime<Utc>,
    pub deadline: Instant,
    pub poll_interval: Duration,
    polls: u32,
}

impl TrackingSession {
    /// Start a session now
    pub fn start(task_id: TaskId, workspace: WorkspaceId, budget: TrackingBudget) -> Self {
        let started_at = Instant::now();
        Self {
            id: Uuid::new_v4(),
            task_id,
            workspace,
            started_at,
            started_wall: Utc::now(),
            deadline: started_at + budget.timeout,
            poll_interval: budget.poll_interval,
            polls: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Count a status check and return its 1-based number
    pub fn record_poll(&mut self) -> u32 {
        self.polls += 1;
        self.polls
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}
