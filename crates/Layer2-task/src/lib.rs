//! # relay-task
//!
//! Asynchronous task-completion tracking for Task Relay.
//! Submits work to an external executor, polls it under a fixed time budget,
//! and resolves the result of finished tasks.
//!
//! ## Features
//!
//! - Task submission through an injected executor client
//! - Lazy, restartable status polling with a hard deadline
//! - **Result resolution: file attachment first, inline output second**
//! - Best-effort progress pings and attachment cleanup
//! - Question relay for request-handling front-ends

pub mod channel;
pub mod executor;
pub mod poller;
pub mod relay;
pub mod resolver;
pub mod session;
pub mod state;
pub mod submitter;
pub mod task;
pub mod tracker;

// Executor clients
pub use executor::{
    ContentFetcher, ExecutorClient, HttpContentFetcher, HttpExecutorClient, HttpExecutorConfig,
    MockContentFetcher, MockExecutorClient, StatusStep,
};

// Task model
pub use state::TaskStatus;
pub use task::{
    AgentId, Attachment, FileId, StoredFile, SubmittedTask, TaskDetail, TaskHandle, TaskId,
    TaskSpec, WorkspaceId,
};

// Tracking
pub use channel::{MemoryChannel, NoopChannel, ResponseChannel};
pub use poller::{PollEvent, PollOutcome, StatusPoller};
pub use resolver::{find_result_file, ResultResolver, COMPLETED_PLACEHOLDER, EMPTY_FILE_PLACEHOLDER};
pub use session::{TrackingBudget, TrackingSession};
pub use submitter::TaskSubmitter;
pub use tracker::{CompletionTracker, TrackOutcome, TIMEOUT_MESSAGE};

// Request handling
pub use relay::{QuestionRelay, ERROR_REPLY, FAILURE_REPLY, HELP_TEXT, USAGE_HINT, WELCOME_TEXT};
