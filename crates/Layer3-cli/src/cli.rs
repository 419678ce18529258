//! Non-interactive command handlers

use relay_foundation::{RelayConfig, Result};
use relay_task::{
    AgentId, CompletionTracker, ExecutorClient, HttpContentFetcher, HttpExecutorClient,
    HttpExecutorConfig, QuestionRelay, ResponseChannel, TaskId, TrackOutcome, TrackingBudget,
    WorkspaceId, FAILURE_REPLY,
};
use std::sync::Arc;
use tracing::info;

/// Wire the HTTP executor into a question relay. `config` must be validated.
pub fn build_relay(config: &RelayConfig) -> Result<QuestionRelay> {
    let client: Arc<dyn ExecutorClient> = Arc::new(HttpExecutorClient::new(
        HttpExecutorConfig::from_settings(&config.executor)?,
    )?);
    let fetcher = Arc::new(HttpContentFetcher::new(config.executor.request_timeout())?);

    let tracker = CompletionTracker::new(client, fetcher)
        .with_budget(TrackingBudget::from(config.tracking));

    let workspace = config
        .executor
        .workspace_id
        .ok_or_else(|| relay_foundation::Error::Config("workspace id not set".into()))?;
    let agent = config
        .executor
        .agent_id
        .ok_or_else(|| relay_foundation::Error::Config("agent id not set".into()))?;

    Ok(QuestionRelay::new(
        tracker,
        WorkspaceId(workspace),
        AgentId(agent),
    ))
}

/// Ask a question; the reply goes out through `channel`
pub async fn run_ask(relay: &QuestionRelay, question: &str, channel: &dyn ResponseChannel) {
    relay.ask(question, channel).await;
}

/// Wait for an existing task. Returns false if the task failed.
pub async fn run_track(
    relay: &QuestionRelay,
    task_id: &str,
    channel: &dyn ResponseChannel,
) -> Result<bool> {
    let task_id = TaskId::new(task_id.trim());
    info!("Tracking task {} in workspace {}", task_id, relay.workspace());

    let outcome = relay
        .tracker()
        .track(task_id, relay.workspace(), channel)
        .await;

    let succeeded = !matches!(outcome, TrackOutcome::Failed);
    let reply = outcome
        .into_reply()
        .unwrap_or_else(|| FAILURE_REPLY.to_string());
    channel.send_reply(&reply).await?;
    Ok(succeeded)
}
