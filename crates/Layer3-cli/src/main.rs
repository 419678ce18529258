//! Task Relay CLI - Main entry point

mod cli;
mod console;

use clap::{Parser, Subcommand};
use console::ConsoleChannel;
use relay_foundation::RelayConfig;
use relay_task::{HELP_TEXT, WELCOME_TEXT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Task Relay - hand questions to a workspace agent and wait for the answer
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Workspace to use (overrides env and config)
    #[arg(long, global = true)]
    workspace: Option<u64>,

    /// Agent to assign tasks to (overrides env and config)
    #[arg(long, global = true)]
    agent: Option<u64>,

    /// Tracking budget in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// No progress dots
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the welcome message
    Start,
    /// Ask a question
    Ask {
        /// The question
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Wait for an already submitted task
    Track {
        /// Task id
        task_id: String,
    },
    /// Show help
    Help,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (question, task_id) = match args.command {
        None | Some(Command::Start) => {
            println!("{}", WELCOME_TEXT);
            return Ok(());
        }
        Some(Command::Help) => {
            println!("{}", HELP_TEXT);
            return Ok(());
        }
        Some(Command::Ask { ref question }) => (Some(question.join(" ")), None),
        Some(Command::Track { ref task_id }) => (None, Some(task_id.clone())),
    };

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let mut config = RelayConfig::load()?;
    if let Some(workspace) = args.workspace {
        config.executor.workspace_id = Some(workspace);
    }
    if let Some(agent) = args.agent {
        config.executor.agent_id = Some(agent);
    }
    if let Some(timeout) = args.timeout {
        config.tracking.timeout_secs = timeout;
    }
    config.validate()?;

    let relay = cli::build_relay(&config)?;
    let channel = if args.quiet {
        ConsoleChannel::quiet()
    } else {
        ConsoleChannel::new()
    };

    tracing::info!("Task Relay connected to {}", config.executor.base_url);

    let work = async {
        match (question, task_id) {
            (Some(question), _) => {
                cli::run_ask(&relay, &question, &channel).await;
                Ok(true)
            }
            (None, Some(task_id)) => cli::run_track(&relay, &task_id, &channel).await,
            (None, None) => Ok(true),
        }
    };

    tokio::select! {
        result = work => {
            if !result? {
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}
