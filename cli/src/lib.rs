//! Command-line front end: runs one workflow and prints its events as JSON
//! lines on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use manus_core::Config;
use manus_orchestrator::Orchestrator;
use manus_orchestrator::RunConfig;
use manus_orchestrator::WorkflowContext;
use manus_protocol::Message;
use manus_protocol::WorkflowEvent;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Multi-agent research and coding workflow.
#[derive(Debug, Parser)]
#[command(name = "manus", version)]
pub struct Cli {
    /// Task for the agents. Read from stdin when omitted.
    pub prompt: Option<String>,

    /// Plan with the reasoning model.
    #[arg(long)]
    pub deep_thinking: bool,

    /// Run a web search and show the results to the planner.
    #[arg(long)]
    pub search_before_planning: bool,

    /// Log full transcripts and raise manus log levels to debug.
    #[arg(long)]
    pub debug: bool,

    /// Config file (defaults to $MANUS_HOME/config.toml).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the workflow graph as Mermaid and exit.
    #[arg(long)]
    pub graph: bool,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            debug: self.debug,
            deep_thinking_mode: self.deep_thinking,
            search_before_planning: self.search_before_planning,
        }
    }
}

/// `info` by default, `RUST_LOG` wins, `debug` raises the manus crates.
pub fn env_filter(debug: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if !debug {
        return filter;
    }
    ["manus_core", "manus_orchestrator", "manus_cli"]
        .into_iter()
        .filter_map(|target| format!("{target}=debug").parse::<Directive>().ok())
        .fold(filter, EnvFilter::add_directive)
}

/// Logs go to stderr; stdout carries only events.
pub fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the command. Returns `false` when the run ended with an error event.
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Arc::new(
        Config::load(cli.config.as_deref()).context("failed to load configuration")?,
    );

    if cli.graph {
        println!("{}", manus_orchestrator::graph::mermaid(&config.team_members));
        return Ok(true);
    }

    let prompt = match &cli.prompt {
        Some(prompt) => prompt.clone(),
        None => read_stdin().await?,
    };
    let messages = if prompt.trim().is_empty() {
        Vec::new()
    } else {
        vec![Message::user(prompt)]
    };

    let ctx = WorkflowContext::from_config(Arc::clone(&config))
        .context("failed to build workflow context")?;
    let orchestrator = Orchestrator::new(ctx);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling run");
                cancel.cancel();
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    let mut succeeded = true;
    let mut events = Box::pin(orchestrator.stream(messages, cli.run_config(), cancel));
    while let Some(event) = events.next().await {
        if matches!(event, WorkflowEvent::Error(_)) {
            succeeded = false;
        }
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(succeeded)
}

async fn read_stdin() -> anyhow::Result<String> {
    let mut prompt = String::new();
    tokio::io::stdin()
        .read_to_string(&mut prompt)
        .await
        .context("failed to read prompt from stdin")?;
    Ok(prompt)
}
