//! boardmate server — Slack events in, task-board actions out.
//!
//! Wires the collaborator clients (Trello, Slack, language model) into one
//! [`WorkflowEngine`] and exposes it behind two routes:
//!
//! - `POST /slack/events` — signed Slack event callbacks
//! - `GET /health` — liveness probe

mod config;
mod events;
mod signature;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;
use tracing_subscriber::EnvFilter;

use boardmate_adapters::{AdapterError, SlackClient, SlackConfig, TrelloClient, TrelloConfig};
use boardmate_llm::{LlmClient, LlmError};
use boardmate_workflow::{ActionDispatcher, IntentParser, WorkflowEngine};

use crate::config::ServerConfig;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {var}")]
    MissingEnv { var: String },

    /// A collaborator client could not be configured.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// The language-model client could not be configured.
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state behind the axum routes.
pub struct AppState {
    /// The assembled intent-routing engine.
    pub engine: Arc<WorkflowEngine>,
    /// Slack signing secret for request verification.
    pub signing_secret: String,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let llm = Arc::new(LlmClient::new(config.llm.clone())?);
    let board = Arc::new(TrelloClient::new(TrelloConfig::from_env()?));
    let slack = Arc::new(SlackClient::new(SlackConfig::from_env()?));

    let parser = IntentParser::new(llm);
    let dispatcher = ActionDispatcher::new(board, config.default_board_id.clone());
    let engine = Arc::new(WorkflowEngine::new(parser, dispatcher, slack));

    let state = Arc::new(AppState {
        engine,
        signing_secret: config.signing_secret.clone(),
    });

    let app = Router::new()
        .route("/slack/events", post(events::slack_events))
        .route("/health", get(events::health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(addr = %config.bind, "boardmate server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
