// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bento serve` command implementation.
//!
//! Wires the LINE client, the OpenAI client, the persistence backend, and
//! the in-memory session store into the dispatcher, then starts the
//! webhook HTTP server.

use std::sync::Arc;
use std::time::Duration;

use bento_agent::{AgentSettings, Dispatcher};
use bento_backend::BackendClient;
use bento_config::BentoConfig;
use bento_core::session::MemorySessionStore;
use bento_core::BentoError;
use bento_line::LineClient;
use bento_openai::OpenAiClient;
use tracing::info;

use crate::webhook;

/// Runs the `bento serve` command.
pub async fn run_serve(config: BentoConfig) -> Result<(), BentoError> {
    init_tracing(&config.bot.log_level);

    info!(environment = %config.bot.environment, "starting bento serve");

    let line = LineClient::new(&config.line.channel_access_token)?
        .with_base_url(config.line.api_base.clone());
    let llm = OpenAiClient::new(&config.openai.api_key)?
        .with_base_url(config.openai.api_base.clone());
    let backend = BackendClient::new(config.backend.base_url.clone())?;
    let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
        config.bot.pending_ttl_secs,
    )));

    let settings = AgentSettings {
        group_trigger: config.bot.group_trigger.clone(),
        chat_model: config.openai.chat_model.clone(),
        vision_model: config.openai.vision_model.clone(),
        travel_model: config.openai.travel_model.clone(),
        max_tokens: config.openai.max_tokens,
    };

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(line),
        Arc::new(llm),
        Arc::new(backend),
        sessions,
        settings,
    ));

    let state = webhook::AppState {
        dispatcher,
        channel_secret: Arc::new(config.line.channel_secret.clone()),
    };

    let app = webhook::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BentoError::Internal(format!("failed to bind to {addr}: {e}")))?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| BentoError::Internal(format!("server error: {e}")))?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bento={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
