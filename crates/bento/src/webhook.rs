// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP surface.
//!
//! `POST /webhook` verifies the platform signature over the raw body before
//! any parsing, then handles events strictly in delivery order. After the
//! signature gate the endpoint always answers 200: a non-200 response would
//! make the platform redeliver the whole batch and duplicate side effects.
//! `GET /health` answers 200 unconditionally.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use bento_agent::Dispatcher;
use bento_line::{events, signature};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub channel_secret: Arc<String>,
}

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(sig) = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
    else {
        warn!("missing X-Line-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    if !signature::verify(&state.channel_secret, &body, sig) {
        warn!("invalid webhook signature");
        return StatusCode::BAD_REQUEST;
    }

    let envelope: events::WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            // Signed but malformed; acknowledge to avoid redelivery.
            warn!(error = %e, "failed to parse webhook envelope");
            return StatusCode::OK;
        }
    };

    let inbound = events::normalize(envelope);
    debug!(count = inbound.len(), "webhook events normalized");

    // Sequential by contract: one single-use reply token per event, and
    // reply ordering within a chat matters. One event's failure never
    // blocks the rest.
    for event in inbound {
        if let Err(e) = state.dispatcher.handle_event(event).await {
            warn!(error = %e, "event handling failed");
        }
    }

    StatusCode::OK
}
