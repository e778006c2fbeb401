//! HTTP route handlers for the tutor webhook API.
//!
//! The webhook transport is deliberately thin: signature verification and
//! platform-specific envelopes belong to the messaging gateway in front of
//! this service. Here it is text in, text out.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "vocabot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// One incoming text message.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    /// Stable key identifying the sender.
    pub user_id: String,
    /// The message text.
    pub text: String,
}

/// Webhook request: a batch of text messages.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    /// Messages to handle, in order.
    #[serde(default)]
    pub events: Vec<IncomingMessage>,
}

/// One outgoing reply.
#[derive(Debug, Serialize)]
pub struct OutgoingReply {
    /// Key of the user the reply is for.
    pub user_id: String,
    /// Reply text, already truncated.
    pub text: String,
}

/// Webhook response: one reply per handled message.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Replies in the order the events arrived.
    pub replies: Vec<OutgoingReply>,
}

/// Handle a webhook delivery.
///
/// Non-text or malformed events are dropped by deserialization; each handled
/// message always produces a reply, so the gateway never has to special-case
/// errors.
async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WebhookRequest>,
) -> Json<WebhookResponse> {
    let mut replies = Vec::with_capacity(request.events.len());
    for event in request.events {
        let text = state.service.handle_message(&event.user_id, &event.text).await;
        replies.push(OutgoingReply {
            user_id: event.user_id,
            text,
        });
    }
    Json(WebhookResponse { replies })
}
