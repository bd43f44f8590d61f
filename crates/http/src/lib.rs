//! HTTP ingress and queue workers for doorman.
//!
//! The webhook translates Telegram updates into coordinator events; the
//! workers poll the countdown and cleanup queues. Every inbound path
//! answers success regardless of handler outcome: a failed event is
//! logged, never bounced back to the platform.

mod update;
mod workers;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use doorman_storage::DelayQueueStore;
use doorman_telegram::ChatActuator;
use doorman_verifier::Verifier;

pub use update::Update;
pub use workers::{start_cleanup_worker, start_countdown_worker};

/// Shared state for handlers and workers.
pub struct AppState {
    pub verifier: Arc<Verifier>,
    pub chat: Arc<dyn ChatActuator>,
    pub queue: Arc<dyn DelayQueueStore>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Telegram webhook dispatch.
///
/// Always answers 200: an undecodable body or a failed handler must not
/// make the platform retry the whole delivery.
async fn webhook(State(state): State<Arc<AppState>>, body: String) -> (StatusCode, &'static str) {
    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::debug!(error = %e, "undecodable update dropped");
            return (StatusCode::OK, "True");
        },
    };

    let translation = update::translate(update, Utc::now());

    for (chat_id, message_id) in translation.delete_messages {
        if let Err(e) = state.chat.delete_message(chat_id, message_id).await {
            tracing::warn!(chat_id, message_id, error = %e, "service message delete failed");
        }
    }
    for event in translation.events {
        if let Err(e) = state.verifier.handle(event).await {
            tracing::error!(error = %e, "event handling failed");
        }
    }
    (StatusCode::OK, "True")
}
