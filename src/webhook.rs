//! # Webhook Module
//!
//! HTTP ingress for Telegram updates. Telegram POSTs every update as JSON to
//! the configured URL together with the shared secret in the
//! `X-Telegram-Bot-Api-Secret-Token` header. Accepted updates are pushed into
//! a channel that backs the dispatcher's update listener.
//!
//! Responses:
//!
//! - `403` secret header missing or wrong (body not inspected)
//! - `400` empty body or a body that is not an `Update`
//! - `503` the dispatcher is gone
//! - `202` update queued

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use subtle::ConstantTimeEq;
use teloxide::prelude::*;
use teloxide::stop::{mk_stop_token, StopFlag, StopToken};
use teloxide::types::{Update, UpdateKind};
use teloxide::update_listeners::{StatefulListener, UpdateListener};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;

/// Header carrying the secret token set with `setWebhook`
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub type UpdateSender = mpsc::UnboundedSender<Result<Update, Infallible>>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<Result<Update, Infallible>>;

/// Shared state of the webhook route
#[derive(Clone)]
pub struct WebhookState {
    secret_token: Arc<str>,
    updates: UpdateSender,
}

impl WebhookState {
    pub fn new(secret_token: &str, updates: UpdateSender) -> Self {
        Self {
            secret_token: Arc::from(secret_token),
            updates,
        }
    }
}

/// Build the HTTP routes around the given state
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", post(telegram_webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Create the webhook routes and the update listener they feed
///
/// The returned [`StopFlag`] resolves once the dispatcher stops the listener;
/// pass it to the HTTP server as its graceful shutdown signal.
pub fn webhook(secret_token: &str) -> (impl UpdateListener<Err = Infallible>, StopFlag, Router) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (listener, stop_flag) = channel_listener(rx);
    (listener, stop_flag, router(WebhookState::new(secret_token, tx)))
}

/// Wrap an update channel into a teloxide update listener
pub fn channel_listener(rx: UpdateReceiver) -> (impl UpdateListener<Err = Infallible>, StopFlag) {
    let (stop_token, stop_flag) = mk_stop_token();
    let stream = UnboundedReceiverStream::new(rx);

    fn tuple_first_mut<A, B>(tuple: &mut (A, B)) -> &mut A {
        &mut tuple.0
    }

    let listener = StatefulListener::new(
        (stream, stop_token),
        tuple_first_mut,
        |state: &mut (_, StopToken)| state.1.clone(),
    );

    (listener, stop_flag)
}

/// Bind the HTTP listener, then register the public URL with Telegram
///
/// Registration only happens once the address is bound, so a bind failure
/// leaves any previous registration untouched.
pub async fn bind_and_register(bot: &Bot, config: &WebhookConfig) -> anyhow::Result<TcpListener> {
    let tcp_listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Webhook server listening");

    if let Some(url) = &config.public_url {
        bot.set_webhook(url.clone())
            .secret_token(config.secret_token.clone())
            .await?;
        info!(url = %url, "Webhook registered with Telegram");
    }

    Ok(tcp_listener)
}

fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(SECRET_TOKEN_HEADER)
        .map(|value| bool::from(value.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

async fn telegram_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !secret_matches(&headers, &state.secret_token) {
        warn!("Rejected webhook request with missing or invalid secret token");
        return StatusCode::FORBIDDEN;
    }

    if body.is_empty() {
        warn!("Rejected webhook request with empty payload");
        return StatusCode::BAD_REQUEST;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, payload_bytes = body.len(), "Rejected malformed update payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    // teloxide keeps unparseable payloads as `UpdateKind::Error` instead of failing
    if let UpdateKind::Error(_) = update.kind {
        warn!(update_id = ?update.id, payload_bytes = body.len(), "Rejected update of unknown shape");
        return StatusCode::BAD_REQUEST;
    }

    debug!(update_id = ?update.id, "Queueing update");

    if state.updates.send(Ok(update)).is_err() {
        error!("Update queue is closed, dispatcher is not running");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::ACCEPTED
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_secret_matches() {
        let mut headers = HeaderMap::new();
        assert!(!secret_matches(&headers, "s3cret"));

        headers.insert(SECRET_TOKEN_HEADER, HeaderValue::from_static("wrong"));
        assert!(!secret_matches(&headers, "s3cret"));

        headers.insert(SECRET_TOKEN_HEADER, HeaderValue::from_static("s3cret"));
        assert!(secret_matches(&headers, "s3cret"));
    }

    #[tokio::test]
    async fn test_stop_token_resolves_stop_flag() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (mut listener, stop_flag) = channel_listener(rx);

        listener.stop_token().stop();

        let stopped = tokio::time::timeout(std::time::Duration::from_secs(1), stop_flag).await;
        assert!(stopped.is_ok());
    }
}
