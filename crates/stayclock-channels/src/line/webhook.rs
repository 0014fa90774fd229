//! Webhook endpoint — verifies LINE deliveries and feeds text events to the bus.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use stayclock_core::bus::types::InboundMessage;

use super::signature::verify_signature;
use super::CHANNEL_NAME;

const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Clone)]
pub struct WebhookState {
    pub channel_secret: String,
    pub inbound: mpsc::Sender<InboundMessage>,
}

// ─────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    reply_token: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    source: Option<Source>,
    #[serde(default)]
    message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Source {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl Event {
    /// Text message events with a known sender become inbound messages.
    fn into_inbound(self) -> Option<InboundMessage> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message?;
        if message.kind != "text" {
            return None;
        }
        let text = message.text?;
        let source = self.source?;
        let user_id = source.user_id?;
        let chat_id = source
            .group_id
            .or(source.room_id)
            .unwrap_or_else(|| user_id.clone());

        let mut inbound = InboundMessage::new(CHANNEL_NAME, user_id, chat_id, text);
        if let Some(ts) = self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis) {
            inbound.timestamp = ts;
        }
        if let Some(token) = self.reply_token.filter(|t| !t.is_empty()) {
            inbound = inbound.with_reply_token(token);
        }
        Some(inbound)
    }
}

// ─────────────────────────────────────────────
// Routes
// ─────────────────────────────────────────────

/// Build the webhook router: `POST {path}` for events, `GET /health` for probes.
pub fn router(path: &str, state: WebhookState) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Router::new()
        .route(&path, post(callback))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn callback(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, StatusCode> {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("webhook request without signature");
        return Err(StatusCode::BAD_REQUEST);
    };

    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("webhook signature mismatch");
        return Err(StatusCode::BAD_REQUEST);
    }

    let payload: WebhookBody = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "malformed webhook body");
        StatusCode::BAD_REQUEST
    })?;

    debug!(events = payload.events.len(), "webhook received");

    for event in payload.events {
        let Some(inbound) = event.into_inbound() else {
            continue;
        };
        if state.inbound.send(inbound).await.is_err() {
            error!("inbound bus closed, dropping webhook event");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    Ok("OK")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
