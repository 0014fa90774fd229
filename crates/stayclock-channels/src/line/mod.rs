//! LINE channel — webhook server + Messaging API.
//!
//! Inbound events arrive on an axum webhook verified with the channel
//! secret. Outbound deliveries go through the push and reply endpoints.

pub mod api;
pub mod signature;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use stayclock_core::bus::queue::MessageBus;
use stayclock_core::bus::types::OutboundMessage;
use stayclock_core::config::schema::LineConfig;

use crate::base::Channel;

use self::api::{LineApi, MAX_MESSAGES_PER_REQUEST};
use self::webhook::WebhookState;

/// Name used in bus messages for this channel.
pub const CHANNEL_NAME: &str = "line";

pub struct LineChannel {
    config: LineConfig,
    /// `host:port` the webhook server binds.
    listen_addr: String,
    bus: Arc<MessageBus>,
    shutdown: Arc<Notify>,
    api: LineApi,
}

impl LineChannel {
    pub fn new(config: LineConfig, listen_addr: impl Into<String>, bus: Arc<MessageBus>) -> Self {
        let api = LineApi::new(config.api_base.clone(), config.channel_access_token.clone());
        Self {
            config,
            listen_addr: listen_addr.into(),
            bus,
            shutdown: Arc::new(Notify::new()),
            api,
        }
    }
}

#[async_trait]
impl Channel for LineChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> anyhow::Result<()> {
        if !self.config.is_configured() {
            anyhow::bail!("LINE channel access token and secret are required");
        }

        let state = WebhookState {
            channel_secret: self.config.channel_secret.clone(),
            inbound: self.bus.inbound_sender(),
        };
        let app = webhook::router(&self.config.webhook_path, state);

        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        info!(
            addr = %self.listen_addr,
            path = %self.config.webhook_path,
            "LINE webhook listening"
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await?;

        info!("LINE webhook stopped");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.shutdown.notify_waiters();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        if msg.contents.is_empty() {
            warn!(chat_id = %msg.chat_id, "skipping empty outbound message");
            return Ok(());
        }

        let mut chunks = msg.contents.chunks(MAX_MESSAGES_PER_REQUEST);

        // A reply token answers once, so only the first chunk can use it.
        if let Some(token) = &msg.reply_to {
            if let Some(first) = chunks.next() {
                self.api.reply(token, first).await?;
            }
        }
        for chunk in chunks {
            self.api.push(&msg.chat_id, chunk).await?;
        }

        debug!(
            chat_id = %msg.chat_id,
            messages = msg.contents.len(),
            reply = msg.is_reply(),
            "LINE delivery complete"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel_for(server: &MockServer) -> LineChannel {
        let config = LineConfig {
            channel_access_token: "tok".into(),
            channel_secret: "sec".into(),
            api_base: server.uri(),
            ..LineConfig::default()
        };
        LineChannel::new(config, "127.0.0.1:0", Arc::new(MessageBus::new(8)))
    }

    async fn mount(server: &MockServer, endpoint: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(times)
            .mount(server)
            .await;
    }

    fn texts(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_name() {
        let ch = LineChannel::new(LineConfig::default(), "127.0.0.1:0", Arc::new(MessageBus::new(8)));
        assert_eq!(ch.name(), "line");
    }

    #[tokio::test]
    async fn test_push_delivery() {
        let server = MockServer::start().await;
        mount(&server, "/v2/bot/message/push", 1).await;
        mount(&server, "/v2/bot/message/reply", 0).await;

        let ch = channel_for(&server);
        ch.send(&OutboundMessage::push("line", "U1", texts(3))).await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_delivery() {
        let server = MockServer::start().await;
        mount(&server, "/v2/bot/message/reply", 1).await;
        mount(&server, "/v2/bot/message/push", 0).await;

        let ch = channel_for(&server);
        ch.send(&OutboundMessage::reply("line", "U1", "rt", "notice")).await.unwrap();
    }

    #[tokio::test]
    async fn test_long_push_is_split() {
        let server = MockServer::start().await;
        mount(&server, "/v2/bot/message/push", 3).await;

        let ch = channel_for(&server);
        ch.send(&OutboundMessage::push("line", "U1", texts(12))).await.unwrap();
    }

    #[tokio::test]
    async fn test_long_reply_overflows_to_push() {
        let server = MockServer::start().await;
        mount(&server, "/v2/bot/message/reply", 1).await;
        mount(&server, "/v2/bot/message/push", 1).await;

        let ch = channel_for(&server);
        let mut msg = OutboundMessage::push("line", "U1", texts(7));
        msg.reply_to = Some("rt".into());
        ch.send(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_delivery_is_skipped() {
        let server = MockServer::start().await;
        mount(&server, "/v2/bot/message/push", 0).await;

        let ch = channel_for(&server);
        ch.send(&OutboundMessage::push("line", "U1", vec![])).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let ch = channel_for(&server);
        assert!(ch.send(&OutboundMessage::new("line", "U1", "hi")).await.is_err());
    }

    #[tokio::test]
    async fn test_start_requires_credentials() {
        let ch = LineChannel::new(LineConfig::default(), "127.0.0.1:0", Arc::new(MessageBus::new(8)));
        assert!(ch.start().await.is_err());
    }
}
