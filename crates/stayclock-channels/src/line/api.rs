//! LINE Messaging API client — push and reply.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// LINE accepts at most this many messages per push/reply request.
pub const MAX_MESSAGES_PER_REQUEST: usize = 5;

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

fn text_messages(texts: &[String]) -> Vec<TextMessage<'_>> {
    texts
        .iter()
        .map(|text| TextMessage { kind: "text", text })
        .collect()
}

/// Thin client over the two send endpoints.
#[derive(Clone)]
pub struct LineApi {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl LineApi {
    pub fn new(api_base: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Push up to five texts to a user, group or room.
    pub async fn push(&self, to: &str, texts: &[String]) -> Result<()> {
        let body = PushRequest {
            to,
            messages: text_messages(texts),
        };
        self.post("/v2/bot/message/push", &body).await?;
        debug!(to, count = texts.len(), "line push sent");
        Ok(())
    }

    /// Answer a webhook event with up to five texts. Tokens are single-use.
    pub async fn reply(&self, reply_token: &str, texts: &[String]) -> Result<()> {
        let body = ReplyRequest {
            reply_token,
            messages: text_messages(texts),
        };
        self.post("/v2/bot/message/reply", &body).await?;
        debug!(count = texts.len(), "line reply sent");
        Ok(())
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}{}", self.api_base, endpoint))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("LINE {endpoint} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("LINE {} returned {}: {}", endpoint, status, detail);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
