//! Bus event types — messages flowing between channels and the command router.

use chrono::{DateTime, Utc};

/// An inbound text event from a channel to the router.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Channel name (e.g. "line", "console").
    pub channel: String,
    /// Sender identifier within the channel. Sessions are keyed by this.
    pub sender_id: String,
    /// Chat/conversation identifier used as the push target.
    pub chat_id: String,
    /// Full text body of the message.
    pub content: String,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
    /// Token for replying to this specific event, if the channel issued one.
    pub reply_token: Option<String>,
}

impl InboundMessage {
    /// Create a new inbound message with minimal required fields.
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        InboundMessage {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
            reply_token: None,
        }
    }

    /// Attach the channel's reply token.
    pub fn with_reply_token(mut self, token: impl Into<String>) -> Self {
        self.reply_token = Some(token.into());
        self
    }
}

/// An outbound delivery from the router to a channel.
///
/// `contents` is delivered in order as separate chat bubbles. With `reply_to`
/// unset the delivery is a push to `chat_id`; otherwise it answers the event
/// that issued the token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Target channel name.
    pub channel: String,
    /// Target chat/conversation identifier.
    pub chat_id: String,
    /// Texts to send, in order.
    pub contents: Vec<String>,
    /// Reply token of the originating event.
    pub reply_to: Option<String>,
}

impl OutboundMessage {
    /// A push delivery of a single text.
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::push(channel, chat_id, vec![content.into()])
    }

    /// A push delivery of several texts.
    pub fn push(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        contents: Vec<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            chat_id: chat_id.into(),
            contents,
            reply_to: None,
        }
    }

    /// A reply to the event identified by `reply_token`.
    pub fn reply(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        reply_token: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            chat_id: chat_id.into(),
            contents: vec![content.into()],
            reply_to: Some(reply_token.into()),
        }
    }

    /// Whether this delivery answers a specific event rather than pushing.
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}
