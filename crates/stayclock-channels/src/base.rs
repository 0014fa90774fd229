//! The `Channel` trait — a transport that feeds user texts onto the bus and
//! sends the router's deliveries back.

use async_trait::async_trait;
use stayclock_core::bus::types::OutboundMessage;

/// A messaging transport held by the `ChannelManager` as `Arc<dyn Channel>`.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Identifier matching `InboundMessage.channel` / `OutboundMessage.channel`.
    fn name(&self) -> &str;

    /// Receive events until `stop()`. Long-running.
    async fn start(&self) -> anyhow::Result<()>;

    async fn stop(&self) -> anyhow::Result<()>;

    /// Send every text in `msg.contents`, in order. With `reply_to` set the
    /// delivery answers that event; otherwise it is pushed to `msg.chat_id`.
    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Flattens deliveries into `(mode, text)` pairs.
    #[derive(Default)]
    struct Transcript {
        lines: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Channel for Transcript {
        fn name(&self) -> &str {
            "transcript"
        }

        async fn start(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
            let mode = match &msg.reply_to {
                Some(token) => format!("reply:{token}"),
                None => format!("push:{}", msg.chat_id),
            };
            let mut lines = self.lines.lock().await;
            for text in &msg.contents {
                lines.push((mode.clone(), text.clone()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let transcript = Arc::new(Transcript::default());
        let channel: Arc<dyn Channel> = transcript.clone();

        assert_eq!(channel.name(), "transcript");
        channel.start().await.unwrap();
        channel
            .send(&OutboundMessage::push(
                "transcript",
                "U1",
                vec!["利用終了時刻".into(), "利用時間".into(), "料金".into()],
            ))
            .await
            .unwrap();
        channel
            .send(&OutboundMessage::reply("transcript", "U2", "rt-9", "有効なコマンドを入力してください。"))
            .await
            .unwrap();
        channel.stop().await.unwrap();

        let lines = transcript.lines.lock().await;
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], ("push:U1".to_string(), "利用終了時刻".to_string()));
        assert_eq!(lines[2].1, "料金");
        assert_eq!(lines[3].0, "reply:rt-9");
    }
}
