//! Channel manager — runs channels and drains router deliveries into them.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use stayclock_core::bus::queue::MessageBus;
use stayclock_core::bus::types::OutboundMessage;

use crate::base::Channel;

type ChannelMap = HashMap<String, Arc<dyn Channel>>;

/// Owns the registered channels and the outbound dispatcher.
///
/// Deliveries are sent one at a time, so a user's messages keep their order.
/// A failed send is logged and dropped; nothing is retried.
pub struct ChannelManager {
    channels: ChannelMap,
    bus: Arc<MessageBus>,
    shutdown: Arc<Notify>,
}

impl ChannelManager {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            channels: HashMap::new(),
            bus,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Register a channel under its `name()`. A later registration replaces
    /// an earlier one with the same name.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        if self.channels.insert(name.clone(), channel).is_some() {
            warn!(channel = %name, "channel re-registered, previous instance replaced");
        } else {
            info!(channel = %name, "registered channel");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.get(name)
    }

    /// Registered channel names, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Spawn every channel's `start` and the dispatcher, then wait.
    ///
    /// Returns `Ok` after `stop_all` or once every channel has stopped
    /// cleanly. Returns the error of the first channel whose `start` fails;
    /// the remaining channels and the dispatcher are then torn down.
    pub async fn start_all(&self) -> Result<()> {
        if self.channels.is_empty() {
            warn!("no channels registered, nothing to start");
            return Ok(());
        }

        info!(channels = ?self.channel_names(), "starting channels");

        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);

        let mut running = JoinSet::new();
        for (name, channel) in &self.channels {
            let channel = channel.clone();
            let name = name.clone();
            running.spawn(async move {
                let result = channel.start().await;
                (name, result)
            });
        }

        let dispatcher = tokio::spawn(dispatch_loop(
            self.bus.clone(),
            self.channels.clone(),
            self.shutdown.clone(),
        ));

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("channel manager shutting down");
                    break Ok(());
                }
                joined = running.join_next() => match joined {
                    Some(Ok((name, Ok(())))) => {
                        info!(channel = %name, "channel stopped");
                    }
                    Some(Ok((name, Err(e)))) => {
                        error!(channel = %name, error = %e, "channel failed");
                        break Err(e.context(format!("channel '{name}' failed")));
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "channel task aborted");
                        break Err(anyhow!("channel task aborted: {e}"));
                    }
                    None => {
                        info!("all channels stopped");
                        break Ok(());
                    }
                },
            }
        };

        dispatcher.abort();
        running.abort_all();
        outcome
    }

    /// Signal shutdown and stop every channel.
    pub async fn stop_all(&self) {
        self.shutdown.notify_waiters();

        for (name, channel) in &self.channels {
            debug!(channel = %name, "stopping channel");
            if let Err(e) = channel.stop().await {
                error!(channel = %name, error = %e, "channel stop failed");
            }
        }
        info!("all channels stopped");
    }
}

/// Hand one delivery to its channel. Returns whether it was sent.
async fn deliver(channels: &ChannelMap, msg: &OutboundMessage) -> bool {
    let Some(channel) = channels.get(&msg.channel) else {
        warn!(channel = %msg.channel, chat_id = %msg.chat_id, "no channel for delivery, dropped");
        return false;
    };

    debug!(
        channel = %msg.channel,
        chat_id = %msg.chat_id,
        messages = msg.contents.len(),
        reply = msg.is_reply(),
        "dispatching delivery"
    );

    match channel.send(msg).await {
        Ok(()) => true,
        Err(e) => {
            error!(
                channel = %msg.channel,
                chat_id = %msg.chat_id,
                error = %e,
                "delivery failed, dropped"
            );
            false
        }
    }
}

async fn dispatch_loop(bus: Arc<MessageBus>, channels: ChannelMap, shutdown: Arc<Notify>) {
    debug!("outbound dispatcher started");
    loop {
        tokio::select! {
            next = bus.consume_outbound() => match next {
                Some(msg) => {
                    deliver(&channels, &msg).await;
                }
                None => {
                    info!("outbound lane closed, dispatcher exiting");
                    break;
                }
            },
            _ = shutdown.notified() => {
                debug!("dispatcher shutting down");
                break;
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
