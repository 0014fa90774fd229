//! Stayclock Channels — chat channel integrations.
//!
//! This crate provides:
//! - **base**: The `Channel` trait that all channel implementations must satisfy
//! - **manager**: `ChannelManager` — lifecycle orchestration and outbound message routing
//! - **line**: the LINE Messaging API channel (webhook in, push/reply out)

pub mod base;
pub mod line;
pub mod manager;

pub use base::Channel;
pub use line::LineChannel;
pub use manager::ChannelManager;
