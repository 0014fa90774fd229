//! Command table — maps an exact keyword to its handler.
//!
//! The router registers one handler per configured keyword and looks the
//! whole message body up here. There is no partial or case-folded matching.

use std::collections::HashMap;

use stayclock_core::bus::types::{InboundMessage, OutboundMessage};
use stayclock_core::StayError;
use tracing::{info, warn};

use crate::router::CommandRouter;

/// A command handler. Soft failures come back as `Err` and are turned into
/// notices by the router.
pub type Handler = fn(&CommandRouter, &InboundMessage) -> Result<OutboundMessage, StayError>;

/// Stores handlers keyed by their keyword.
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<String, Handler>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A keyword that is already taken is overwritten.
    pub fn register(&mut self, keyword: impl Into<String>, handler: Handler) {
        let keyword = keyword.into();
        if self.handlers.insert(keyword.clone(), handler).is_some() {
            warn!(keyword = %keyword, "command keyword registered twice, last one wins");
        } else {
            info!(keyword = %keyword, "registered command");
        }
    }

    /// Look up the handler for a full message body.
    pub fn get(&self, text: &str) -> Option<Handler> {
        self.handlers.get(text).copied()
    }

    /// Keywords of all registered commands, sorted for determinism.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = self.handlers.keys().cloned().collect();
        keywords.sort();
        keywords
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: &CommandRouter, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        Ok(OutboundMessage::new(&msg.channel, &msg.sender_id, "ok"))
    }

    fn fail(_: &CommandRouter, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        Err(StayError::NoActiveSession {
            user_id: msg.sender_id.clone(),
        })
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut table = CommandTable::new();
        table.register("入室", ok);

        assert!(table.get("入室").is_some());
        assert!(table.get("入室 ").is_none());
        assert!(table.get(" 入室").is_none());
        assert!(table.get("入").is_none());
        assert!(table.get("").is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let mut table = CommandTable::new();
        table.register("x", ok);
        table.register("x", fail);

        assert_eq!(table.len(), 1);
        assert_eq!(table.keywords(), vec!["x"]);
    }

    #[test]
    fn test_keywords_sorted() {
        let mut table = CommandTable::new();
        table.register("b", ok);
        table.register("a", ok);
        table.register("c", ok);

        assert_eq!(table.keywords(), vec!["a", "b", "c"]);
        assert!(!table.is_empty());
    }
}
