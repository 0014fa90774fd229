//! Command router — the check-in state machine.
//!
//! Each inbound text is matched against the command table and produces exactly
//! one outbound delivery. A user's state (in or out) lives only in the
//! `SessionStore`.

use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{debug, error, info, warn};

use stayclock_core::bus::queue::MessageBus;
use stayclock_core::bus::types::{InboundMessage, OutboundMessage};
use stayclock_core::config::schema::{BillingConfig, CommandsConfig, Config};
use stayclock_core::utils::fixed_offset;
use stayclock_core::{AccessPolicy, Clock, FeeCalculator, SessionStore, StayError};

use crate::commands::CommandTable;
use crate::messages;

// ─────────────────────────────────────────────
// CommandRouter
// ─────────────────────────────────────────────

/// Dispatches text commands to session, billing and access operations.
pub struct CommandRouter {
    /// Open sessions, shared with anything else that needs to read them.
    sessions: Arc<SessionStore>,
    fees: FeeCalculator,
    access: AccessPolicy,
    clock: Arc<dyn Clock>,
    /// Offset for timestamps shown to users.
    display_offset: FixedOffset,
    discount_notice: String,
    commands: CommandTable,
}

impl CommandRouter {
    /// Create a router with the given collaborators and command keywords.
    pub fn new(
        sessions: Arc<SessionStore>,
        access: AccessPolicy,
        clock: Arc<dyn Clock>,
        billing: &BillingConfig,
        keywords: &CommandsConfig,
    ) -> Self {
        let mut commands = CommandTable::new();
        commands.register(keywords.enter.as_str(), Self::enter);
        commands.register(keywords.exit.as_str(), Self::exit);
        commands.register(keywords.discount.as_str(), Self::discount);
        commands.register(keywords.history.as_str(), Self::history);

        Self {
            sessions,
            fees: FeeCalculator::new(billing.rate_per_hour),
            access,
            clock,
            display_offset: fixed_offset(billing.utc_offset_minutes),
            discount_notice: billing.discount_notice.clone(),
            commands,
        }
    }

    /// Build a router from the loaded configuration.
    pub fn from_config(config: &Config, sessions: Arc<SessionStore>, clock: Arc<dyn Clock>) -> Self {
        let access = AccessPolicy::new(config.access.admins.iter().cloned());
        Self::new(sessions, access, clock, &config.billing, &config.commands)
    }

    /// The session store this router writes to.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Registered command keywords.
    pub fn keywords(&self) -> Vec<String> {
        self.commands.keywords()
    }

    /// Run the router: consume inbound messages from the bus and publish
    /// one delivery for each, in arrival order.
    pub async fn run(&self, bus: Arc<MessageBus>) {
        info!("command router started, waiting for messages");
        loop {
            match bus.consume_inbound().await {
                Some(msg) => {
                    let outbound = self.handle(&msg);
                    if let Err(e) = bus.publish_outbound(outbound).await {
                        error!(error = %e, user_id = %msg.sender_id, "failed to publish outbound message");
                    }
                }
                None => {
                    info!("inbound channel closed, command router exiting");
                    break;
                }
            }
        }
    }

    /// Handle one inbound message and return the delivery for it.
    ///
    /// Never fails: every soft error becomes a notice for the sender.
    pub fn handle(&self, msg: &InboundMessage) -> OutboundMessage {
        debug!(
            channel = %msg.channel,
            user_id = %msg.sender_id,
            content_len = msg.content.len(),
            "handling message"
        );

        let result = match self.commands.get(&msg.content) {
            Some(handler) => handler(self, msg),
            None => Err(StayError::UnrecognizedCommand {
                text: msg.content.clone(),
            }),
        };

        result.unwrap_or_else(|err| self.recover(msg, err))
    }

    /// Turn a soft failure into the notice the user sees.
    fn recover(&self, msg: &InboundMessage, err: StayError) -> OutboundMessage {
        debug!(user_id = %msg.sender_id, error = %err, "command declined");
        match err {
            StayError::NoActiveSession { .. } => push(msg, vec![messages::NO_SESSION_NOTICE.into()]),
            StayError::NotAuthorized { .. } => reply(msg, messages::ADMIN_ONLY_NOTICE),
            StayError::UnrecognizedCommand { .. } => reply(msg, messages::INVALID_COMMAND_NOTICE),
            StayError::NegativeDuration { .. } => {
                // Exit clamps before this point.
                error!(user_id = %msg.sender_id, error = %err, "unexpected negative duration");
                reply(msg, messages::INVALID_COMMAND_NOTICE)
            }
        }
    }

    // ─────────────────────────────────────────
    // Handlers
    // ─────────────────────────────────────────

    fn enter(&self, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        let session = self.sessions.open(&msg.sender_id, self.clock.now());
        info!(user_id = %session.user_id, start = %session.start_time, "session opened");
        Ok(push(
            msg,
            vec![messages::session_started(&session, self.display_offset)],
        ))
    }

    fn exit(&self, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        let session = self
            .sessions
            .close(&msg.sender_id)
            .ok_or_else(|| StayError::NoActiveSession {
                user_id: msg.sender_id.clone(),
            })?;

        let end_time = self.clock.now();
        let result = self.fees.compute_clamped(session.start_time, end_time);
        info!(
            user_id = %session.user_id,
            duration_secs = result.duration.num_seconds(),
            fee = result.fee,
            "session closed"
        );

        Ok(push(
            msg,
            messages::session_ended(end_time, &result, self.display_offset),
        ))
    }

    fn discount(&self, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        Ok(push(msg, vec![self.discount_notice.clone()]))
    }

    fn history(&self, msg: &InboundMessage) -> Result<OutboundMessage, StayError> {
        if !self.access.is_admin(&msg.sender_id) {
            warn!(user_id = %msg.sender_id, "non-admin asked for usage history");
            return Err(StayError::NotAuthorized {
                user_id: msg.sender_id.clone(),
            });
        }

        let sessions = self.sessions.list();
        Ok(push(
            msg,
            messages::usage_history(&sessions, self.display_offset),
        ))
    }
}

/// Push to the sender, keyed by their user id.
fn push(msg: &InboundMessage, contents: Vec<String>) -> OutboundMessage {
    OutboundMessage::push(&msg.channel, &msg.sender_id, contents)
}

/// Reply to the originating event. Channels that issue no reply token get a
/// push instead.
fn reply(msg: &InboundMessage, content: &str) -> OutboundMessage {
    match &msg.reply_token {
        Some(token) => OutboundMessage::reply(&msg.channel, &msg.sender_id, token, content),
        None => push(msg, vec![content.to_string()]),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use stayclock_core::clock::ManualClock;

    const ADMIN: &str = "Uadmin";

    fn make_router() -> (CommandRouter, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        let billing = BillingConfig {
            utc_offset_minutes: 0,
            ..BillingConfig::default()
        };
        let router = CommandRouter::new(
            Arc::new(SessionStore::new()),
            AccessPolicy::new([ADMIN]),
            Arc::new(clock.clone()),
            &billing,
            &CommandsConfig::default(),
        );
        (router, clock)
    }

    fn line(user: &str, text: &str) -> InboundMessage {
        InboundMessage::new("line", user, user, text).with_reply_token(format!("rt-{user}"))
    }

    #[test]
    fn test_enter_pushes_start_time() {
        let (router, _clock) = make_router();

        let out = router.handle(&line("U1", "入室"));
        assert!(!out.is_reply());
        assert_eq!(out.chat_id, "U1");
        assert_eq!(out.contents, vec!["利用開始時刻: 2024-07-01 00:00:00"]);
        assert!(router.sessions().get("U1").is_some());
    }

    #[test]
    fn test_exit_pushes_three_messages() {
        let (router, clock) = make_router();
        router.handle(&line("U1", "入室"));
        clock.advance(Duration::seconds(7140));

        let out = router.handle(&line("U1", "退室"));
        assert!(!out.is_reply());
        assert_eq!(
            out.contents,
            vec![
                "利用終了時刻: 2024-07-01 01:59:00",
                "利用時間: 1:59:00",
                "料金: 1983円",
            ]
        );
        assert!(router.sessions().is_empty());
    }

    #[test]
    fn test_exit_without_session_pushes_notice() {
        let (router, _clock) = make_router();

        let out = router.handle(&line("U1", "退室"));
        assert!(!out.is_reply());
        assert_eq!(out.contents, vec![messages::NO_SESSION_NOTICE]);
        assert!(router.sessions().is_empty());
    }

    #[test]
    fn test_exit_after_clock_skew_charges_nothing() {
        let (router, clock) = make_router();
        router.handle(&line("U1", "入室"));
        clock.advance(Duration::minutes(-10));

        let out = router.handle(&line("U1", "退室"));
        assert_eq!(out.contents[1], "利用時間: 0:00:00");
        assert_eq!(out.contents[2], "料金: 0円");
    }

    #[test]
    fn test_reenter_resets_start() {
        let (router, clock) = make_router();
        router.handle(&line("U1", "入室"));
        clock.advance(Duration::hours(5));
        router.handle(&line("U1", "入室"));
        clock.advance(Duration::hours(1));

        let out = router.handle(&line("U1", "退室"));
        assert_eq!(out.contents[2], "料金: 1000円");
    }

    #[test]
    fn test_discount_pushes_notice() {
        let (router, _clock) = make_router();

        let out = router.handle(&line("U1", "割引"));
        assert!(!out.is_reply());
        assert_eq!(out.contents, vec!["現在、3時間以上の利用で10%割引中です！"]);
    }

    #[test]
    fn test_history_for_admin_lists_sessions() {
        let (router, clock) = make_router();
        router.handle(&line("U1", "入室"));
        clock.advance(Duration::minutes(15));
        router.handle(&line("U2", "入室"));

        let out = router.handle(&line(ADMIN, "利用履歴"));
        assert!(!out.is_reply());
        assert_eq!(out.chat_id, ADMIN);
        assert_eq!(
            out.contents,
            vec![
                "利用履歴:\n\
                 ユーザーID: U1, 開始時刻: 2024-07-01 00:00:00\n\
                 ユーザーID: U2, 開始時刻: 2024-07-01 00:15:00\n"
            ]
        );
    }

    #[test]
    fn test_long_history_spans_several_bubbles() {
        let (router, clock) = make_router();
        for i in 0..200 {
            router.handle(&line(&format!("U{:032}", i), "入室"));
            clock.advance(Duration::seconds(1));
        }

        let out = router.handle(&line(ADMIN, "利用履歴"));
        assert!(!out.is_reply());
        assert!(out.contents.len() > 1);
        assert!(out
            .contents
            .iter()
            .all(|t| t.chars().count() <= messages::MAX_TEXT_CHARS));
        assert_eq!(out.contents.concat().lines().count(), 201);
    }

    #[test]
    fn test_history_for_non_admin_replies_denial() {
        let (router, _clock) = make_router();
        router.handle(&line("U1", "入室"));

        let out = router.handle(&line("U2", "利用履歴"));
        assert_eq!(out.reply_to.as_deref(), Some("rt-U2"));
        assert_eq!(out.contents, vec![messages::ADMIN_ONLY_NOTICE]);
        assert_eq!(router.sessions().len(), 1);
    }

    #[test]
    fn test_unknown_text_replies_invalid() {
        let (router, _clock) = make_router();

        for text in ["hello", "入室 ", "ENTER", ""] {
            let out = router.handle(&line("U1", text));
            assert!(out.is_reply(), "{text:?} should be answered with a reply");
            assert_eq!(out.contents, vec![messages::INVALID_COMMAND_NOTICE]);
        }
        assert!(router.sessions().is_empty());
    }

    #[test]
    fn test_reply_without_token_falls_back_to_push() {
        let (router, _clock) = make_router();

        let out = router.handle(&InboundMessage::new("console", "U1", "U1", "??"));
        assert!(!out.is_reply());
        assert_eq!(out.contents, vec![messages::INVALID_COMMAND_NOTICE]);
    }

    #[test]
    fn test_custom_keywords() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        let keywords = CommandsConfig {
            enter: "checkin".into(),
            exit: "checkout".into(),
            ..CommandsConfig::default()
        };
        let router = CommandRouter::new(
            Arc::new(SessionStore::new()),
            AccessPolicy::default(),
            Arc::new(clock),
            &BillingConfig::default(),
            &keywords,
        );

        router.handle(&line("U1", "checkin"));
        assert!(router.sessions().get("U1").is_some());
        let out = router.handle(&line("U1", "入室"));
        assert!(out.is_reply());
    }

    #[tokio::test]
    async fn test_run_processes_bus_in_order() {
        let (router, _clock) = make_router();
        let bus = Arc::new(MessageBus::new(8));

        bus.publish_inbound(line("U1", "入室")).await.unwrap();
        bus.publish_inbound(line("U1", "割引")).await.unwrap();
        bus.publish_inbound(line("U1", "退室")).await.unwrap();

        let router = Arc::new(router);
        let runner = {
            let router = router.clone();
            let bus = bus.clone();
            tokio::spawn(async move { router.run(bus).await })
        };

        let first = bus.consume_outbound().await.unwrap();
        let second = bus.consume_outbound().await.unwrap();
        let third = bus.consume_outbound().await.unwrap();
        runner.abort();

        assert!(first.contents[0].starts_with("利用開始時刻"));
        assert_eq!(second.contents.len(), 1);
        assert_eq!(third.contents.len(), 3);
    }
}
