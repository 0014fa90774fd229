//! Error taxonomy for session and billing operations.
//!
//! Every variant is a soft failure: the router turns it into a chat notice
//! instead of failing the interaction.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StayError {
    /// Exit requested by a user with no open session.
    #[error("no active session for user {user_id}")]
    NoActiveSession { user_id: String },

    /// A non-admin asked for an admin-only command.
    #[error("user {user_id} is not an administrator")]
    NotAuthorized { user_id: String },

    /// The message body matched no command keyword.
    #[error("unrecognized command: {text:?}")]
    UnrecognizedCommand { text: String },

    /// The end of a session precedes its start (clock skew).
    #[error("end time {end} precedes start time {start}")]
    NegativeDuration {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
