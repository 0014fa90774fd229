//! Stayclock Core — shared building blocks for the check-in bot.
//!
//! This crate contains:
//! - **bus**: inbound/outbound message types and the async message bus
//! - **config**: JSON config schema, loader and env overrides
//! - **session**: the in-memory session store
//! - **billing**: duration → fee conversion
//! - **access**: the admin allow-list
//! - **clock**: injectable time source

pub mod access;
pub mod billing;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;
pub mod utils;

pub use access::AccessPolicy;
pub use billing::{FeeCalculator, FeeResult};
pub use clock::{Clock, SystemClock};
pub use error::StayError;
pub use session::{Session, SessionStore};
