//! Stayclock Router — turns chat commands into session operations.
//!
//! This crate contains:
//! - **commands**: the keyword → handler table
//! - **router**: the check-in state machine and its bus loop
//! - **messages**: the texts users receive

pub mod commands;
pub mod messages;
pub mod router;

pub use commands::CommandTable;
pub use router::CommandRouter;
