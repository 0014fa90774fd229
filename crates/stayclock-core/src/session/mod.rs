//! Session tracking — who is currently checked in, and since when.
//!
//! Sessions live in memory only; a restart clears them.

pub mod store;

pub use store::{Session, SessionStore};
