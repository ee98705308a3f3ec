//! Domain layer of the helpdesk conversation engine.
//!
//! Holds the entity model, the synchronous conversation state machine
//! ([`ConversationBook`](conversation::ConversationBook)), the read-only
//! derivations the dashboard renders from, demo seed data and configuration.
//! Timers and async ownership live in `helpdesk-application`.

pub mod config;
pub mod conversation;
pub mod error;
pub mod seed;
pub mod views;

// Re-export common error type
pub use error::DeskError;
