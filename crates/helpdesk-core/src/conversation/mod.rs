//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `model`: Entity types (`Contact`, `Message`, `Conversation`) and their enums
//! - `book`: The conversation state machine (`ConversationBook`) and its snapshot
//! - `event`: Change descriptions published after every mutation (`StoreChange`)
//! - `notice`: Toast notices for the agent (`Notice`)

mod book;
mod event;
mod model;
mod notice;

// Re-export public API
pub use book::{ConversationBook, DashboardCounters, Inbound, NewCustomer, StoreSnapshot};
pub use event::StoreChange;
pub use model::{
    AgentPresence, Contact, Conversation, Message, MessageStatus, PresenceStatus, Priority,
};
pub use notice::{DEFAULT_PREVIEW_CHARS, Notice};
