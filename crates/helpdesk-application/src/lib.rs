//! Application layer for the helpdesk dashboard.
//!
//! Wraps the synchronous conversation model from `helpdesk-core` in an async,
//! shareable store and adds the timed behaviour around it: delivery
//! confirmations for agent messages and the live-traffic simulator.

pub mod delivery;
pub mod scheduler;
pub mod session;
pub mod simulator;
pub mod store;

pub use delivery::DeliveryPipeline;
pub use scheduler::Scheduler;
pub use session::DeskSession;
pub use simulator::{LiveTrafficSimulator, TickOutcome, TrafficDice};
pub use store::{ConversationStore, StoreEvent};
