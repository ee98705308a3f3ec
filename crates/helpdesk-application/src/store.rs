//! The async conversation store.
//!
//! `ConversationStore` owns the [`ConversationBook`] for a session and is the
//! only way to mutate it. Each operation holds the write lock for its whole
//! mutation, publishes a [`StoreEvent`] with a fresh snapshot, and hands
//! follow-up timers to the session's [`Scheduler`].

use crate::delivery::DeliveryPipeline;
use crate::scheduler::Scheduler;
use chrono::Utc;
use helpdesk_core::conversation::{
    AgentPresence, Conversation, ConversationBook, DashboardCounters, Message, MessageStatus,
    NewCustomer, Notice, StoreChange, StoreSnapshot,
};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const EVENT_CAPACITY: usize = 256;

/// A change to the conversation collection plus the state right after it.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub change: StoreChange,
    pub snapshot: Arc<StoreSnapshot>,
}

/// Shared handle to a session's conversation state.
///
/// Cloning is cheap; all clones see the same state.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    book: Arc<RwLock<ConversationBook>>,
    changes: broadcast::Sender<StoreEvent>,
    notices: broadcast::Sender<Notice>,
    scheduler: Scheduler,
    delivery: DeliveryPipeline,
}

impl ConversationStore {
    /// Creates a store around `book`.
    ///
    /// # Arguments
    ///
    /// * `book` - Initial conversation state (empty or seeded)
    /// * `delivery` - Delays used for the sent → delivered → read progression
    /// * `scheduler` - Owner of every timer this store starts
    pub fn new(book: ConversationBook, delivery: DeliveryPipeline, scheduler: Scheduler) -> Self {
        let (changes, _) = broadcast::channel(EVENT_CAPACITY);
        let (notices, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            book: Arc::new(RwLock::new(book)),
            changes,
            notices,
            scheduler,
            delivery,
        }
    }

    /// Subscribes to state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.changes.subscribe()
    }

    /// Subscribes to user-facing notices (toasts).
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Selects a conversation and marks it read.
    ///
    /// Unknown ids are ignored and the current selection is kept.
    pub async fn select_conversation(&self, conversation_id: &str) -> bool {
        let mut book = self.book.write().await;
        if !book.select(conversation_id) {
            tracing::debug!(
                "[ConversationStore] select ignored, unknown conversation: {}",
                conversation_id
            );
            return false;
        }
        tracing::debug!("[ConversationStore] selected conversation: {}", conversation_id);
        self.publish(
            &book,
            StoreChange::SelectionChanged {
                conversation_id: Some(conversation_id.to_string()),
            },
        );
        true
    }

    /// Clears the selection.
    pub async fn deselect_conversation(&self) -> bool {
        let mut book = self.book.write().await;
        if !book.deselect() {
            return false;
        }
        tracing::debug!("[ConversationStore] selection cleared");
        self.publish(
            &book,
            StoreChange::SelectionChanged {
                conversation_id: None,
            },
        );
        true
    }

    /// Sends an agent message into the selected conversation and schedules
    /// its delivery confirmations.
    ///
    /// Returns `None` (and changes nothing) unless `conversation_id` is the
    /// current selection and `content` is not blank.
    pub async fn send_agent_message(&self, conversation_id: &str, content: &str) -> Option<Message> {
        let mut book = self.book.write().await;
        let Some(message) = book.send_agent_message(conversation_id, content, Utc::now()) else {
            tracing::debug!(
                "[ConversationStore] send ignored: conversation={}, selected={:?}, blank={}",
                conversation_id,
                book.selected_id(),
                content.trim().is_empty()
            );
            return None;
        };
        tracing::debug!(
            "[ConversationStore] agent message {} sent to {}",
            message.id,
            conversation_id
        );
        self.publish(
            &book,
            StoreChange::MessageAppended {
                conversation_id: conversation_id.to_string(),
                message_id: message.id.clone(),
                is_agent: true,
            },
        );
        drop(book);

        self.delivery.schedule(self, conversation_id, &message.id);
        Some(message)
    }

    /// Appends an inbound customer message.
    ///
    /// Raises a notice when the conversation is not the one being viewed.
    pub async fn receive_message(&self, conversation_id: &str, content: &str) -> Option<Message> {
        let mut book = self.book.write().await;
        let Some(inbound) = book.receive_message(conversation_id, content, Utc::now()) else {
            tracing::debug!(
                "[ConversationStore] receive ignored, unknown conversation: {}",
                conversation_id
            );
            return None;
        };
        tracing::debug!(
            "[ConversationStore] inbound message {} on {} (notify={})",
            inbound.message.id,
            conversation_id,
            inbound.notice.is_some()
        );
        self.publish(
            &book,
            StoreChange::MessageAppended {
                conversation_id: conversation_id.to_string(),
                message_id: inbound.message.id.clone(),
                is_agent: false,
            },
        );
        drop(book);

        if let Some(notice) = inbound.notice {
            self.notify(notice);
        }
        Some(inbound.message)
    }

    /// Opens a new live conversation at the front of the list.
    pub async fn create_live_conversation(&self, customer: NewCustomer) -> Conversation {
        let mut book = self.book.write().await;
        let (conversation, notice) = book.create_live_conversation(customer, Utc::now());
        tracing::info!(
            "[ConversationStore] new live conversation {} from {}",
            conversation.id,
            conversation.contact.name
        );
        self.publish(
            &book,
            StoreChange::ConversationCreated {
                conversation_id: conversation.id.clone(),
            },
        );
        drop(book);

        self.notify(notice);
        conversation
    }

    pub async fn set_agent_presence(&self, presence: AgentPresence) -> bool {
        let mut book = self.book.write().await;
        if !book.set_agent_presence(presence) {
            return false;
        }
        tracing::debug!("[ConversationStore] agent presence -> {}", presence);
        self.publish(&book, StoreChange::AgentPresenceChanged { presence });
        true
    }

    /// Applies one delivery-status step. Missing targets are ignored.
    pub(crate) async fn apply_status(
        &self,
        conversation_id: &str,
        message_id: &str,
        status: MessageStatus,
    ) -> bool {
        let mut book = self.book.write().await;
        if !book.advance_status(conversation_id, message_id, status) {
            tracing::debug!(
                "[ConversationStore] status {} not applied to {}/{}",
                status,
                conversation_id,
                message_id
            );
            return false;
        }
        self.publish(
            &book,
            StoreChange::StatusChanged {
                conversation_id: conversation_id.to_string(),
                message_id: message_id.to_string(),
                status,
            },
        );
        true
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub async fn live_count(&self) -> usize {
        self.book.read().await.live_count()
    }

    pub async fn total_count(&self) -> usize {
        self.book.read().await.total_count()
    }

    pub async fn total_unread(&self) -> u64 {
        self.book.read().await.total_unread()
    }

    pub async fn counters(&self) -> DashboardCounters {
        self.book.read().await.counters()
    }

    pub async fn find_by_id(&self, conversation_id: &str) -> Option<Conversation> {
        self.book.read().await.find_by_id(conversation_id).cloned()
    }

    pub async fn selected_conversation(&self) -> Option<Conversation> {
        self.book.read().await.selected_conversation().cloned()
    }

    pub async fn agent_presence(&self) -> AgentPresence {
        self.book.read().await.agent_presence()
    }

    pub async fn live_conversation_ids(&self) -> Vec<String> {
        self.book.read().await.live_conversation_ids()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.book.read().await.snapshot()
    }

    /// Cancels every pending delivery timer and the simulator loop.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    // A send error only means nobody is subscribed right now.
    fn publish(&self, book: &ConversationBook, change: StoreChange) {
        if self.changes.receiver_count() == 0 {
            return;
        }
        let _ = self.changes.send(StoreEvent {
            change,
            snapshot: Arc::new(book.snapshot()),
        });
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!("[ConversationStore] notice: {} - {}", notice.title, notice.body);
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
