use super::model::{AgentPresence, Contact, Conversation, Message, MessageStatus, PresenceStatus, Priority};
use super::notice::{DEFAULT_PREVIEW_CHARS, Notice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a customer opening a new live conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    /// First inbound message of the session.
    pub greeting: String,
    pub assigned_agent: Option<String>,
}

impl NewCustomer {
    /// The synthetic "New Customer N" identity used by simulated traffic.
    pub fn numbered(name_number: u32, email_number: u32, greeting: impl Into<String>) -> Self {
        Self {
            name: format!("New Customer {}", name_number),
            email: format!("customer{}@email.com", email_number),
            greeting: greeting.into(),
            assigned_agent: None,
        }
    }

    pub fn with_assigned_agent(mut self, agent: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent.into());
        self
    }
}

/// Result of appending an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub message: Message,
    /// Set only when the conversation was not selected.
    pub notice: Option<Notice>,
}

/// Headline counters shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounters {
    pub live: usize,
    pub total: usize,
    pub unread: u64,
}

/// Immutable copy of the whole book, handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SnapshotRecord")]
pub struct StoreSnapshot {
    pub conversations: Vec<Conversation>,
    pub selected_conversation_id: Option<String>,
    pub agent_presence: AgentPresence,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    #[serde(default)]
    conversations: Vec<Conversation>,
    #[serde(default)]
    selected_conversation_id: Option<String>,
    #[serde(default)]
    agent_presence: AgentPresence,
}

impl From<SnapshotRecord> for StoreSnapshot {
    /// A selection that names no conversation in the snapshot is dropped.
    fn from(record: SnapshotRecord) -> Self {
        let selected_conversation_id = record
            .selected_conversation_id
            .filter(|id| record.conversations.iter().any(|c| &c.id == id));
        Self {
            conversations: record.conversations,
            selected_conversation_id,
            agent_presence: record.agent_presence,
        }
    }
}

impl StoreSnapshot {
    pub fn find_by_id(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn selected_conversation(&self) -> Option<&Conversation> {
        self.selected_conversation_id
            .as_deref()
            .and_then(|id| self.find_by_id(id))
    }
}

/// The conversation state machine.
///
/// Owns the conversation collection, the selection and the agent's presence.
/// Every operation is total: unknown ids and blank input are no-ops reported
/// through the return value, never errors.
#[derive(Debug, Clone)]
pub struct ConversationBook {
    conversations: Vec<Conversation>,
    selected_id: Option<String>,
    agent_presence: AgentPresence,
    preview_chars: usize,
}

impl Default for ConversationBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationBook {
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            selected_id: None,
            agent_presence: AgentPresence::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Creates a book pre-populated with existing conversations.
    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            ..Self::new()
        }
    }

    /// Sets how many characters of message content a notice previews.
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Selects a conversation and clears its unread count.
    ///
    /// Returns `false` when the id is unknown; the selection is left as is.
    pub fn select(&mut self, conversation_id: &str) -> bool {
        let Some(conv) = self.find_mut(conversation_id) else {
            return false;
        };
        conv.mark_read();
        self.selected_id = Some(conversation_id.to_string());
        true
    }

    /// Clears the selection. Returns whether anything was selected.
    pub fn deselect(&mut self) -> bool {
        self.selected_id.take().is_some()
    }

    /// Appends an agent message to the selected conversation.
    ///
    /// No-op (returns `None`) unless `conversation_id` is the current selection
    /// and `content` has non-whitespace characters.
    pub fn send_agent_message(
        &mut self,
        conversation_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Option<Message> {
        if self.selected_id.as_deref() != Some(conversation_id) || content.trim().is_empty() {
            return None;
        }
        let conv = self.find_mut(conversation_id)?;
        let message = Message::agent(content, now);
        conv.append(message.clone());
        conv.mark_read();
        Some(message)
    }

    /// Appends a customer message.
    ///
    /// Increments unread and produces a notice only when the conversation is
    /// not selected.
    pub fn receive_message(
        &mut self,
        conversation_id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Option<Inbound> {
        let selected = self.is_selected(conversation_id);
        let preview_chars = self.preview_chars;
        let conv = self.find_mut(conversation_id)?;
        let message = Message::customer(content, now);
        conv.append(message.clone());

        let notice = if selected {
            conv.mark_read();
            None
        } else {
            conv.bump_unread();
            Some(Notice::new_message(&conv.contact.name, content, preview_chars))
        };

        Some(Inbound { message, notice })
    }

    /// Opens a new live conversation for `customer` at the front of the book.
    pub fn create_live_conversation(
        &mut self,
        customer: NewCustomer,
        now: DateTime<Utc>,
    ) -> (Conversation, Notice) {
        let contact_id = format!("contact-{}", Uuid::new_v4());
        let contact = Contact::new(contact_id, customer.name, customer.email, PresenceStatus::Online);
        let notice = Notice::new_chat_request(&contact.name);

        let mut conv = Conversation::new(
            format!("conv-{}", Uuid::new_v4()),
            contact,
            true,
            Priority::Normal,
            now,
        );
        if let Some(agent) = customer.assigned_agent {
            conv = conv.with_assigned_agent(agent);
        }
        conv.append(Message::customer(customer.greeting, now));
        conv.bump_unread();

        self.conversations.insert(0, conv.clone());
        (conv, notice)
    }

    /// Advances one message's delivery status by one step.
    ///
    /// Returns `false` if the conversation or message is gone, or the
    /// transition would repeat, skip or regress.
    pub fn advance_status(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        to: MessageStatus,
    ) -> bool {
        self.find_mut(conversation_id)
            .is_some_and(|conv| conv.advance_message_status(message_id, to))
    }

    /// Returns `false` if the presence was already `presence`.
    pub fn set_agent_presence(&mut self, presence: AgentPresence) -> bool {
        if self.agent_presence == presence {
            return false;
        }
        self.agent_presence = presence;
        true
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn find_by_id(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_conversation(&self) -> Option<&Conversation> {
        self.selected_id.as_deref().and_then(|id| self.find_by_id(id))
    }

    pub fn is_selected(&self, conversation_id: &str) -> bool {
        self.selected_id.as_deref() == Some(conversation_id)
    }

    pub fn agent_presence(&self) -> AgentPresence {
        self.agent_presence
    }

    pub fn live_count(&self) -> usize {
        self.conversations.iter().filter(|c| c.is_live).count()
    }

    pub fn total_count(&self) -> usize {
        self.conversations.len()
    }

    pub fn total_unread(&self) -> u64 {
        self.conversations
            .iter()
            .map(|c| u64::from(c.unread_count()))
            .sum()
    }

    pub fn counters(&self) -> DashboardCounters {
        DashboardCounters {
            live: self.live_count(),
            total: self.total_count(),
            unread: self.total_unread(),
        }
    }

    /// Ids of the live conversations, in book order.
    pub fn live_conversation_ids(&self) -> Vec<String> {
        self.conversations
            .iter()
            .filter(|c| c.is_live)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            conversations: self.conversations.clone(),
            selected_conversation_id: self.selected_id.clone(),
            agent_presence: self.agent_presence,
        }
    }

    fn find_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
    }
}
