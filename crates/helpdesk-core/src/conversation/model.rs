//! Conversation domain model.
//!
//! Contacts, messages and conversations as the dashboard renders them. The
//! mutating methods are crate-private: every change goes through
//! [`ConversationBook`](super::ConversationBook) so that the cached
//! `last_message`, `unread_count` and `updated_at` fields stay consistent.

use crate::error::{DeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Presence of a customer contact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Away,
    Busy,
    Offline,
}

/// Presence the support agent advertises for themselves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AgentPresence {
    #[default]
    Online,
    Away,
    Busy,
}

/// Delivery status of an agent-authored message.
///
/// The variants are ordered; a message only ever moves one step forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    /// The status that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => Some(Self::Read),
            Self::Read => None,
        }
    }
}

/// Triage priority of a conversation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// A customer the support session talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Contact {
    /// Creates a contact with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        status: PresenceStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            status,
            last_seen: None,
            phone: None,
            company: None,
            tags: Vec::new(),
        }
    }
}

/// A single message in a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MessageRecord")]
pub struct Message {
    pub id: String,
    /// May be empty; drafts are representable.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_agent: bool,
    /// Present only on agent messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<MessageStatus>,
}

impl Message {
    /// Builds a message with an explicit identity.
    ///
    /// Agent messages start as [`MessageStatus::Sent`]; customer messages
    /// carry no status.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Validation`] if `id` is empty.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        is_agent: bool,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DeskError::validation("message id must not be empty"));
        }
        Ok(Self {
            id,
            content: content.into(),
            timestamp,
            is_agent,
            status: is_agent.then_some(MessageStatus::Sent),
        })
    }

    /// An agent-authored message with a fresh id, in the `sent` state.
    pub fn agent(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_message_id(),
            content: content.into(),
            timestamp,
            is_agent: true,
            status: Some(MessageStatus::Sent),
        }
    }

    /// A customer-authored message with a fresh id.
    pub fn customer(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_message_id(),
            content: content.into(),
            timestamp,
            is_agent: false,
            status: None,
        }
    }

    pub fn status(&self) -> Option<MessageStatus> {
        self.status
    }

    /// Moves the status exactly one step forward to `to`.
    ///
    /// Returns `false` (and changes nothing) for customer messages, for
    /// repeats, regressions and skips.
    pub(crate) fn advance_status(&mut self, to: MessageStatus) -> bool {
        match self.status {
            Some(current) if current.next() == Some(to) => {
                self.status = Some(to);
                true
            }
            _ => false,
        }
    }

    /// Rebuilds a historical message. A status on a customer message is dropped.
    pub(crate) fn restored(
        id: String,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        is_agent: bool,
        status: Option<MessageStatus>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            timestamp,
            is_agent,
            status: status.filter(|_| is_agent),
        }
    }
}

/// Wire form of [`Message`]; converted through [`Message::restored`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRecord {
    id: String,
    content: String,
    timestamp: DateTime<Utc>,
    is_agent: bool,
    #[serde(default)]
    status: Option<MessageStatus>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        // An agent message always carries a status.
        let status = if record.is_agent {
            record.status.or(Some(MessageStatus::Sent))
        } else {
            None
        };
        Message::restored(
            record.id,
            record.content,
            record.timestamp,
            record.is_agent,
            status,
        )
    }
}

fn new_message_id() -> String {
    format!("msg-{}", Uuid::new_v4())
}

/// A thread between one contact and the support session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConversationRecord")]
pub struct Conversation {
    pub id: String,
    pub contact_id: String,
    /// Denormalized copy of the contact for rendering.
    pub contact: Contact,
    messages: Vec<Message>,
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_message: Option<Message>,
    unread_count: u32,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates an empty conversation for `contact`.
    ///
    /// Starts with no messages, zero unread and `updated_at == created_at`.
    pub fn new(
        id: impl Into<String>,
        contact: Contact,
        is_live: bool,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            contact_id: contact.id.clone(),
            contact,
            messages: Vec::new(),
            is_live,
            last_message: None,
            unread_count: 0,
            priority,
            tags: Vec::new(),
            assigned_agent: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Restores a conversation that already has history (seed data, imports).
    ///
    /// `updated_at` is clamped so it is never earlier than `created_at`.
    pub fn with_history(
        mut self,
        messages: Vec<Message>,
        unread_count: u32,
        updated_at: DateTime<Utc>,
    ) -> Self {
        self.last_message = messages.last().cloned();
        self.messages = messages;
        self.unread_count = unread_count;
        self.updated_at = updated_at.max(self.created_at);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assigned_agent(mut self, agent: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent.into());
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn find_message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Case-insensitive substring match against contact name or email.
    ///
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.contact.name.to_lowercase().contains(&query)
            || self.contact.email.to_lowercase().contains(&query)
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.updated_at = message.timestamp.max(self.created_at);
        self.last_message = Some(message.clone());
        self.messages.push(message);
    }

    pub(crate) fn mark_read(&mut self) {
        self.unread_count = 0;
    }

    pub(crate) fn bump_unread(&mut self) {
        self.unread_count = self.unread_count.saturating_add(1);
    }

    pub(crate) fn advance_message_status(&mut self, message_id: &str, to: MessageStatus) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };
        if !message.advance_status(to) {
            return false;
        }
        if let Some(last) = self.last_message.as_mut().filter(|m| m.id == message_id) {
            last.status = Some(to);
        }
        true
    }
}

/// Wire form of [`Conversation`].
///
/// `lastMessage` and `contactId` are derived fields and are rebuilt from
/// `messages` and `contact` rather than read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationRecord {
    id: String,
    contact: Contact,
    #[serde(default)]
    messages: Vec<Message>,
    is_live: bool,
    #[serde(default)]
    unread_count: u32,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    assigned_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        let mut conversation = Conversation::new(
            record.id,
            record.contact,
            record.is_live,
            record.priority,
            record.created_at,
        )
        .with_history(record.messages, record.unread_count, record.updated_at);
        conversation.tags = record.tags;
        conversation.assigned_agent = record.assigned_agent;
        conversation
    }
}
