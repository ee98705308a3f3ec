use serde::{Deserialize, Serialize};

use super::{AgentPresence, MessageStatus};

/// What changed in the conversation collection.
///
/// Published alongside a full snapshot so a presentation layer can either
/// re-render from the snapshot or react to the specific change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    /// The selected conversation changed (or was cleared).
    SelectionChanged {
        #[serde(default)]
        conversation_id: Option<String>,
    },
    /// A message was appended to a conversation.
    MessageAppended {
        conversation_id: String,
        message_id: String,
        is_agent: bool,
    },
    /// An agent message advanced its delivery status.
    StatusChanged {
        conversation_id: String,
        message_id: String,
        status: MessageStatus,
    },
    /// A new live conversation was opened.
    ConversationCreated { conversation_id: String },
    /// The agent changed their own presence.
    AgentPresenceChanged { presence: AgentPresence },
}
