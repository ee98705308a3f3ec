//! User-facing notices raised by the conversation engine.
//!
//! Notices are consumed by an external toast/alert facility.

use crate::views::preview;
use serde::{Deserialize, Serialize};

/// Default number of characters of message content shown in a notice.
pub const DEFAULT_PREVIEW_CHARS: usize = 50;

const NEW_MESSAGE_TITLE: &str = "New Message";
const NEW_CHAT_TITLE: &str = "New Chat Request";

/// A structured toast notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    /// Inbound message on a conversation the agent is not viewing.
    ///
    /// The body is `"{contact}: {preview}"`, where the preview holds the first
    /// `preview_chars` characters of `content` and is suffixed with `...` when
    /// truncated.
    pub fn new_message(contact_name: &str, content: &str, preview_chars: usize) -> Self {
        Self {
            title: NEW_MESSAGE_TITLE.to_string(),
            body: format!("{}: {}", contact_name, preview(content, preview_chars)),
        }
    }

    /// A new live conversation was opened by a customer.
    pub fn new_chat_request(contact_name: &str) -> Self {
        Self {
            title: NEW_CHAT_TITLE.to_string(),
            body: format!("{} started a new conversation", contact_name),
        }
    }
}
