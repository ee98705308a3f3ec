//! Read-only derivations the dashboard renders from.
//!
//! Everything here is a pure function of a conversation slice, recomputed on
//! each call. Nothing is cached.

use crate::conversation::{Conversation, Message};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Messages sent on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDayGroup<'a> {
    pub day: NaiveDate,
    pub messages: Vec<&'a Message>,
}

/// Groups messages by calendar day in `tz`.
///
/// Groups come out in chronological order; messages within a group keep
/// their append order.
pub fn group_messages_by_day<'a, Tz: TimeZone>(
    messages: &'a [Message],
    tz: &Tz,
) -> Vec<MessageDayGroup<'a>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a Message>> = BTreeMap::new();
    for message in messages {
        let day = message.timestamp.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(message);
    }
    days.into_iter()
        .map(|(day, messages)| MessageDayGroup { day, messages })
        .collect()
}

/// Conversation list split into live and past sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationPartition<'a> {
    pub live: Vec<&'a Conversation>,
    pub past: Vec<&'a Conversation>,
}

/// Splits conversations by `is_live`, keeping only those whose contact name or
/// email contains `query` (case-insensitive). Input order is preserved.
pub fn partition_conversations<'a>(
    conversations: &'a [Conversation],
    query: &str,
) -> ConversationPartition<'a> {
    let (live, past): (Vec<&Conversation>, Vec<&Conversation>) = conversations
        .iter()
        .filter(|c| c.matches_query(query))
        .partition(|c| c.is_live);
    ConversationPartition { live, past }
}

/// The first `limit` characters of `content`, suffixed with `...` when cut.
pub fn preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Compact age label: `now`, `5m`, `3h`, `2d`.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}d", elapsed.num_days())
    }
}

/// Separator label for a day group: `Today`, `Yesterday` or the ISO date.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%Y-%m-%d").to_string()
    }
}

/// Per-conversation figures for the contact details panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total_messages: usize,
    pub agent_messages: usize,
    pub customer_messages: usize,
    pub last_activity: DateTime<Utc>,
}

pub fn conversation_stats(conversation: &Conversation) -> ConversationStats {
    let agent_messages = conversation
        .messages()
        .iter()
        .filter(|m| m.is_agent)
        .count();
    ConversationStats {
        total_messages: conversation.messages().len(),
        agent_messages,
        customer_messages: conversation.messages().len() - agent_messages,
        last_activity: conversation.updated_at(),
    }
}
