//! Demo conversations loaded at startup.
//!
//! Five customers, two of them in live sessions, with message histories
//! generated five minutes apart and ending at `now`.

use crate::conversation::{Contact, Conversation, Message, MessageStatus, PresenceStatus, Priority};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

const AGENT_LINES: &[&str] = &[
    "Hello! How can I help you today?",
    "I understand your concern. Let me look into that for you.",
    "Thank you for providing that information.",
    "I've updated your account settings as requested.",
    "Is there anything else I can assist you with?",
    "I'll escalate this to our technical team and get back to you within 24 hours.",
    "Thank you for your patience while I research this issue.",
];

const CUSTOMER_LINES: &[&str] = &[
    "Hi, I'm having trouble with my account login.",
    "I can't seem to access my dashboard.",
    "The payment didn't go through but I was charged.",
    "Can you help me update my billing information?",
    "I'm interested in upgrading my plan.",
    "The feature doesn't seem to be working as expected.",
    "Thank you for your help!",
    "When will this be resolved?",
    "I need to cancel my subscription.",
];

const MESSAGE_SPACING_MINUTES: i64 = 5;

/// Chance that a generated history message was written by the agent.
const AGENT_SHARE: f64 = 0.4;

struct SeedContact {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    status: PresenceStatus,
    phone: Option<&'static str>,
    company: &'static str,
    tags: &'static [&'static str],
    last_seen_minutes_ago: i64,
}

const CONTACTS: &[SeedContact] = &[
    SeedContact {
        id: "1",
        name: "Sarah Johnson",
        email: "sarah.johnson@email.com",
        status: PresenceStatus::Online,
        phone: Some("+1 (555) 123-4567"),
        company: "TechCorp Inc.",
        tags: &["VIP", "Premium"],
        last_seen_minutes_ago: 0,
    },
    SeedContact {
        id: "2",
        name: "Mike Chen",
        email: "mike.chen@company.com",
        status: PresenceStatus::Away,
        phone: Some("+1 (555) 234-5678"),
        company: "StartupXYZ",
        tags: &["New Customer"],
        last_seen_minutes_ago: 30,
    },
    SeedContact {
        id: "3",
        name: "Emily Rodriguez",
        email: "emily.r@business.co",
        status: PresenceStatus::Busy,
        phone: Some("+1 (555) 345-6789"),
        company: "Business Solutions Ltd",
        tags: &["Support", "Priority"],
        last_seen_minutes_ago: 120,
    },
    SeedContact {
        id: "4",
        name: "David Wilson",
        email: "david.wilson@corp.com",
        status: PresenceStatus::Offline,
        phone: None,
        company: "Corporate Solutions",
        tags: &["Enterprise"],
        last_seen_minutes_ago: 24 * 60,
    },
    SeedContact {
        id: "5",
        name: "Lisa Thompson",
        email: "lisa.t@startup.io",
        status: PresenceStatus::Online,
        phone: Some("+1 (555) 456-7890"),
        company: "InnovateLab",
        tags: &["Beta User", "Feedback"],
        last_seen_minutes_ago: 0,
    },
];

struct SeedConversation {
    id: &'static str,
    contact: usize,
    message_count: usize,
    is_live: bool,
    unread: u32,
    priority: Priority,
    tags: &'static [&'static str],
    agent: &'static str,
    created_minutes_ago: i64,
    updated_minutes_ago: i64,
}

const CONVERSATIONS: &[SeedConversation] = &[
    SeedConversation {
        id: "conv-1",
        contact: 0,
        message_count: 8,
        is_live: true,
        unread: 2,
        priority: Priority::High,
        tags: &["billing", "urgent"],
        agent: "Agent John",
        created_minutes_ago: 2 * 60,
        updated_minutes_ago: 5,
    },
    SeedConversation {
        id: "conv-2",
        contact: 1,
        message_count: 5,
        is_live: true,
        unread: 1,
        priority: Priority::Normal,
        tags: &["onboarding"],
        agent: "Agent Sarah",
        created_minutes_ago: 60,
        updated_minutes_ago: 10,
    },
    SeedConversation {
        id: "conv-3",
        contact: 2,
        message_count: 12,
        is_live: false,
        unread: 0,
        priority: Priority::Urgent,
        tags: &["technical", "escalated"],
        agent: "Agent Mike",
        created_minutes_ago: 6 * 60,
        updated_minutes_ago: 3 * 60,
    },
    SeedConversation {
        id: "conv-4",
        contact: 3,
        message_count: 6,
        is_live: false,
        unread: 0,
        priority: Priority::Low,
        tags: &["general"],
        agent: "Agent Lisa",
        created_minutes_ago: 24 * 60,
        updated_minutes_ago: 20 * 60,
    },
    SeedConversation {
        id: "conv-5",
        contact: 4,
        message_count: 4,
        is_live: false,
        unread: 0,
        priority: Priority::Normal,
        tags: &["feedback", "feature-request"],
        agent: "Agent John",
        created_minutes_ago: 48 * 60,
        updated_minutes_ago: 36 * 60,
    },
];

/// The demo contacts.
pub fn demo_contacts(now: DateTime<Utc>) -> Vec<Contact> {
    CONTACTS.iter().map(|seed| build_contact(seed, now)).collect()
}

/// The demo conversations, in dashboard order.
pub fn demo_conversations<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<Conversation> {
    let contacts = demo_contacts(now);
    CONVERSATIONS
        .iter()
        .map(|seed| {
            let messages = demo_messages(seed.id, seed.message_count, now, rng);
            Conversation::new(
                seed.id,
                contacts[seed.contact].clone(),
                seed.is_live,
                seed.priority,
                now - Duration::minutes(seed.created_minutes_ago),
            )
            .with_tags(seed.tags.iter().copied())
            .with_assigned_agent(seed.agent)
            .with_history(
                messages,
                seed.unread,
                now - Duration::minutes(seed.updated_minutes_ago),
            )
        })
        .collect()
}

fn build_contact(seed: &SeedContact, now: DateTime<Utc>) -> Contact {
    let mut contact = Contact::new(seed.id, seed.name, seed.email, seed.status);
    contact.phone = seed.phone.map(str::to_string);
    contact.company = Some(seed.company.to_string());
    contact.tags = seed.tags.iter().map(|t| t.to_string()).collect();
    contact.last_seen = Some(now - Duration::minutes(seed.last_seen_minutes_ago));
    contact
}

fn demo_messages<R: Rng + ?Sized>(
    conversation_id: &str,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Message> {
    (0..count)
        .map(|i| {
            let is_agent = rng.gen_bool(AGENT_SHARE);
            let pool = if is_agent { AGENT_LINES } else { CUSTOMER_LINES };
            let content = pool.choose(rng).copied().unwrap_or_default();
            let minutes_back = (count - i) as i64 * MESSAGE_SPACING_MINUTES;
            let timestamp = now - Duration::minutes(minutes_back);

            let status = is_agent.then(|| {
                if rng.gen_bool(0.5) {
                    MessageStatus::Read
                } else {
                    MessageStatus::Delivered
                }
            });
            Message::restored(
                format!("msg-{}-{}", conversation_id, i),
                content,
                timestamp,
                is_agent,
                status,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded() -> Vec<Conversation> {
        demo_conversations(Utc::now(), &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_demo_shape() {
        let conversations = seeded();
        let ids: Vec<_> = conversations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["conv-1", "conv-2", "conv-3", "conv-4", "conv-5"]);

        let counts: Vec<_> = conversations.iter().map(|c| c.messages().len()).collect();
        assert_eq!(counts, vec![8, 5, 12, 6, 4]);

        let live = conversations.iter().filter(|c| c.is_live).count();
        assert_eq!(live, 2);

        let unread: u32 = conversations.iter().map(|c| c.unread_count()).sum();
        assert_eq!(unread, 3);
    }

    #[test]
    fn test_demo_invariants_hold() {
        for conv in seeded() {
            assert_eq!(conv.last_message(), conv.messages().last());
            assert!(conv.updated_at() >= conv.created_at());
            assert_eq!(conv.contact_id, conv.contact.id);
            for pair in conv.messages().windows(2) {
                assert!(pair[0].timestamp < pair[1].timestamp);
            }
        }
    }

    #[test]
    fn test_demo_statuses_only_on_agent_messages() {
        for conv in seeded() {
            for msg in conv.messages() {
                if msg.is_agent {
                    assert!(matches!(
                        msg.status(),
                        Some(MessageStatus::Delivered | MessageStatus::Read)
                    ));
                } else {
                    assert_eq!(msg.status(), None);
                }
            }
        }
    }

    #[test]
    fn test_demo_messages_have_stable_ids() {
        let conversations = seeded();
        assert_eq!(conversations[0].messages()[0].id, "msg-conv-1-0");
        assert_eq!(conversations[2].messages()[11].id, "msg-conv-3-11");
    }

    #[test]
    fn test_same_seed_same_history() {
        let now = Utc::now();
        let a = demo_conversations(now, &mut StdRng::seed_from_u64(3));
        let b = demo_conversations(now, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
