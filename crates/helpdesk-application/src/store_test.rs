use super::*;
use crate::delivery::DeliveryPipeline;
use crate::scheduler::Scheduler;
use chrono::Utc;
use helpdesk_core::conversation::{Contact, PresenceStatus, Priority};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

fn conversation(id: &str, name: &str, is_live: bool) -> Conversation {
    let contact = Contact::new(
        format!("contact-{}", id),
        name,
        format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
        PresenceStatus::Online,
    );
    Conversation::new(id, contact, is_live, Priority::Normal, Utc::now())
}

fn store() -> ConversationStore {
    let book = ConversationBook::with_conversations(vec![
        conversation("conv-a", "Sarah Johnson", true),
        conversation("conv-b", "Mike Chen", true),
        conversation("conv-c", "David Wilson", false),
    ]);
    ConversationStore::new(book, DeliveryPipeline::default(), Scheduler::new())
}

async fn status_of(store: &ConversationStore, conversation_id: &str, message_id: &str) -> Option<MessageStatus> {
    store
        .find_by_id(conversation_id)
        .await
        .and_then(|c| c.find_message(message_id).and_then(|m| m.status()))
}

fn drain<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(item) => out.push(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return out,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_sent_message_progresses_to_delivered_then_read() {
    let store = store();
    assert!(store.select_conversation("conv-a").await);

    let message = store
        .send_agent_message("conv-a", "Hello! How can I help?")
        .await
        .expect("message should be sent");
    assert!(message.is_agent);
    assert_eq!(message.status(), Some(MessageStatus::Sent));
    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Sent));

    sleep_ms(990).await;
    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Sent));

    sleep_ms(20).await;
    assert_eq!(
        status_of(&store, "conv-a", &message.id).await,
        Some(MessageStatus::Delivered)
    );

    sleep_ms(1_970).await;
    assert_eq!(
        status_of(&store, "conv-a", &message.id).await,
        Some(MessageStatus::Delivered)
    );

    sleep_ms(40).await;
    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Read));

    let conv = store.find_by_id("conv-a").await.expect("conversation exists");
    assert_eq!(conv.last_message().and_then(|m| m.status()), Some(MessageStatus::Read));
    assert_eq!(store.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delivery_deadlines_count_from_send_time() {
    let store = store();
    store.select_conversation("conv-a").await;
    let message = store
        .send_agent_message("conv-a", "Looking into it")
        .await
        .expect("message should be sent");

    // Move the clock before the delivery task gets its first poll.
    tokio::time::advance(Duration::from_millis(600)).await;

    sleep_ms(410).await;
    assert_eq!(
        status_of(&store, "conv-a", &message.id).await,
        Some(MessageStatus::Delivered)
    );

    sleep_ms(2_000).await;
    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Read));
}

#[tokio::test(start_paused = true)]
async fn test_status_events_arrive_in_order() {
    let store = store();
    store.select_conversation("conv-a").await;
    let mut rx = store.subscribe();

    let message = store
        .send_agent_message("conv-a", "Checking on your order")
        .await
        .expect("message should be sent");
    sleep_ms(3_500).await;

    let events = drain(&mut rx);
    let changes: Vec<StoreChange> = events.iter().map(|e| e.change.clone()).collect();
    assert_eq!(
        changes,
        vec![
            StoreChange::MessageAppended {
                conversation_id: "conv-a".to_string(),
                message_id: message.id.clone(),
                is_agent: true,
            },
            StoreChange::StatusChanged {
                conversation_id: "conv-a".to_string(),
                message_id: message.id.clone(),
                status: MessageStatus::Delivered,
            },
            StoreChange::StatusChanged {
                conversation_id: "conv-a".to_string(),
                message_id: message.id.clone(),
                status: MessageStatus::Read,
            },
        ]
    );

    // Every event carries the state right after the change.
    let last = events.last().expect("events published");
    let conv = last.snapshot.find_by_id("conv-a").expect("snapshot has conversation");
    assert_eq!(
        conv.find_message(&message.id).and_then(|m| m.status()),
        Some(MessageStatus::Read)
    );
}

#[tokio::test(start_paused = true)]
async fn test_delivery_follows_original_conversation_after_selection_moves() {
    let store = store();
    store.select_conversation("conv-a").await;
    let message = store
        .send_agent_message("conv-a", "One moment please")
        .await
        .expect("message should be sent");

    store.select_conversation("conv-b").await;
    sleep_ms(3_100).await;

    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Read));
    let other = store.find_by_id("conv-b").await.expect("conversation exists");
    assert!(other.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_message_is_a_no_op() {
    let store = store();
    store.select_conversation("conv-a").await;
    let mut rx = store.subscribe();
    let mut notices = store.subscribe_notices();

    assert!(store.send_agent_message("conv-a", "   \n\t").await.is_none());
    assert!(store.send_agent_message("conv-a", "").await.is_none());

    let conv = store.find_by_id("conv-a").await.expect("conversation exists");
    assert!(conv.messages().is_empty());
    assert_eq!(store.scheduler().pending(), 0);
    assert!(drain(&mut rx).is_empty());
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_send_requires_matching_selection() {
    let store = store();
    assert!(store.send_agent_message("conv-a", "Hello").await.is_none());

    store.select_conversation("conv-b").await;
    assert!(store.send_agent_message("conv-a", "Hello").await.is_none());

    let conv = store.find_by_id("conv-a").await.expect("conversation exists");
    assert!(conv.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_receive_on_unselected_conversation_notifies() {
    let store = store();
    let mut notices = store.subscribe_notices();

    let message = store
        .receive_message("conv-b", "Help! My order never arrived")
        .await
        .expect("message should be received");
    assert!(!message.is_agent);
    assert_eq!(message.status(), None);

    let conv = store.find_by_id("conv-b").await.expect("conversation exists");
    assert_eq!(conv.unread_count(), 1);

    let received = drain(&mut notices);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].title, "New Message");
    assert!(received[0].body.contains("Mike Chen"));
    assert!(received[0].body.contains("Help!"));
}

#[tokio::test(start_paused = true)]
async fn test_receive_on_selected_conversation_is_silent() {
    let store = store();
    store.select_conversation("conv-b").await;
    let mut notices = store.subscribe_notices();

    store
        .receive_message("conv-b", "Are you there?")
        .await
        .expect("message should be received");

    let conv = store.find_by_id("conv-b").await.expect("conversation exists");
    assert_eq!(conv.unread_count(), 0);
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_receive_on_unknown_conversation_changes_nothing() {
    let store = store();
    let before = store.snapshot().await;
    assert!(store.receive_message("conv-missing", "hello").await.is_none());
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test(start_paused = true)]
async fn test_total_unread_tracks_per_conversation_counts() {
    let store = store();
    for _ in 0..3 {
        store.receive_message("conv-a", "ping").await;
    }
    for _ in 0..2 {
        store.receive_message("conv-c", "ping").await;
    }
    assert_eq!(store.total_unread().await, 5);

    store.select_conversation("conv-a").await;
    assert_eq!(store.total_unread().await, 2);

    let snapshot = store.snapshot().await;
    let summed: u64 = snapshot
        .conversations
        .iter()
        .map(|c| u64::from(c.unread_count()))
        .sum();
    assert_eq!(store.total_unread().await, summed);
}

#[tokio::test(start_paused = true)]
async fn test_select_unknown_keeps_selection() {
    let store = store();
    store.select_conversation("conv-a").await;
    assert!(!store.select_conversation("conv-zzz").await);
    assert_eq!(
        store.selected_conversation().await.map(|c| c.id),
        Some("conv-a".to_string())
    );

    assert!(store.deselect_conversation().await);
    assert!(store.selected_conversation().await.is_none());
    assert!(!store.deselect_conversation().await);
}

#[tokio::test(start_paused = true)]
async fn test_create_live_conversation_goes_first_and_notifies() {
    let store = store();
    let mut notices = store.subscribe_notices();

    let created = store
        .create_live_conversation(NewCustomer::numbered(42, 7, "Hi, I need help"))
        .await;
    assert!(created.is_live);
    assert_eq!(created.unread_count(), 1);
    assert_eq!(created.contact.name, "New Customer 42");
    assert_eq!(created.contact.email, "customer7@email.com");

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.conversations[0].id, created.id);
    assert_eq!(store.live_count().await, 3);
    assert_eq!(store.total_count().await, 4);

    let received = drain(&mut notices);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].title, "New Chat Request");
    assert_eq!(received[0].body, "New Customer 42 started a new conversation");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_delivery() {
    let store = store();
    store.select_conversation("conv-a").await;
    let message = store
        .send_agent_message("conv-a", "Let me check")
        .await
        .expect("message should be sent");
    assert_eq!(store.scheduler().pending(), 1);

    store.shutdown().await;
    sleep_ms(5_000).await;

    assert_eq!(status_of(&store, "conv-a", &message.id).await, Some(MessageStatus::Sent));
    assert_eq!(store.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_agent_presence_change_is_published() {
    let store = store();
    let mut rx = store.subscribe();

    assert!(store.set_agent_presence(AgentPresence::Busy).await);
    assert!(!store.set_agent_presence(AgentPresence::Busy).await);
    assert_eq!(store.agent_presence().await, AgentPresence::Busy);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].change,
        StoreChange::AgentPresenceChanged {
            presence: AgentPresence::Busy
        }
    );
    assert_eq!(events[0].snapshot.agent_presence, AgentPresence::Busy);
}
