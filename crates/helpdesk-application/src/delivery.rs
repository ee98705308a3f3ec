//! Simulated delivery confirmations for agent messages.
//!
//! Each sent message gets one timer task that walks it through
//! `sent → delivered → read`. Both deadlines are fixed at send time; the read
//! step is only attempted after the delivered step has been applied, so the
//! two transitions can never be observed out of order.

use crate::store::ConversationStore;
use helpdesk_core::config::DeliveryConfig;
use helpdesk_core::conversation::MessageStatus;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPipeline {
    delivered_after: Duration,
    read_after: Duration,
}

impl Default for DeliveryPipeline {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

impl DeliveryPipeline {
    /// Both delays are measured from send time; `read_after` is clamped to be
    /// no earlier than `delivered_after`.
    pub fn new(delivered_after: Duration, read_after: Duration) -> Self {
        Self {
            delivered_after,
            read_after: read_after.max(delivered_after),
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(config.delivered_after(), config.read_after())
    }

    pub fn delivered_after(&self) -> Duration {
        self.delivered_after
    }

    pub fn read_after(&self) -> Duration {
        self.read_after
    }

    /// Starts the confirmation timer for one message.
    ///
    /// Fire-and-forget: the task is owned by the store's scheduler and is
    /// dropped on shutdown. Returns `false` if the scheduler is already shut
    /// down.
    pub fn schedule(&self, store: &ConversationStore, conversation_id: &str, message_id: &str) -> bool {
        let store_handle = store.clone();
        let conversation_id = conversation_id.to_string();
        let message_id = message_id.to_string();
        let sent_at = Instant::now();
        let delivered_at = sent_at + self.delivered_after;
        let read_at = sent_at + self.read_after;

        let scheduled = store.scheduler().spawn("delivery", async move {
            tokio::time::sleep_until(delivered_at).await;
            if !store_handle
                .apply_status(&conversation_id, &message_id, MessageStatus::Delivered)
                .await
            {
                tracing::debug!(
                    "[DeliveryPipeline] {} vanished before delivery, dropping timer",
                    message_id
                );
                return;
            }

            tokio::time::sleep_until(read_at).await;
            store_handle
                .apply_status(&conversation_id, &message_id, MessageStatus::Read)
                .await;
        });

        if !scheduled {
            tracing::debug!("[DeliveryPipeline] not scheduled, session is shut down");
        }
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_after_is_clamped() {
        let pipeline = DeliveryPipeline::new(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(pipeline.read_after(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_delays() {
        let pipeline = DeliveryPipeline::default();
        assert_eq!(pipeline.delivered_after(), Duration::from_secs(1));
        assert_eq!(pipeline.read_after(), Duration::from_secs(3));
    }
}
