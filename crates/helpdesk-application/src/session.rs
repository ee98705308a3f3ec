//! Wiring for a running dashboard session.

use crate::delivery::DeliveryPipeline;
use crate::scheduler::Scheduler;
use crate::simulator::{LiveTrafficSimulator, TrafficDice};
use crate::store::ConversationStore;
use chrono::Utc;
use helpdesk_core::config::DeskConfig;
use helpdesk_core::conversation::ConversationBook;
use helpdesk_core::error::Result;
use helpdesk_core::seed::demo_conversations;
use rand::Rng;

/// A store plus the background activity attached to it.
///
/// Dropping a session does not stop its timers; call [`DeskSession::shutdown`].
#[derive(Debug)]
pub struct DeskSession {
    store: ConversationStore,
    simulating: bool,
}

impl DeskSession {
    /// Starts a session from configuration.
    ///
    /// `rng` seeds the demo data (when enabled) and then drives the
    /// live-traffic simulator. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` fails [`DeskConfig::validate`].
    pub fn start<R: Rng + Send + 'static>(config: &DeskConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let book = if config.seed_demo_data {
            let conversations = demo_conversations(Utc::now(), &mut rng);
            tracing::info!("[DeskSession] seeded {} demo conversations", conversations.len());
            ConversationBook::with_conversations(conversations)
        } else {
            ConversationBook::new()
        };
        Self::start_with(config, book, rng)
    }

    /// Starts a session around an existing book with an explicit dice source.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` fails [`DeskConfig::validate`].
    pub fn start_with(
        config: &DeskConfig,
        book: ConversationBook,
        dice: impl TrafficDice + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let book = book.with_preview_chars(config.notifications.preview_chars);
        let store = ConversationStore::new(
            book,
            DeliveryPipeline::from_config(&config.delivery),
            Scheduler::new(),
        );

        let simulating = config.simulation.enabled
            && LiveTrafficSimulator::new(config.simulation.clone(), dice).start(store.clone());
        if !simulating {
            tracing::info!("[DeskSession] live traffic simulation disabled");
        }

        Ok(Self { store, simulating })
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating
    }

    /// Stops the simulator and cancels outstanding delivery timers.
    pub async fn shutdown(&self) {
        tracing::info!("[DeskSession] shutting down");
        self.store.shutdown().await;
    }
}
