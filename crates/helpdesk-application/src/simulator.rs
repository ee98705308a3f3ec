//! Live-traffic simulator.
//!
//! Emulates a live support queue: on every tick it may push an inbound
//! message into a random live conversation and, independently, may open a
//! new live conversation. Conversations are read fresh from the store on each
//! tick, so newly opened ones become targets on later ticks.

use crate::store::ConversationStore;
use helpdesk_core::config::SimulationConfig;
use helpdesk_core::conversation::NewCustomer;
use rand::Rng;
use tokio::time::{Instant, MissedTickBehavior};

/// Upper bound (exclusive) of the numbers used in synthetic customer names.
const CUSTOMER_NUMBER_RANGE: u32 = 1000;

/// Source of randomness for the simulator.
///
/// Implemented for every [`rand::Rng`]; tests substitute a scripted source.
pub trait TrafficDice: Send {
    /// Returns `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
    /// Number used to label a synthetic customer.
    fn customer_number(&mut self) -> u32;
}

impl<R: Rng + Send> TrafficDice for R {
    fn chance(&mut self, p: f64) -> bool {
        self.gen_range(0.0..1.0) < p
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn customer_number(&mut self) -> u32 {
        self.gen_range(0..CUSTOMER_NUMBER_RANGE)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Conversation that received a simulated inbound message.
    pub inbound_to: Option<String>,
    /// Conversation opened on this tick.
    pub created: Option<String>,
}

pub struct LiveTrafficSimulator {
    config: SimulationConfig,
    dice: Box<dyn TrafficDice>,
}

impl std::fmt::Debug for LiveTrafficSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveTrafficSimulator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LiveTrafficSimulator {
    pub fn new(config: SimulationConfig, dice: impl TrafficDice + 'static) -> Self {
        Self {
            config,
            dice: Box::new(dice),
        }
    }

    /// Runs one tick against the store's current state.
    pub async fn tick(&mut self, store: &ConversationStore) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.dice.chance(self.config.inbound_probability) {
            let live = store.live_conversation_ids().await;
            if live.is_empty() {
                tracing::debug!("[LiveTraffic] inbound drawn but no live conversations");
            } else {
                let target = &live[self.dice.pick(live.len())];
                if store
                    .receive_message(target, &self.config.inbound_text)
                    .await
                    .is_some()
                {
                    outcome.inbound_to = Some(target.clone());
                }
            }
        }

        if self.dice.chance(self.config.new_conversation_probability) {
            let mut customer = NewCustomer::numbered(
                self.dice.customer_number(),
                self.dice.customer_number(),
                self.config.greeting_text.clone(),
            );
            if let Some(agent) = &self.config.assigned_agent {
                customer = customer.with_assigned_agent(agent.clone());
            }
            let conversation = store.create_live_conversation(customer).await;
            outcome.created = Some(conversation.id);
        }

        tracing::debug!(
            "[LiveTraffic] tick: inbound_to={:?}, created={:?}",
            outcome.inbound_to,
            outcome.created
        );
        outcome
    }

    /// Starts the recurring tick on the store's scheduler.
    ///
    /// The first tick fires one full period after start. Returns `false` if
    /// the scheduler is already shut down.
    pub fn start(mut self, store: ConversationStore) -> bool {
        let period = self.config.tick_interval();
        tracing::info!("[LiveTraffic] starting, period={:?}", period);

        let scheduler = store.scheduler().clone();
        scheduler.spawn("live-traffic", async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick(&store).await;
            }
        })
    }
}
