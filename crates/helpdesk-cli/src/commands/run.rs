use anyhow::{Context, Result};
use colored::Colorize;
use helpdesk_application::{DeskSession, StoreEvent};
use helpdesk_core::config::DeskConfig;
use helpdesk_core::conversation::{Notice, StoreChange};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use super::queue::{print_message, status_mark};

pub struct RunOptions {
    pub duration_secs: Option<u64>,
    pub seed: Option<u64>,
    pub select: Option<String>,
    pub reply: Option<String>,
}

pub async fn run(config: &DeskConfig, options: RunOptions) -> Result<()> {
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = DeskSession::start(config, rng).context("Failed to start session")?;
    let store = session.store().clone();
    let mut events = store.subscribe();
    let mut notices = store.subscribe_notices();

    let counters = store.counters().await;
    println!("{}", "=== Helpdesk ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "{} live / {} total conversations, {} unread. Press Ctrl-C to stop.",
            counters.live, counters.total, counters.unread
        )
        .bright_black()
    );
    if !session.is_simulating() {
        println!("{}", "Live traffic simulation is off.".bright_black());
    }
    println!();

    if let Some(id) = &options.select {
        if !store.select_conversation(id).await {
            println!("{}", format!("Unknown conversation: {}", id).red());
        } else if let Some(reply) = &options.reply {
            if store.send_agent_message(id, reply).await.is_none() {
                println!("{}", "Reply was empty; nothing sent.".bright_black());
            }
        }
    }

    let deadline = async {
        match options.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Run] event stream lagged, skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            notice = notices.recv() => match notice {
                Ok(notice) => print_notice(&notice),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                println!();
                break;
            }
            _ = &mut deadline => break,
        }
    }

    session.shutdown().await;

    let counters = store.counters().await;
    println!(
        "{}",
        format!(
            "Stopped: {} live / {} total conversations, {} unread.",
            counters.live, counters.total, counters.unread
        )
        .bright_green()
    );
    Ok(())
}

fn print_event(event: &StoreEvent) {
    let snapshot = &event.snapshot;
    match &event.change {
        StoreChange::MessageAppended {
            conversation_id,
            message_id,
            ..
        } => {
            let Some(conversation) = snapshot.find_by_id(conversation_id) else {
                return;
            };
            println!("{}", format!("[{}]", conversation.contact.name).bright_magenta());
            if let Some(message) = conversation.find_message(message_id) {
                print_message(message);
            }
        }
        StoreChange::StatusChanged {
            conversation_id,
            message_id,
            status,
        } => {
            println!(
                "{}",
                format!("  {} in {} is now {} {}", message_id, conversation_id, status, status_mark(Some(*status)))
                    .bright_black()
            );
        }
        StoreChange::ConversationCreated { conversation_id } => {
            if let Some(conversation) = snapshot.find_by_id(conversation_id) {
                println!(
                    "{}",
                    format!(
                        "● New live conversation with {} <{}>",
                        conversation.contact.name, conversation.contact.email
                    )
                    .bright_green()
                );
                if let Some(message) = conversation.last_message() {
                    print_message(message);
                }
            }
        }
        StoreChange::SelectionChanged { conversation_id } => match conversation_id
            .as_deref()
            .and_then(|id| snapshot.find_by_id(id))
        {
            Some(conversation) => println!(
                "{}",
                format!("Opened conversation with {}", conversation.contact.name).cyan()
            ),
            None => println!("{}", "Closed conversation".cyan()),
        },
        StoreChange::AgentPresenceChanged { presence } => {
            println!("{}", format!("Presence: {}", presence).cyan());
        }
    }
}

fn print_notice(notice: &Notice) {
    println!("🔔 {} {}", notice.title.yellow().bold(), notice.body);
}
