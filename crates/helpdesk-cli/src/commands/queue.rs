use anyhow::{Result, bail};
use chrono::{Local, Utc};
use colored::Colorize;
use helpdesk_core::config::DeskConfig;
use helpdesk_core::conversation::{Conversation, Message, MessageStatus, Priority};
use helpdesk_core::seed::demo_conversations;
use helpdesk_core::views::{
    conversation_stats, day_label, group_messages_by_day, partition_conversations, preview,
    relative_age,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const PREVIEW_CHARS: usize = 48;

pub fn list(config: &DeskConfig, query: &str, show: Option<&str>, seed: u64) -> Result<()> {
    if !config.seed_demo_data {
        println!("{}", "Demo data is disabled in the config; nothing to list.".bright_black());
        return Ok(());
    }

    let now = Utc::now();
    let conversations = demo_conversations(now, &mut StdRng::seed_from_u64(seed));

    if let Some(id) = show {
        let Some(conversation) = conversations.iter().find(|c| c.id == id) else {
            bail!("Conversation not found: {}", id);
        };
        print_history(conversation);
        return Ok(());
    }

    let partition = partition_conversations(&conversations, query);
    println!(
        "{}",
        format!("● Live Conversations ({})", partition.live.len()).bright_green().bold()
    );
    for conversation in &partition.live {
        print_row(conversation, now);
    }
    println!();
    println!(
        "{}",
        format!("Past Conversations ({})", partition.past.len()).bright_black().bold()
    );
    for conversation in &partition.past {
        print_row(conversation, now);
    }

    if partition.live.is_empty() && partition.past.is_empty() {
        println!("{}", format!("No conversations match '{}'", query).bright_black());
    }
    Ok(())
}

fn print_row(conversation: &Conversation, now: chrono::DateTime<Utc>) {
    let unread = match conversation.unread_count() {
        0 => String::new(),
        n => format!(" ({})", n).bright_red().bold().to_string(),
    };
    let snippet = conversation
        .last_message()
        .map(|m| preview(&m.content, PREVIEW_CHARS))
        .unwrap_or_default();

    println!(
        "  {:<10} {}{}  {}  {}",
        conversation.id.bright_black(),
        conversation.contact.name.bold(),
        unread,
        priority_badge(conversation.priority),
        relative_age(conversation.updated_at(), now).bright_black()
    );
    println!("             {}", snippet.bright_black());
}

fn print_history(conversation: &Conversation) {
    let contact = &conversation.contact;
    println!("{}", contact.name.bright_magenta().bold());
    println!(
        "{}",
        format!("{} · {} · {}", contact.email, contact.status, conversation.priority).bright_black()
    );
    println!();

    let today = Local::now().date_naive();
    for group in group_messages_by_day(conversation.messages(), &Local) {
        println!("{}", format!("── {} ──", day_label(group.day, today)).bright_black());
        for message in group.messages {
            print_message(message);
        }
    }

    let stats = conversation_stats(conversation);
    println!();
    println!(
        "{}",
        format!(
            "{} messages ({} agent, {} customer), last activity {}",
            stats.total_messages,
            stats.agent_messages,
            stats.customer_messages,
            stats.last_activity.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )
        .bright_black()
    );
}

pub(crate) fn print_message(message: &Message) {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    if message.is_agent {
        println!(
            "  {} {} {}",
            time.to_string().bright_black(),
            format!("You: {}", message.content).green(),
            status_mark(message.status())
        );
    } else {
        println!(
            "  {} {}",
            time.to_string().bright_black(),
            message.content.bright_blue()
        );
    }
}

pub(crate) fn status_mark(status: Option<MessageStatus>) -> String {
    match status {
        Some(MessageStatus::Sent) => "✓".bright_black().to_string(),
        Some(MessageStatus::Delivered) => "✓✓".bright_black().to_string(),
        Some(MessageStatus::Read) => "✓✓".bright_blue().to_string(),
        None => String::new(),
    }
}

fn priority_badge(priority: Priority) -> String {
    let label = priority.to_string();
    match priority {
        Priority::Urgent => label.bright_red().bold().to_string(),
        Priority::High => label.yellow().to_string(),
        Priority::Normal => label.normal().to_string(),
        Priority::Low => label.bright_black().to_string(),
    }
}
