use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Helpdesk CLI - live support conversation dashboard", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/helpdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "helpdesk=info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live session and stream its events
    Run {
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Seed for demo data and simulated traffic
        #[arg(long)]
        seed: Option<u64>,

        /// Conversation to open at start
        #[arg(long)]
        select: Option<String>,

        /// Reply to send into the selected conversation
        #[arg(long, requires = "select")]
        reply: Option<String>,
    },
    /// List conversations from the demo data
    Queue {
        /// Filter by contact name or email
        #[arg(long, default_value = "")]
        query: String,

        /// Print the message history of one conversation
        #[arg(long)]
        show: Option<String>,

        /// Seed for demo data
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration if no file exists
    Init,
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config_path = commands::config::resolve_path(cli.config)?;

    match cli.command {
        Commands::Run {
            duration_secs,
            seed,
            select,
            reply,
        } => {
            let config = commands::config::load(&config_path)?;
            commands::run::run(
                &config,
                commands::run::RunOptions {
                    duration_secs,
                    seed,
                    select,
                    reply,
                },
            )
            .await?
        }
        Commands::Queue { query, show, seed } => {
            let config = commands::config::load(&config_path)?;
            commands::queue::list(&config, &query, show.as_deref(), seed)?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_path)?,
            ConfigAction::Path => commands::config::path(&config_path),
            ConfigAction::Init => commands::config::init(&config_path)?,
        },
    }

    Ok(())
}
