//! Correio Elegante - terminal client for the festival mail API
//!
//! Send anonymous love notes, watch the balloon board and get new messages
//! read aloud.

mod api;
mod board;
mod commands;
mod compose;
mod config;
mod feedback;
mod models;
mod notify;
mod tui;
mod voting;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::CorreioClient;
use crate::compose::{SenderPolicy, VoicePrefs};
use crate::config::Config;
use crate::models::VoiceGender;
use crate::tui::log_capture::LogBuffer;

#[derive(Parser)]
#[command(name = "correio")]
#[command(about = "Terminal client for the Correio Elegante mail API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the API (overrides CORREIO_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the people who can receive messages
    People,

    /// Send a message
    Send {
        /// Recipient name or id (from `people` output)
        #[arg(short, long)]
        to: String,

        /// Sign the message instead of sending it anonymously
        #[arg(short, long)]
        from: Option<String>,

        /// Voice used when the message is read aloud
        #[arg(long, value_enum, default_value_t = VoiceGender::Female)]
        voice: VoiceGender,

        /// Do not read the message aloud on arrival
        #[arg(long)]
        silent: bool,

        /// Message content
        text: String,
    },

    /// Show message suggestions
    Suggestions,

    /// Search the messages received by one person
    Inbox {
        /// Person id (from `people` output)
        person_id: i64,
    },

    /// Show one page of the balloon board
    Board {
        /// Page to show, starting at 0
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Balloons per page
        #[arg(long, default_value = "10")]
        page_size: usize,
    },

    /// Show the latest message
    Latest,

    /// Acknowledge a message as read
    MarkRead {
        message_id: i64,
    },

    /// List messages by likes
    Popular,

    /// List the ten most liked messages
    Top,

    /// Like a message
    Like {
        /// Your own person id or name
        #[arg(long = "as")]
        voter: String,

        message_id: i64,
    },

    /// Vote for a message
    Vote {
        /// Your own person id or name
        #[arg(long = "as")]
        voter: String,

        message_id: i64,
    },

    /// Show who received the most messages
    Ranking,

    /// Announce new messages as they arrive
    Watch,

    /// Store settings in the config file (`--api-url` is saved as the base URL)
    Configure {
        /// Default signature for TUI messages (empty to send anonymously)
        #[arg(long)]
        sender_name: Option<String>,
    },

    /// Launch the terminal user interface
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the TUI captures it into the debug log pane
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let log_buffer = matches!(cli.command, Commands::Tui).then(LogBuffer::new);
    match &log_buffer {
        Some(buffer) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(buffer.clone()),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }

    let mut config = Config::load()?;

    if let Commands::Configure { sender_name } = &cli.command {
        if let Some(url) = cli.api_url.as_deref() {
            config.api_url = Some(config::parse_api_url(url)?.to_string());
        }
        if let Some(name) = sender_name {
            let name = name.trim();
            config.sender_name = (!name.is_empty()).then(|| name.to_string());
        }
        config.save()?;
        println!("Saved {}", Config::config_path()?.display());
        return Ok(());
    }

    let base_url = config.api_url(cli.api_url.as_deref())?;
    let client = CorreioClient::new(&base_url, config.request_timeout())
        .context("Failed to build the HTTP client")?;
    tracing::debug!("Using API at {}", client.url(""));

    match cli.command {
        Commands::People => commands::list_people(&client).await?,
        Commands::Send {
            to,
            from,
            voice,
            silent,
            text,
        } => {
            tracing::info!("Sending message...");
            let sender = SenderPolicy::from_signature(from.as_deref());
            let voice = VoicePrefs {
                read_aloud: !silent,
                voice,
            };
            commands::send(&client, &to, &text, sender, voice).await?;
        }
        Commands::Suggestions => commands::list_suggestions(&client).await?,
        Commands::Inbox { person_id } => commands::inbox(&client, person_id).await?,
        Commands::Board { page, page_size } => {
            commands::show_board(&client, page, page_size).await?
        }
        Commands::Latest => commands::latest(&client).await?,
        Commands::MarkRead { message_id } => commands::mark_read(&client, message_id).await?,
        Commands::Popular => commands::popular(&client, false).await?,
        Commands::Top => commands::popular(&client, true).await?,
        Commands::Like { voter, message_id } => {
            commands::vote(&client, &voter, message_id, true).await?
        }
        Commands::Vote { voter, message_id } => {
            commands::vote(&client, &voter, message_id, false).await?
        }
        Commands::Ranking => commands::ranking(&client).await?,
        Commands::Watch => commands::watch(&client, &config).await?,
        Commands::Tui => {
            let buffer = log_buffer.unwrap_or_default();
            tui::run(Arc::new(client), config, buffer).await?;
        }
        Commands::Configure { .. } => {}
    }

    Ok(())
}
