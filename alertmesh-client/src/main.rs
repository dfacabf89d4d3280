//! AlertMesh client - terminal front end for an emergency chat node
//!
//! - `watch`: poll the node and print the room as it grows
//! - `send` / `alert` / `share-location`: post a message, then resync
//! - `config`: show or interactively create the client configuration

mod wizard;

use alertmesh_client::models::{ConnectionStatus, GeoPoint, Message};
use alertmesh_client::{
    alerts, feed_from_config, presentation, spawn_poller, AlertKind, ClientConfig, FeedEvent,
    MessageFeed, SendOutcome,
};
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alertmesh", version, about = "AlertMesh emergency chat client")]
struct Cli {
    /// Overrides the configured node endpoint
    #[arg(long, global = true, env = "ALERTMESH_SERVER_URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the room, printing messages as they arrive
    Watch,
    /// Send a message
    Send {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Send an emergency alert (canned text when none is given)
    Alert {
        kind: AlertKind,
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Share a position as a [LOCATION] alert
    ShareLocation {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// List the emergency quick actions and input templates
    Templates,
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Interactive setup
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load().await.context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        config.server_base_url = server;
        config.validate().context("Invalid --server value")?;
    }

    match cli.command {
        Command::Watch => watch(&config).await,
        Command::Send { text } => send(&config, &text.join(" ")).await,
        Command::Alert { kind, text } => {
            let text = if text.is_empty() {
                alerts::default_message(kind).to_string()
            } else {
                text.join(" ")
            };
            send(&config, &alerts::format_kind_alert(kind, &text)).await
        }
        Command::ShareLocation { lat, lng } => {
            send(&config, &alerts::location_alert(GeoPoint { lat, lng })).await
        }
        Command::Templates => {
            print_templates();
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            println!("# {}", ClientConfig::config_file_path()?.display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Config(ConfigCommand::Init) => wizard::SetupWizard::run(config).await,
    }
}

async fn watch(config: &ClientConfig) -> Result<()> {
    let feed = feed_from_config(config)?;
    let status = ConnectionStatus::initial(&config.room_name);
    info!(
        "watching {} ({}) via {}",
        status.room_name,
        presentation::status_label(&status),
        config.server_base_url
    );

    let mut events = feed.subscribe();
    let poller = spawn_poller(feed.clone(), config.schedule());
    let mut printed = 0usize;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(FeedEvent::MessagesReplaced { .. }) => {
                    printed = print_new(&feed, printed, &config.nickname);
                }
                Ok(FeedEvent::RefreshFailed { reason }) => warn!("poll failed: {}", reason),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("renderer lagged behind by {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                info!("stopping");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

/// The node's log only grows, so print what lies past the last printed
/// index; start over if the list shrank.
fn print_new(feed: &Arc<MessageFeed>, printed: usize, me: &str) -> usize {
    let messages = feed.messages();
    let start = if messages.len() < printed { 0 } else { printed };
    let now = Local::now();
    for message in &messages[start..] {
        println!("{}", render_line(message, me, now));
    }
    messages.len()
}

fn render_line(message: &Message, me: &str, now: chrono::DateTime<Local>) -> String {
    let marker = if message.is_emergency() { "🚨" } else { "  " };
    let who = if message.sender == me {
        format!("{} (you)", message.sender)
    } else {
        message.sender.clone()
    };
    format!(
        "{} [{}] ({}) {}: {}",
        marker,
        presentation::format_time(message.timestamp, now),
        presentation::initials(&message.sender),
        who,
        message.content
    )
}

async fn send(config: &ClientConfig, text: &str) -> Result<()> {
    let feed = feed_from_config(config)?;
    match feed.send(text).await {
        SendOutcome::Skipped => bail!("nothing to send"),
        SendOutcome::Delivered(_) => {
            println!("✅ Message sent! ({} messages in room)", feed.messages().len());
            Ok(())
        }
        SendOutcome::Failed(e) => {
            error!("{}", e);
            bail!("{}", feed.error().unwrap_or_else(|| "Failed to send message".into()))
        }
    }
}

fn print_templates() {
    println!("Emergency quick actions:");
    for action in alerts::QUICK_ACTIONS {
        println!("  {:<8} {:<18} {}", action.kind, action.label, action.message);
    }
    println!("  {:<8} {:<18} {}", AlertKind::General, "General", alerts::GENERAL_ALERT);
    println!();
    println!("Input templates:");
    for template in alerts::INPUT_TEMPLATES {
        println!("  {}", template);
    }
}
