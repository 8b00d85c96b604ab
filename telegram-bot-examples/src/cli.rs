//! Command line for the example bots: run a bot, or print its stored status record.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dbot_telegram::BotConfig;
use std::sync::Arc;
use storage::{RedisStore, StateStore};

#[derive(Parser, Debug)]
#[command(name = "echo-bot")]
#[command(about = "Echo bot: run it, or inspect its status in Redis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot until Ctrl+C (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Print the status record stored for the bot.
    Status {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Reads `bot:<token>` from Redis and prints it.
pub async fn print_status(config: &BotConfig) -> Result<()> {
    let store = RedisStore::open(&config.redis_url)?;
    let states = StateStore::new(Arc::new(store), config.bot_token.clone());

    match states.read_status().await? {
        Some(record) => {
            println!("status: {}", record.status);
            println!("error: {}", record.error.as_deref().unwrap_or("-"));
            println!("webhook_url: {}", record.webhook_url.as_deref().unwrap_or("-"));
        }
        None => println!("No status recorded for this bot"),
    }
    Ok(())
}
