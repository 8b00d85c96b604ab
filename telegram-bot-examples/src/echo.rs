//! Echo bot binary. State and status are kept in Redis under the bot token.

use anyhow::Result;
use clap::Parser;
use dbot_core::init_tracing;
use dbot_telegram::{BotBase, BotConfig};
use telegram_bot_examples::{print_status, Cli, Commands, EchoBot};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            init_tracing(&config.log_config())?;
            info!("Starting echo bot");

            let base = BotBase::new(&config).await?;
            base.run(&EchoBot::new()).await?;
            Ok(())
        }
        Commands::Status { token } => {
            let config = BotConfig::load(token)?;
            print_status(&config).await
        }
    }
}
