//! Example bots built on dbot-telegram's [`BotBase`](dbot_telegram::BotBase).

pub mod cli;
pub mod echo_bot;

pub use cli::{print_status, Cli, Commands};
pub use echo_bot::{Command, EchoBot};
