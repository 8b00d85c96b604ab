//! Echo bot: repeats text messages, answers `/start` and `/stats`.
//!
//! Keeps `messages_echoed` (number) and `users` (array of user ids) in the bot state, so the
//! counters survive restarts once the state has been saved on shutdown.

use async_trait::async_trait;
use dbot_core::{BotState, DbotError, HandlerError, Result};
use dbot_telegram::{BotApp, BotContext, BotHandler};
use serde_json::{json, Value};
use teloxide::dispatching::{HandlerExt, UpdateFilterExt};
use teloxide::dptree;
use teloxide::prelude::Requester;
use teloxide::types::{Message, Update};
use teloxide::utils::command::BotCommands;
use teloxide::Bot;
use tracing::{info, instrument};

pub const MESSAGES_ECHOED: &str = "messages_echoed";
pub const USERS: &str = "users";

pub const GREETING: &str = "Hello! I'm an Echo Bot. Send me any message and I'll repeat it!";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "say hello.")]
    Start,
    #[command(description = "show echo statistics.")]
    Stats,
}

#[derive(Debug, Default)]
pub struct EchoBot;

impl EchoBot {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BotApp for EchoBot {
    async fn start(&self, ctx: &BotContext) -> Result<BotHandler> {
        let mut state = ctx.state().lock().await;
        init_state(&mut state);
        info!(
            messages_echoed = messages_echoed(&state),
            users = unique_users(&state),
            "Echo bot handlers registered"
        );
        Ok(schema())
    }

    async fn stop(&self, ctx: &BotContext) -> Result<()> {
        let state = ctx.state().lock().await;
        info!(
            messages_echoed = messages_echoed(&state),
            users = unique_users(&state),
            "Echo bot stopped"
        );
        Ok(())
    }
}

/// Commands first; any other text message is echoed.
pub fn schema() -> BotHandler {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
}

#[instrument(skip(bot, msg, ctx), fields(chat_id = msg.chat.id.0))]
async fn handle_command(bot: Bot, msg: Message, cmd: Command, ctx: BotContext) -> Result<()> {
    let reply = {
        let mut state = ctx.state().lock().await;
        match cmd {
            Command::Start => {
                let user = msg.from.as_ref().ok_or(HandlerError::NoSender)?;
                record_user(&mut state, user.id.0);
                GREETING.to_string()
            }
            Command::Stats => stats_text(&state),
        }
    };

    bot.send_message(msg.chat.id, reply)
        .await
        .map_err(|e| DbotError::Bot(e.to_string()))?;
    Ok(())
}

#[instrument(skip(bot, msg, ctx), fields(chat_id = msg.chat.id.0))]
async fn handle_text(bot: Bot, msg: Message, ctx: BotContext) -> Result<()> {
    let text = msg.text().ok_or(HandlerError::NoText)?.to_string();

    {
        let mut state = ctx.state().lock().await;
        record_text_message(&mut state, msg.from.as_ref().map(|user| user.id.0))?;
    }

    bot.send_message(msg.chat.id, text)
        .await
        .map_err(|e| DbotError::Bot(e.to_string()))?;
    info!("Echoed message");
    Ok(())
}

/// Adds the counters if missing; existing (loaded) values are kept.
pub fn init_state(state: &mut BotState) {
    if !state.get(MESSAGES_ECHOED).is_some_and(Value::is_u64) {
        state.insert(MESSAGES_ECHOED.to_string(), json!(0));
    }
    if !state.get(USERS).is_some_and(Value::is_array) {
        state.insert(USERS.to_string(), json!([]));
    }
}

pub fn record_user(state: &mut BotState, user_id: u64) {
    init_state(state);
    if let Some(Value::Array(users)) = state.get_mut(USERS) {
        if !users.iter().any(|u| u.as_u64() == Some(user_id)) {
            users.push(json!(user_id));
        }
    }
}

/// Counts an echoed message and its sender. A message without a sender is rejected and
/// leaves `state` untouched.
pub fn record_text_message(
    state: &mut BotState,
    sender: Option<u64>,
) -> std::result::Result<(), HandlerError> {
    let user_id = sender.ok_or(HandlerError::NoSender)?;
    record_user(state, user_id);
    record_echo(state);
    Ok(())
}

pub fn record_echo(state: &mut BotState) {
    let count = messages_echoed(state);
    state.insert(MESSAGES_ECHOED.to_string(), json!(count + 1));
}

pub fn messages_echoed(state: &BotState) -> u64 {
    state
        .get(MESSAGES_ECHOED)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

pub fn unique_users(state: &BotState) -> usize {
    state
        .get(USERS)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

pub fn stats_text(state: &BotState) -> String {
    format!(
        "Stats:\n- Messages echoed: {}\n- Unique users: {}",
        messages_echoed(state),
        unique_users(state)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbot_core::BotCredential;
    use std::sync::Arc;
    use storage::{InMemoryStore, StateStore};

    #[test]
    fn test_init_state_keeps_loaded_values() {
        let mut state = BotState::new();
        state.insert(MESSAGES_ECHOED.to_string(), json!(12));

        init_state(&mut state);

        assert_eq!(messages_echoed(&state), 12);
        assert_eq!(state.get(USERS), Some(&json!([])));
    }

    #[test]
    fn test_init_state_replaces_wrongly_typed_values() {
        let mut state = BotState::new();
        state.insert(MESSAGES_ECHOED.to_string(), json!("many"));
        state.insert(USERS.to_string(), json!({"1": true}));

        init_state(&mut state);

        assert_eq!(messages_echoed(&state), 0);
        assert_eq!(unique_users(&state), 0);
    }

    #[test]
    fn test_record_user_counts_each_user_once() {
        let mut state = BotState::new();
        record_user(&mut state, 1);
        record_user(&mut state, 2);
        record_user(&mut state, 1);

        assert_eq!(unique_users(&state), 2);
    }

    #[test]
    fn test_record_echo_increments() {
        let mut state = BotState::new();
        record_echo(&mut state);
        record_echo(&mut state);

        assert_eq!(messages_echoed(&state), 2);
    }

    #[test]
    fn test_record_text_message_counts_sender_and_echo() {
        let mut state = BotState::new();
        record_text_message(&mut state, Some(7)).unwrap();
        record_text_message(&mut state, Some(7)).unwrap();

        assert_eq!(messages_echoed(&state), 2);
        assert_eq!(unique_users(&state), 1);
    }

    #[test]
    fn test_record_text_message_without_sender_is_rejected() {
        let mut state = BotState::new();
        record_echo(&mut state);

        let err = record_text_message(&mut state, None).unwrap_err();

        assert!(matches!(err, HandlerError::NoSender));
        assert_eq!(messages_echoed(&state), 1);
        assert_eq!(state.get(USERS), None);
    }

    #[test]
    fn test_stats_text() {
        let mut state = BotState::new();
        record_user(&mut state, 42);
        record_echo(&mut state);

        assert_eq!(
            stats_text(&state),
            "Stats:\n- Messages echoed: 1\n- Unique users: 1"
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "echo_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/stats", "echo_bot").unwrap(), Command::Stats);
        assert!(Command::parse("/unknown", "echo_bot").is_err());
    }

    #[tokio::test]
    async fn test_start_initializes_state() {
        let store = StateStore::new(
            Arc::new(InMemoryStore::new()),
            BotCredential::new("test_token"),
        );
        let ctx = BotContext::new(Bot::new("test_token"), BotState::new(), store, None);

        EchoBot::new().start(&ctx).await.unwrap();

        let state = ctx.state().lock().await;
        assert_eq!(messages_echoed(&state), 0);
        assert_eq!(state.get(USERS), Some(&json!([])));
    }
}
