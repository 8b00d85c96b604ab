//! # dbot-telegram
//!
//! Telegram bot base: [`BotConfig`], the [`BotApp`] contract, the [`BotBase`] lifecycle manager
//! and the teloxide dispatcher event loop. State and status persistence comes from the storage
//! crate; update routing is left to teloxide.

mod app;
mod config;
mod context;
mod event_loop;
mod lifecycle;
mod signal;

pub use app::{BotApp, BotHandler};
pub use config::BotConfig;
pub use context::{BotContext, SharedState};
pub use event_loop::{EventLoop, LoopExit, TelegramEventLoop};
pub use lifecycle::BotBase;
pub use signal::shutdown_signal;
