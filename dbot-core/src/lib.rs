//! # dbot-core
//!
//! Core types for the bot base: [`BotCredential`], [`BotState`], [`StatusRecord`], the error
//! types, and tracing initialization. Transport-agnostic; used by storage and dbot-telegram.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{DbotError, HandlerError, Result};
pub use logger::{init_tracing, LogConfig};
pub use types::{BotCredential, BotState, BotStatus, StatusRecord, UnknownStatus};
