//! The contract a concrete bot implements.

use async_trait::async_trait;
use dbot_core::{DbotError, Result};
use teloxide::dispatching::UpdateHandler;

use crate::context::BotContext;

/// Update handler tree returned by [`BotApp::start`]. Endpoints may take [`BotContext`] as a
/// parameter; it is registered as a dispatcher dependency.
pub type BotHandler = UpdateHandler<DbotError>;

/// A concrete bot. Both methods are required.
#[async_trait]
pub trait BotApp: Send + Sync {
    /// Registers handlers and performs bot-specific setup. Called once before the event loop.
    async fn start(&self, ctx: &BotContext) -> Result<BotHandler>;

    /// Releases handler resources and performs bot-specific teardown. Called once after an
    /// interruption, after the state has been saved.
    async fn stop(&self, ctx: &BotContext) -> Result<()>;
}
