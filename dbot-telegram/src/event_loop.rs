//! The protocol event loop: teloxide's dispatcher in production, stubs in tests.

use async_trait::async_trait;
use dbot_core::{DbotError, Result};
use std::time::Duration;
use teloxide::dispatching::Dispatcher;
use teloxide::dptree::di::DependencyMap;
use teloxide::prelude::Requester;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::app::BotHandler;

/// Why the event loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown token was cancelled.
    Interrupted,
    /// The loop ended on its own.
    Finished,
}

/// Services protocol events with `handler` until `shutdown` is cancelled.
#[async_trait]
pub trait EventLoop: Send + Sync {
    async fn run(
        &self,
        handler: BotHandler,
        deps: DependencyMap,
        shutdown: CancellationToken,
    ) -> Result<LoopExit>;
}

/// Long-polling teloxide dispatcher.
///
/// `getMe` is checked before dispatching: the dispatcher panics when it cannot fetch the bot
/// identity, so a bad token or unreachable API is returned as an error instead.
pub struct TelegramEventLoop {
    bot: teloxide::Bot,
}

impl TelegramEventLoop {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventLoop for TelegramEventLoop {
    #[instrument(skip_all)]
    async fn run(
        &self,
        handler: BotHandler,
        deps: DependencyMap,
        shutdown: CancellationToken,
    ) -> Result<LoopExit> {
        let me = self.bot.get_me().await.map_err(|e| {
            error!(error = %e, "getMe failed, not starting dispatcher");
            DbotError::Bot(e.to_string())
        })?;
        info!(username = ?me.user.username, "Bot identity checked");

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(deps)
            .default_handler(|update| async move {
                debug!(update = ?update.id, "Unhandled update");
            })
            .build();

        let dispatcher_token = dispatcher.shutdown_token();
        let watcher = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                shutdown.cancelled().await;
                info!("Shutting down dispatcher");
                loop {
                    match dispatcher_token.shutdown() {
                        Ok(done) => {
                            done.await;
                            break;
                        }
                        // Dispatcher has not started polling yet.
                        Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
                    }
                }
            }
        });

        info!("Dispatcher started");
        dispatcher.dispatch().await;
        watcher.abort();

        if shutdown.is_cancelled() {
            Ok(LoopExit::Interrupted)
        } else {
            Ok(LoopExit::Finished)
        }
    }
}
