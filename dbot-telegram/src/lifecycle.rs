//! Lifecycle manager: builds the protocol client and store handle, loads state, runs a
//! [`BotApp`] and turns interruption into an orderly stop.
//!
//! Status transitions written to the store:
//! `starting` → `running` → `stopped` on interruption, or `error` with a message when `start`
//! fails, the event loop fails, or the loop ends without an interruption.

use dbot_core::{BotCredential, BotStatus, DbotError, Result, StatusRecord};
use std::sync::Arc;
use storage::{KeyValueStore, RedisStore, StateStore};
use teloxide::dptree;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::app::BotApp;
use crate::config::BotConfig;
use crate::context::BotContext;
use crate::event_loop::{EventLoop, LoopExit, TelegramEventLoop};
use crate::signal::shutdown_signal;

pub struct BotBase<L = TelegramEventLoop> {
    ctx: BotContext,
    event_loop: L,
}

impl BotBase<TelegramEventLoop> {
    /// Builds the teloxide client and a lazy Redis handle from `config`, then loads state.
    ///
    /// Fails only on configuration errors (empty token, invalid API or Redis URL); an
    /// unreachable Redis just yields an empty state.
    #[instrument(skip(config))]
    pub async fn new(config: &BotConfig) -> Result<Self> {
        config.validate()?;

        let bot = teloxide::Bot::new(config.bot_token.as_str());
        let bot = match config.api_url()? {
            Some(url) => bot.set_api_url(url),
            None => bot,
        };

        let store = RedisStore::open(&config.redis_url)
            .map_err(|e| DbotError::Config(format!("REDIS_URL: {}", e)))?;
        let event_loop = TelegramEventLoop::new(bot.clone());

        Ok(Self::with_parts(
            bot,
            config.bot_token.clone(),
            Arc::new(store),
            config.webhook_url.clone(),
            event_loop,
        )
        .await)
    }
}

impl<L: EventLoop> BotBase<L> {
    /// Assembles a bot base from explicit parts and loads state from `store`.
    pub async fn with_parts(
        bot: teloxide::Bot,
        credential: BotCredential,
        store: Arc<dyn KeyValueStore>,
        webhook_url: Option<String>,
        event_loop: L,
    ) -> Self {
        let store = StateStore::new(store, credential);
        let state = store.load_state().await;
        info!(state_keys = state.len(), "Bot initialized");

        Self {
            ctx: BotContext::new(bot, state, store, webhook_url),
            event_loop,
        }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    pub fn event_loop(&self) -> &L {
        &self.event_loop
    }

    /// Runs `app` until Ctrl+C / SIGTERM. See [`run_until`](Self::run_until).
    pub async fn run<A: BotApp>(&self, app: &A) -> Result<()> {
        let shutdown = CancellationToken::new();
        let watcher = tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                info!("Interruption signal received");
                shutdown.cancel();
            }
        });

        let result = self.run_until(app, shutdown).await;
        watcher.abort();
        result
    }

    /// Starts `app`, services the event loop until `shutdown` is cancelled, then saves state
    /// and stops `app`.
    ///
    /// Errors from `start` or the event loop are recorded as `status=error` and returned;
    /// state is not saved on that path. An error from `stop` is returned as is.
    #[instrument(skip_all)]
    pub async fn run_until<A: BotApp>(&self, app: &A, shutdown: CancellationToken) -> Result<()> {
        self.ctx
            .update_status(StatusRecord::new(BotStatus::Starting))
            .await;

        let handler = match app.start(&self.ctx).await {
            Ok(handler) => handler,
            Err(e) => return Err(self.fail(e).await),
        };

        self.ctx
            .update_status(
                StatusRecord::new(BotStatus::Running)
                    .with_webhook_url(self.ctx.webhook_url().map(str::to_owned)),
            )
            .await;
        info!("Bot started");

        let deps = dptree::deps![self.ctx.clone()];
        match self.event_loop.run(handler, deps, shutdown).await {
            Ok(LoopExit::Interrupted) => {
                info!("Stopping bot...");
                self.ctx.save_state().await;
                app.stop(&self.ctx).await?;
                self.ctx
                    .update_status(StatusRecord::new(BotStatus::Stopped))
                    .await;
                info!("Bot stopped");
                Ok(())
            }
            Ok(LoopExit::Finished) => Err(self.fail(DbotError::EventLoopExited).await),
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn fail(&self, e: DbotError) -> DbotError {
        error!(error = %e, "Error running bot");
        self.ctx
            .update_status(StatusRecord::new(BotStatus::Error).with_error(e.to_string()))
            .await;
        e
    }
}
