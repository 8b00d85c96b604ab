//! Handle shared by the lifecycle manager, the bot's start/stop and every update handler.

use dbot_core::{BotState, StatusRecord};
use std::sync::Arc;
use storage::StateStore;
use tokio::sync::Mutex;

/// State mutated by handlers. Handlers run concurrently under the dispatcher, hence the lock.
pub type SharedState = Arc<Mutex<BotState>>;

/// Cheap to clone; injected into the dispatcher so endpoints can take it as a parameter.
#[derive(Clone)]
pub struct BotContext {
    bot: teloxide::Bot,
    state: SharedState,
    store: StateStore,
    webhook_url: Option<String>,
}

impl BotContext {
    pub fn new(
        bot: teloxide::Bot,
        state: BotState,
        store: StateStore,
        webhook_url: Option<String>,
    ) -> Self {
        Self {
            bot,
            state: Arc::new(Mutex::new(state)),
            store,
            webhook_url,
        }
    }

    /// The teloxide client handle.
    pub fn bot(&self) -> &teloxide::Bot {
        &self.bot
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// Persists a snapshot of the current state. Best-effort, see [`StateStore::save_state`].
    pub async fn save_state(&self) {
        let snapshot = self.state.lock().await.clone();
        self.store.save_state(&snapshot).await;
    }

    /// Best-effort status write, see [`StateStore::update_status`].
    pub async fn update_status(&self, record: StatusRecord) {
        self.store.update_status(&record).await;
    }
}
