//! Best-effort persistence of bot state and status.
//!
//! Keys are namespaced by the bot credential:
//! - `bot_state:<token>` holds the JSON-encoded [`BotState`]
//! - `bot:<token>` is a hash with `status`, `error` and `webhook_url`
//!
//! Load, save and status writes never fail towards the caller: errors are logged and the
//! operation degrades to an empty state or a dropped write. Nothing is retried.

use dbot_core::{BotCredential, BotState, StatusRecord};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::error::StorageError;
use crate::kv_store::KeyValueStore;

pub const STATE_KEY_PREFIX: &str = "bot_state:";
pub const STATUS_KEY_PREFIX: &str = "bot:";

pub fn state_key(credential: &BotCredential) -> String {
    format!("{}{}", STATE_KEY_PREFIX, credential.as_str())
}

pub fn status_key(credential: &BotCredential) -> String {
    format!("{}{}", STATUS_KEY_PREFIX, credential.as_str())
}

#[derive(Clone)]
pub struct StateStore {
    store: Arc<dyn KeyValueStore>,
    credential: BotCredential,
}

impl StateStore {
    pub fn new(store: Arc<dyn KeyValueStore>, credential: BotCredential) -> Self {
        Self { store, credential }
    }

    pub fn credential(&self) -> &BotCredential {
        &self.credential
    }

    /// Loads the persisted state; empty when missing, malformed or unreachable.
    #[instrument(skip(self))]
    pub async fn load_state(&self) -> BotState {
        let payload = match self.store.get(&state_key(&self.credential)).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No stored state, starting empty");
                return BotState::new();
            }
            Err(e) => {
                error!(error = %e, "Error loading state");
                return BotState::new();
            }
        };

        match BotState::from_json(&payload) {
            Ok(state) => {
                debug!(keys = state.len(), "Loaded state");
                state
            }
            Err(e) => {
                error!(error = %e, "Error loading state: stored payload is not a JSON object");
                BotState::new()
            }
        }
    }

    /// Writes the whole state as JSON. Failures are logged and the write is dropped.
    #[instrument(skip(self, state))]
    pub async fn save_state(&self, state: &BotState) {
        if let Err(e) = self.try_save_state(state).await {
            error!(error = %e, "Error saving state");
        }
    }

    async fn try_save_state(&self, state: &BotState) -> Result<(), StorageError> {
        let payload = state.to_json()?;
        self.store
            .set(&state_key(&self.credential), &payload)
            .await?;
        debug!(keys = state.len(), "Saved state");
        Ok(())
    }

    /// Overwrites the status hash. Failures are logged and the write is dropped.
    #[instrument(skip(self, record), fields(status = %record.status))]
    pub async fn update_status(&self, record: &StatusRecord) {
        let fields = record.to_fields();
        let fields: Vec<(&str, &str)> = fields
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        match self
            .store
            .hset_multiple(&status_key(&self.credential), &fields)
            .await
        {
            Ok(()) => debug!("Updated status"),
            Err(e) => error!(error = %e, "Error updating status"),
        }
    }

    /// Reads the status hash back. `None` when no status was ever written.
    pub async fn read_status(&self) -> Result<Option<StatusRecord>, StorageError> {
        let fields = self.store.hgetall(&status_key(&self.credential)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        StatusRecord::from_fields(&fields)
            .map(Some)
            .map_err(|e| StorageError::InvalidRecord(e.to_string()))
    }
}
