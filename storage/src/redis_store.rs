//! Redis-backed [`KeyValueStore`].
//!
//! Opening the store only parses the URL. The multiplexed connection is established on first
//! use and dropped again after an I/O failure so the next command reconnects.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::StorageError;
use crate::kv_store::KeyValueStore;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Creates a store for the given URL without connecting. Fails only if the URL is invalid.
    pub fn open(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StorageError::Connection(format!("invalid redis url: {}", e)))?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        info!("Connected to Redis");
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn command_error(&self, e: RedisError) -> StorageError {
        if e.is_io_error() || e.is_connection_dropped() {
            warn!(error = %e, "Redis connection lost, will reconnect on next command");
            *self.connection.lock().await = None;
            return StorageError::Connection(e.to_string());
        }
        StorageError::Command(e.to_string())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        match conn.set::<_, _, ()>(key, value).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn hset_multiple(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        match conn.hset_multiple::<_, _, _, ()>(key, fields).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_error(e).await),
        }
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let mut conn = self.connection().await?;
        match conn.hgetall::<_, HashMap<String, String>>(key).await {
            Ok(fields) => Ok(fields),
            Err(e) => Err(self.command_error(e).await),
        }
    }
}
