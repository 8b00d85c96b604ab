use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StorageError;

/// The handful of key-value commands the bot base needs. Implemented by [`RedisStore`](crate::RedisStore)
/// and [`InMemoryStore`](crate::InMemoryStore).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// String value at `key`, `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Sets several hash fields in one command; fields not listed are left untouched.
    async fn hset_multiple(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StorageError>;
    /// All fields of the hash at `key`; empty when the key does not exist.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StorageError>;
}
