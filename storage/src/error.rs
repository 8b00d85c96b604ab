//! Storage error types.
//!
//! Returned by [`KeyValueStore`](crate::KeyValueStore) implementations. [`StateStore`](crate::StateStore)
//! logs and swallows them for load/save/status writes.

use thiserror::Error;

/// Errors that can occur when talking to the key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Command error: {0}")]
    Command(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
