//! Storage crate: key-value store abstraction and bot state/status persistence.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`kv_store`] – KeyValueStore trait
//! - [`redis_store`] – RedisStore (lazy multiplexed connection)
//! - [`inmemory`] – InMemoryStore
//! - [`state_store`] – StateStore (load/save state, status record)

mod error;
mod inmemory;
mod kv_store;
mod redis_store;
mod state_store;


pub use error::StorageError;
pub use inmemory::InMemoryStore;
pub use kv_store::KeyValueStore;
pub use redis_store::{RedisStore, DEFAULT_REDIS_URL};
pub use state_store::{state_key, status_key, StateStore, STATE_KEY_PREFIX, STATUS_KEY_PREFIX};
