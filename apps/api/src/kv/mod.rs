//! Local durable storage: a flat, string-keyed store.
//!
//! Every record kind lives as one JSON document under one fixed key, and callers
//! always read or replace the whole value. There is no partial or indexed access.
//!
//! Backends: `FileKv` (default), `RedisKv`, `MemoryKv`. Selected once in `main`.

mod file;
mod memory;
mod redis_kv;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileKv;
pub use memory::MemoryKv;
pub use redis_kv::RedisKv;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Whole-value get/set/remove over string keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
    async fn remove(&self, key: &str) -> Result<(), KvError>;
}
