use async_trait::async_trait;
use redis::AsyncCommands;

use super::{KeyValueStore, KvError};

/// Redis-backed local store, for installations that already run a Redis sidecar.
#[derive(Clone)]
pub struct RedisKv {
    client: redis::Client,
}

impl RedisKv {
    pub fn open(url: &str) -> Result<Self, KvError> {
        Ok(Self {
            client: redis::Client::open(url)?,
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, KvError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
