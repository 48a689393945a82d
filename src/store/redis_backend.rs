//! # Redis
//!
//! Production document store. Collections and singletons are stored as JSON strings;
//! counters are plain integers so `INCR`/`DECR` stay atomic on the server. Like sets
//! are native Redis sets. Session keys use `SET EX`.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::Value;

use super::{DocumentStore, StoreError};

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::new(err)
    }
}

/// [`DocumentStore`] backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

fn decode(text: Option<String>) -> Result<Option<Value>, StoreError> {
    text.map(|t| serde_json::from_str(&t).map_err(StoreError::new))
        .transpose()
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut con = self.connection.clone();
        let text: Option<String> = con.get(key).await?;
        decode(text)
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.set::<_, _, ()>(key, value.to_string()).await?;
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        let seconds = ttl.as_secs().max(1);
        con.set_ex::<_, _, ()>(key, value.to_string(), seconds)
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut con = self.connection.clone();
        Ok(con.incr(key, 1).await?)
    }

    async fn decr(&self, key: &str) -> Result<i64, StoreError> {
        let mut con = self.connection.clone();
        Ok(con.decr(key, 1).await?)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        con.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut con = self.connection.clone();
        Ok(con.sismember(key, member).await?)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection.clone();
        let mut keys: Vec<String> = con.keys(pattern).await?;
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut con).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_counter_text_as_json_integer() {
        assert_eq!(decode(Some("7".to_string())).unwrap(), Some(Value::from(7)));
        assert_eq!(decode(None).unwrap(), None);
        assert!(decode(Some("not json".to_string())).is_err());
    }
}
