use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use shared::{Result, ServiceError};
use tracing::error;

use crate::cache::CacheStore;

#[derive(Clone)]
pub struct RedisCache {
    redis: Arc<ConnectionManager>,
}

impl RedisCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis: Arc::new(redis),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.as_ref().clone();

        let value: Option<String> = conn.get(key).await.map_err(|e: RedisError| {
            error!(key = key, error = %e, "Cache get failed");
            ServiceError::Cache(e.to_string())
        })?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.redis.as_ref().clone();

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e: RedisError| {
                error!(key = key, error = %e, "Cache set failed");
                ServiceError::Cache(e.to_string())
            })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.as_ref().clone();

        conn.del::<_, ()>(key).await.map_err(|e: RedisError| {
            error!(key = key, error = %e, "Cache delete failed");
            ServiceError::Cache(e.to_string())
        })?;

        Ok(())
    }
}
