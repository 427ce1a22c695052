use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::{Result, ServiceError};

use crate::cache::CacheStore;

/// In-process cache with the same key/TTL contract as the Redis one.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, DateTime<Utc>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ServiceError::Internal(format!("Lock error: {}", e)))?;

        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| ServiceError::Internal(format!("Lock error: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(ttl_secs as i64);
        entries.insert(key.to_string(), (value.to_string(), expires_at));

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| ServiceError::Internal(format!("Lock error: {}", e)))?;

        entries.remove(key);

        Ok(())
    }
}
