pub mod leaderboard_cache;
pub mod memory_cache;
pub mod redis_cache;

use async_trait::async_trait;
use shared::Result;

pub use leaderboard_cache::LeaderboardCache;
pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;

/// Shared key/TTL map. Absence on get is a valid outcome, not an error; all
/// writes are idempotent overwrites of a single key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
