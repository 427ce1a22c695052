use std::sync::Arc;

use shared::{GlobalStats, Result, UserStats};
use tracing::warn;

use crate::cache::CacheStore;
use crate::repository::GameRecordStore;
use crate::service::AuthService;

const RECENT_GAMES_LIMIT: i64 = 10;

pub const USER_STATS_TTL_SECS: u64 = 300;

pub struct StatsService {
    auth: Arc<AuthService>,
    games: Arc<dyn GameRecordStore>,
    cache: Arc<dyn CacheStore>,
}

impl StatsService {
    pub fn new(
        auth: Arc<AuthService>,
        games: Arc<dyn GameRecordStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self { auth, games, cache }
    }

    /// Per-user aggregates under their own, longer TTL. The leaderboard's
    /// invalidation marker is deliberately not consulted here: user stats
    /// may lag a submission by up to the full TTL.
    pub async fn get_user_stats(&self, token: &str) -> Result<(UserStats, bool)> {
        let user_id = self.auth.authenticate(token)?;
        let key = format!("user:{}:stats", user_id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<UserStats>(&raw) {
                Ok(stats) => return Ok((stats, true)),
                Err(e) => warn!(key = %key, error = %e, "Discarding unreadable stats cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Stats cache read failed, recomputing"),
        }

        let stats = UserStats {
            total_games: self.games.count_for_user(&user_id).await?,
            best_score: self.games.best_score_for_user(&user_id).await?,
            recent_games: self
                .games
                .recent_for_user(&user_id, RECENT_GAMES_LIMIT)
                .await?,
        };

        match serde_json::to_string(&stats) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw, USER_STATS_TTL_SECS).await {
                    warn!(key = %key, error = %e, "Failed to store user stats");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize user stats"),
        }

        Ok((stats, false))
    }

    /// Always recomputed; no cache entry to go stale.
    pub async fn get_global_stats(&self, token: &str) -> Result<GlobalStats> {
        self.auth.authenticate(token)?;

        Ok(GlobalStats {
            total_games: self.games.count_all().await?,
        })
    }
}
