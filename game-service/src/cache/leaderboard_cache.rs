use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{record_counter, LeaderboardEntry, Result};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::repository::GameRecordStore;

const LEADERBOARD_KEY_PREFIX: &str = "leaderboard:";
const INVALIDATION_KEY: &str = "leaderboard:invalidate";

pub const LEADERBOARD_TTL_SECS: u64 = 60;
pub const INVALIDATION_TTL_SECS: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedLeaderboard {
    computed_at_ms: i64,
    entries: Vec<LeaderboardEntry>,
}

/// Time-bounded view over the ranking query. Entries are cached per limit;
/// a submission does not delete them (the set of cached limits is
/// unbounded) but writes one short-lived marker that makes every entry
/// computed before it stale. Staleness is therefore bounded by the marker
/// TTL, not strictly zero.
pub struct LeaderboardCache {
    cache: Arc<dyn CacheStore>,
    games: Arc<dyn GameRecordStore>,
}

impl LeaderboardCache {
    pub fn new(cache: Arc<dyn CacheStore>, games: Arc<dyn GameRecordStore>) -> Self {
        Self { cache, games }
    }

    /// Returns the top `limit` entries and whether they came from the
    /// cache. Cache failures degrade to a recompute from the record store;
    /// only record-store failures fail the call.
    pub async fn get(&self, limit: i64) -> Result<(Vec<LeaderboardEntry>, bool)> {
        let key = format!("{}{}", LEADERBOARD_KEY_PREFIX, limit);

        if let Some(entries) = self.lookup(&key).await {
            record_counter("leaderboard.cache.hit", 1);
            return Ok((entries, true));
        }

        record_counter("leaderboard.cache.miss", 1);
        let entries = self.recompute(&key, limit).await?;
        Ok((entries, false))
    }

    /// Marks every previously computed leaderboard stale. Called after a
    /// record write has durably succeeded, never before.
    pub async fn invalidate(&self) {
        let stamp = Utc::now().timestamp_millis().to_string();

        if let Err(e) = self
            .cache
            .set(INVALIDATION_KEY, &stamp, INVALIDATION_TTL_SECS)
            .await
        {
            warn!(error = %e, "Failed to write leaderboard invalidation marker");
        }
    }

    async fn lookup(&self, key: &str) -> Option<Vec<LeaderboardEntry>> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = key, error = %e, "Leaderboard cache read failed, recomputing");
                return None;
            }
        };

        let cached: CachedLeaderboard = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key = key, error = %e, "Discarding unreadable leaderboard cache entry");
                return None;
            }
        };

        match self.cache.get(INVALIDATION_KEY).await {
            Ok(None) => Some(cached.entries),
            Ok(Some(stamp)) => {
                // An unreadable stamp counts as an invalidation, and so
                // does a marker written in the same millisecond as the
                // computation.
                let invalidated_at_ms = stamp.parse::<i64>().unwrap_or(i64::MAX);
                if invalidated_at_ms < cached.computed_at_ms {
                    Some(cached.entries)
                } else {
                    debug!(key = key, "Cached leaderboard predates invalidation marker");
                    None
                }
            }
            Err(e) => {
                warn!(error = %e, "Invalidation marker read failed, recomputing");
                None
            }
        }
    }

    async fn recompute(&self, key: &str, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        // The timestamp is taken before the store read so that a marker
        // written by a concurrent submission postdates this computation.
        let computed_at_ms = Utc::now().timestamp_millis();

        let rows = self.games.top_scores(limit).await?;
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| LeaderboardEntry {
                rank: idx as i64 + 1,
                user_id: row.user_id,
                username: row.username,
                score: row.score,
                taps: row.taps,
                played_at: row.played_at,
            })
            .collect::<Vec<_>>();

        let payload = CachedLeaderboard {
            computed_at_ms,
            entries,
        };
        match serde_json::to_string(&payload) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(key, &raw, LEADERBOARD_TTL_SECS).await {
                    warn!(key = key, error = %e, "Failed to store recomputed leaderboard");
                }
            }
            Err(e) => warn!(key = key, error = %e, "Failed to serialize leaderboard"),
        }

        debug!(key = key, count = payload.entries.len(), "Recomputed leaderboard");
        Ok(payload.entries)
    }
}
