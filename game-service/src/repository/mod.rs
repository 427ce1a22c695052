pub mod game_repo;
pub mod memory;
pub mod user_repo;

use async_trait::async_trait;
use shared::{Email, GameId, GameRecord, RankedGame, Result, User, UserId, Username};

pub use game_repo::GameRepository;
pub use memory::MemoryStore;
pub use user_repo::UserRepository;

/// Persistent identity store. Lookups return absence as `None`, never as an
/// error; `create` surfaces a uniqueness collision as `DuplicateIdentity`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>>;
}

/// Append-only store of game-play facts plus the read queries derived from
/// them.
#[async_trait]
pub trait GameRecordStore: Send + Sync {
    /// Inserts one record and returns its generated identifier.
    async fn insert(&self, user_id: &UserId, score: i64, taps: i32, duration: i32)
        -> Result<GameId>;

    /// Records joined to usernames, sorted by score descending with ties
    /// broken by earlier `played_at`, truncated to `limit`. Ranks are
    /// assigned by the caller from the returned order.
    async fn top_scores(&self, limit: i64) -> Result<Vec<RankedGame>>;

    async fn recent_for_user(&self, user_id: &UserId, limit: i64) -> Result<Vec<GameRecord>>;

    async fn best_score_for_user(&self, user_id: &UserId) -> Result<i64>;

    async fn count_for_user(&self, user_id: &UserId) -> Result<i64>;

    async fn count_all(&self) -> Result<i64>;
}
