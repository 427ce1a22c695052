use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use shared::{Email, GameId, GameRecord, RankedGame, Result, ServiceError, User, UserId, Username};

use crate::repository::{CredentialStore, GameRecordStore};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    games: Vec<GameRecord>,
}

/// Ephemeral backing for both stores: the same contracts over in-process
/// vectors, for demo mode and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| ServiceError::Internal(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| ServiceError::Internal(format!("Lock error: {}", e)))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User> {
        let mut state = self.write()?;

        // Uniqueness is enforced at insert, same as the relational
        // constraint, so a racing pre-check cannot slip a duplicate in.
        if state.users.iter().any(|u| u.email == *email) {
            return Err(ServiceError::DuplicateIdentity(email.to_string()));
        }
        if state.users.iter().any(|u| u.username == *username) {
            return Err(ServiceError::DuplicateIdentity(username.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: username.clone(),
            email: email.clone(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>> {
        let state = self.read()?;
        Ok(state.users.iter().find(|u| u.id == *user_id).cloned())
    }
}

#[async_trait]
impl GameRecordStore for MemoryStore {
    async fn insert(
        &self,
        user_id: &UserId,
        score: i64,
        taps: i32,
        duration: i32,
    ) -> Result<GameId> {
        let mut state = self.write()?;

        let record = GameRecord {
            id: GameId::new(),
            user_id: *user_id,
            score,
            taps,
            duration,
            played_at: Utc::now(),
        };
        let id = record.id;
        state.games.push(record);

        Ok(id)
    }

    async fn top_scores(&self, limit: i64) -> Result<Vec<RankedGame>> {
        let state = self.read()?;

        let mut rows = state
            .games
            .iter()
            .filter_map(|game| {
                state
                    .users
                    .iter()
                    .find(|u| u.id == game.user_id)
                    .map(|user| RankedGame {
                        user_id: game.user_id,
                        username: user.username.to_string(),
                        score: game.score,
                        taps: game.taps,
                        played_at: game.played_at,
                    })
            })
            .collect::<Vec<_>>();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.played_at.cmp(&b.played_at))
        });
        rows.truncate(limit.max(0) as usize);

        Ok(rows)
    }

    async fn recent_for_user(&self, user_id: &UserId, limit: i64) -> Result<Vec<GameRecord>> {
        let state = self.read()?;

        let mut games = state
            .games
            .iter()
            .filter(|g| g.user_id == *user_id)
            .cloned()
            .collect::<Vec<_>>();

        games.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        games.truncate(limit.max(0) as usize);

        Ok(games)
    }

    async fn best_score_for_user(&self, user_id: &UserId) -> Result<i64> {
        let state = self.read()?;
        Ok(state
            .games
            .iter()
            .filter(|g| g.user_id == *user_id)
            .map(|g| g.score)
            .max()
            .unwrap_or(0))
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<i64> {
        let state = self.read()?;
        Ok(state.games.iter().filter(|g| g.user_id == *user_id).count() as i64)
    }

    async fn count_all(&self) -> Result<i64> {
        let state = self.read()?;
        Ok(state.games.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn register(store: &MemoryStore, username: &str, email: &str) -> User {
        store
            .create(
                &Username::new(username).unwrap(),
                &Email::new(email).unwrap(),
                "hash",
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = MemoryStore::new();
        register(&store, "player1", "player@example.com").await;

        let result = store
            .create(
                &Username::new("player2").unwrap(),
                &Email::new("player@example.com").unwrap(),
                "hash",
            )
            .await;

        assert!(matches!(result, Err(ServiceError::DuplicateIdentity(_))));
        assert_eq!(store.read().unwrap().users.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let store = MemoryStore::new();
        register(&store, "player1", "one@example.com").await;

        let result = store
            .create(
                &Username::new("player1").unwrap(),
                &Email::new("two@example.com").unwrap(),
                "hash",
            )
            .await;

        assert!(matches!(result, Err(ServiceError::DuplicateIdentity(_))));
    }

    #[tokio::test]
    async fn test_lookups_return_absence_not_error() {
        let store = MemoryStore::new();

        assert!(store.find_by_email("ghost@example.com").await.unwrap().is_none());
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
        assert!(store.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_top_scores_orders_and_breaks_ties() {
        let store = MemoryStore::new();
        let alice = register(&store, "alice", "alice@example.com").await;
        let bob = register(&store, "bob", "bob@example.com").await;

        store.insert(&alice.id, 100, 50, 30).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.insert(&bob.id, 100, 60, 30).await.unwrap();
        store.insert(&bob.id, 250, 80, 30).await.unwrap();

        let rows = store.top_scores(10).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].score, 250);
        // Equal scores: the earlier play comes first.
        assert_eq!(rows[1].username, "alice");
        assert_eq!(rows[2].username, "bob");
    }

    #[tokio::test]
    async fn test_recent_for_user_newest_first_and_truncated() {
        let store = MemoryStore::new();
        let alice = register(&store, "alice", "alice@example.com").await;

        for score in 0..12 {
            store.insert(&alice.id, score, 10, 30).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        let recent = store.recent_for_user(&alice.id, 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].score, 11);
        assert_eq!(recent[9].score, 2);
    }

    #[tokio::test]
    async fn test_aggregates() {
        let store = MemoryStore::new();
        let alice = register(&store, "alice", "alice@example.com").await;
        let bob = register(&store, "bob", "bob@example.com").await;

        store.insert(&alice.id, 70, 10, 30).await.unwrap();
        store.insert(&alice.id, 90, 10, 30).await.unwrap();
        store.insert(&bob.id, 40, 10, 30).await.unwrap();

        assert_eq!(store.best_score_for_user(&alice.id).await.unwrap(), 90);
        assert_eq!(store.best_score_for_user(&bob.id).await.unwrap(), 40);
        assert_eq!(store.count_for_user(&alice.id).await.unwrap(), 2);
        assert_eq!(store.count_all().await.unwrap(), 3);

        let ghost = UserId::new();
        assert_eq!(store.best_score_for_user(&ghost).await.unwrap(), 0);
        assert_eq!(store.count_for_user(&ghost).await.unwrap(), 0);
    }
}
