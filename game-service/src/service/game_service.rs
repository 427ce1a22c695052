use std::sync::Arc;

use shared::{record_counter, record_timing, GameId, LeaderboardEntry, Result, ServiceError};

use crate::cache::LeaderboardCache;
use crate::domain::{ScoreValidator, DEFAULT_DURATION_SECS};
use crate::repository::GameRecordStore;
use crate::service::AuthService;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;

pub struct GameService {
    auth: Arc<AuthService>,
    games: Arc<dyn GameRecordStore>,
    validator: ScoreValidator,
    leaderboard: Arc<LeaderboardCache>,
}

impl GameService {
    pub fn new(
        auth: Arc<AuthService>,
        games: Arc<dyn GameRecordStore>,
        validator: ScoreValidator,
        leaderboard: Arc<LeaderboardCache>,
    ) -> Self {
        Self {
            auth,
            games,
            validator,
            leaderboard,
        }
    }

    #[tracing::instrument(skip(self, token), fields(score = score, taps = taps))]
    pub async fn submit_score(
        &self,
        token: &str,
        score: i64,
        taps: i32,
        duration: Option<i32>,
    ) -> Result<GameId> {
        let start = std::time::Instant::now();
        record_counter("game_service.submit.requests", 1);

        let user_id = self.auth.authenticate(token)?;
        let duration = duration.unwrap_or(DEFAULT_DURATION_SECS);

        if let Err(e) = self.validator.validate(score, taps, duration) {
            if matches!(e, ServiceError::SuspiciousScore(_)) {
                record_counter("game_service.submit.suspicious", 1);
                tracing::warn!(
                    user_id = %user_id,
                    taps = taps,
                    duration = duration,
                    "Rejected implausible submission"
                );
            }
            return Err(e);
        }

        // The record write must durably succeed before the caches are
        // marked stale; a reader must never see an invalidation for a
        // write that did not happen.
        let game_id = self.games.insert(&user_id, score, taps, duration).await?;
        self.leaderboard.invalidate().await;

        record_counter("game_service.submit.accepted", 1);
        record_timing(
            "game_service.submit.latency",
            start.elapsed().as_secs_f64(),
        );

        tracing::info!(
            user_id = %user_id,
            game_id = %game_id,
            score = score,
            taps = taps,
            duration = duration,
            "Score recorded"
        );

        Ok(game_id)
    }

    pub async fn get_leaderboard(
        &self,
        token: &str,
        limit: Option<i64>,
    ) -> Result<(Vec<LeaderboardEntry>, bool)> {
        self.auth.authenticate(token)?;

        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        if limit <= 0 {
            return Err(ServiceError::InvalidInput(
                "Limit must be positive".to_string(),
            ));
        }

        self.leaderboard.get(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::TokenService;
    use crate::cache::MemoryCache;
    use crate::repository::MemoryStore;

    struct Fixture {
        auth: Arc<AuthService>,
        game: GameService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let tokens = Arc::new(TokenService::new(b"test-secret", 3600));
        let auth = Arc::new(AuthService::new(store.clone(), tokens));
        let leaderboard = Arc::new(LeaderboardCache::new(cache, store.clone()));

        Fixture {
            auth: auth.clone(),
            game: GameService::new(auth, store, ScoreValidator::new(10), leaderboard),
        }
    }

    async fn token_for(fixture: &Fixture, username: &str) -> String {
        let email = format!("{}@example.com", username);
        let (_, token) = fixture
            .auth
            .register(username, &email, "hunter42")
            .await
            .unwrap();
        token
    }

    #[tokio::test]
    async fn test_submit_at_tap_ceiling_accepted() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        assert!(fixture
            .game
            .submit_score(&token, 1000, 300, Some(30))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_submit_above_tap_ceiling_rejected() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        let result = fixture.game.submit_score(&token, 1000, 301, Some(30)).await;
        assert!(matches!(result, Err(ServiceError::SuspiciousScore(_))));
    }

    #[tokio::test]
    async fn test_omitted_duration_defaults_to_thirty_seconds() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        assert!(fixture.game.submit_score(&token, 0, 300, None).await.is_ok());
        let result = fixture.game.submit_score(&token, 0, 301, None).await;
        assert!(matches!(result, Err(ServiceError::SuspiciousScore(_))));
    }

    #[tokio::test]
    async fn test_submit_validates_ranges() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        for (score, taps, duration) in [(-1, 10, 30), (10, -1, 30), (10, 10, 0), (10, 10, 61)] {
            let result = fixture
                .game
                .submit_score(&token, score, taps, Some(duration))
                .await;
            assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_submit_requires_valid_token() {
        let fixture = fixture();

        let result = fixture.game.submit_score("garbage", 10, 10, None).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_rejected_submission_leaves_no_record() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        let _ = fixture.game.submit_score(&token, 1000, 301, Some(30)).await;

        let (entries, _) = fixture.game.get_leaderboard(&token, None).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_submission_visible_after_invalidation() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        // Populate the cache first so the submission has to displace it.
        let (entries, _) = fixture.game.get_leaderboard(&token, None).await.unwrap();
        assert!(entries.is_empty());

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        fixture
            .game
            .submit_score(&token, 420, 200, Some(30))
            .await
            .unwrap();

        let (entries, from_cache) = fixture.game.get_leaderboard(&token, None).await.unwrap();
        assert!(!from_cache);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 420);
        assert_eq!(entries[0].username, "alice");
    }

    #[tokio::test]
    async fn test_leaderboard_limit_validation_and_default() {
        let fixture = fixture();
        let token = token_for(&fixture, "alice").await;

        assert!(fixture.game.get_leaderboard(&token, None).await.is_ok());
        assert!(matches!(
            fixture.game.get_leaderboard(&token, Some(0)).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            fixture.game.get_leaderboard(&token, Some(-5)).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_leaderboard_requires_valid_token() {
        let fixture = fixture();

        let result = fixture.game.get_leaderboard("garbage", None).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }
}
