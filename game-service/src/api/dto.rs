use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{LeaderboardEntry, User, UserStats};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

#[derive(Deserialize)]
pub struct SubmitScoreRequest {
    pub score: i64,
    pub taps: i32,
    pub duration: Option<i32>,
}

#[derive(Serialize)]
pub struct SubmitScoreResponse {
    pub game_id: String,
    pub score: i64,
    pub taps: i32,
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub cached: bool,
}

#[derive(Serialize)]
pub struct UserStatsResponse {
    pub stats: UserStats,
    pub cached: bool,
}

#[derive(Serialize)]
pub struct GlobalStatsResponse {
    pub total_games: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}
