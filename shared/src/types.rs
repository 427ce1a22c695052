use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid user ID: {}", e)))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(GameId)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid game ID: {}", e)))
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    pub fn new(username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        Self::validate(&username)?;
        Ok(Self(username))
    }

    fn validate(username: &str) -> Result<()> {
        if username.len() < Self::MIN_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "Username must be at least {} characters",
                Self::MIN_LENGTH
            )));
        }

        if username.len() > Self::MAX_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "Username must be at most {} characters",
                Self::MAX_LENGTH
            )));
        }

        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ServiceError::InvalidInput(
                "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
            ));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    // Stored lowercase so the uniqueness constraint is case-insensitive.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into().trim().to_lowercase();
        Self::validate(&email)?;
        Ok(Self(email))
    }

    fn validate(email: &str) -> Result<()> {
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            }
            None => false,
        };

        if !valid {
            return Err(ServiceError::InvalidInput(format!(
                "Invalid email address: {}",
                email
            )));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub user_id: UserId,
    pub score: i64,
    pub taps: i32,
    pub duration: i32,
    pub played_at: DateTime<Utc>,
}

/// One row of the ranking query: a game record joined to its player's
/// username, before rank assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGame {
    pub user_id: UserId,
    pub username: String,
    pub score: i64,
    pub taps: i32,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: UserId,
    pub username: String,
    pub score: i64,
    pub taps: i32,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_games: i64,
    pub best_score: i64,
    pub recent_games: Vec<GameRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_games: i64,
}
