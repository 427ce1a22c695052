pub mod api;
pub mod auth;
pub mod cache;
pub mod domain;
pub mod repository;
pub mod service;

pub use api::{router, AppState};
pub use auth::TokenService;
pub use cache::LeaderboardCache;
pub use domain::ScoreValidator;
pub use service::{AuthService, GameService, StatsService};
