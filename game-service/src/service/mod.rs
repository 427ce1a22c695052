pub mod auth_service;
pub mod game_service;
pub mod stats_service;

pub use auth_service::AuthService;
pub use game_service::GameService;
pub use stats_service::StatsService;
