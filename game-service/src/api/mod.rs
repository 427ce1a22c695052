pub mod dto;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::{AuthService, GameService, StatsService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub game: Arc<GameService>,
    pub stats: Arc<StatsService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/game/score", post(handlers::submit_score))
        .route("/api/game/leaderboard", get(handlers::get_leaderboard))
        .route("/api/game/stats", get(handlers::get_user_stats))
        .route("/api/game/global-stats", get(handlers::get_global_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
