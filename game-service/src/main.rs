use std::net::SocketAddr;
use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::postgres::PgPoolOptions;

use game_service::api::{self, AppState};
use game_service::auth::TokenService;
use game_service::cache::{CacheStore, LeaderboardCache, MemoryCache, RedisCache};
use game_service::domain::ScoreValidator;
use game_service::repository::{
    CredentialStore, GameRecordStore, GameRepository, MemoryStore, UserRepository,
};
use game_service::service::{AuthService, GameService, StatsService};
use shared::{AuthConfig, DatabaseConfig, GameConfig, RedisConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let server_config = ServerConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;
    let game_config = GameConfig::from_env()?;

    shared::init_tracing("game-service").map_err(anyhow::Error::msg)?;
    shared::init_metrics(server_config.metrics_port).map_err(anyhow::Error::msg)?;

    tracing::info!("Tap Game API starting...");

    let storage_backend =
        std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".to_string());

    let credentials: Arc<dyn CredentialStore>;
    let games: Arc<dyn GameRecordStore>;
    let cache: Arc<dyn CacheStore>;

    match storage_backend.as_str() {
        // Demo mode: the same store contracts over in-process state.
        "memory" => {
            tracing::warn!("Using in-memory storage, all data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            credentials = store.clone();
            games = store;
            cache = Arc::new(MemoryCache::new());
        }
        _ => {
            let database_config = DatabaseConfig::from_env()?;
            let redis_config = RedisConfig::from_env()?;

            tracing::info!("Connecting to PostgreSQL...");
            let db_pool = PgPoolOptions::new()
                .max_connections(database_config.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(5))
                .connect(&database_config.url)
                .await?;
            tracing::info!("Connected to PostgreSQL successfully");

            let run_migrations = std::env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true);

            if run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("../migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            tracing::info!("Connecting to Redis...");
            let redis_client = RedisClient::open(redis_config.url)?;
            let redis_conn = redis_client.get_connection_manager().await?;
            tracing::info!("Connected to Redis successfully");

            credentials = Arc::new(UserRepository::new(db_pool.clone()));
            games = Arc::new(GameRepository::new(db_pool));
            cache = Arc::new(RedisCache::new(redis_conn));
        }
    }

    let tokens = Arc::new(TokenService::new(
        auth_config.jwt_secret.as_bytes(),
        auth_config.token_ttl_secs,
    ));
    let auth_service = Arc::new(AuthService::new(credentials, tokens));
    let leaderboard = Arc::new(LeaderboardCache::new(cache.clone(), games.clone()));
    let game_service = Arc::new(GameService::new(
        auth_service.clone(),
        games.clone(),
        ScoreValidator::new(game_config.max_taps_per_second),
        leaderboard,
    ));
    let stats_service = Arc::new(StatsService::new(auth_service.clone(), games, cache));

    let app = api::router(AppState {
        auth: auth_service,
        game: game_service,
        stats: stats_service,
    });

    let addr: SocketAddr = format!("0.0.0.0:{}", server_config.port).parse()?;
    tracing::info!(addr = %addr, backend = %storage_backend, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    tracing::info!("Server shut down gracefully");

    Ok(())
}
