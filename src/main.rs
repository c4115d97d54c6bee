//! Tally Board-Game Score Tracker Backend
//!
//! A REST backend with SQLite persistence: groups record game sessions,
//! running totals accumulate per player and team, and leaderboards, group
//! statistics, and exports are derived from that state on every read.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod scoring;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tally Score Tracker Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Groups
        .route("/groups", post(api::create_group))
        .route("/groups/join", post(api::join_group))
        .route("/groups/{id}", get(api::get_group))
        .route("/groups/{id}", put(api::rename_group))
        // Players
        .route("/players", post(api::create_player))
        .route("/players/{id}", delete(api::delete_player))
        .route("/groups/{id}/players", get(api::list_group_players))
        // Teams
        .route("/teams", post(api::create_team))
        .route("/teams/{id}", delete(api::delete_team))
        .route("/groups/{id}/teams", get(api::list_group_teams))
        // Game sessions
        .route("/game-sessions", post(api::create_session))
        .route("/game-sessions/{id}", delete(api::delete_session))
        .route("/groups/{id}/game-sessions", get(api::list_group_sessions))
        // Leaderboards and stats
        .route("/groups/{id}/leaderboard/players", get(api::player_leaderboard))
        .route(
            "/groups/{id}/leaderboard/players/normalized",
            get(api::player_leaderboard_normalized),
        )
        .route("/groups/{id}/leaderboard/teams", get(api::team_leaderboard))
        .route(
            "/groups/{id}/leaderboard/teams/normalized",
            get(api::team_leaderboard_normalized),
        )
        .route("/groups/{id}/stats", get(api::group_stats))
        // Export/import
        .route("/groups/{id}/export", get(api::export_group))
        .route("/groups/{id}/export/csv", get(api::export_group_csv))
        .route("/groups/{id}/import", post(api::import_group));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
