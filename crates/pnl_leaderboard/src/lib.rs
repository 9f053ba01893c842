use std::sync::Arc;

use apis::setup_routes;
use axum::Router;
use services::leaderboard_service::LeaderboardService;
use tower_http::cors::CorsLayer;

pub mod apis;
pub mod container;
pub mod external_services;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub struct AppState {
    pub leaderboard_service: Arc<LeaderboardService>,
}

pub fn setup_router(leaderboard_service: Arc<LeaderboardService>) -> Router {
    setup_routes()
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(AppState {
            leaderboard_service,
        }))
}

pub fn init_tracing(settings: &settings::Settings) {
    let env = settings.environment.clone().unwrap_or("DEV".to_string());
    let level = match env.as_str() {
        "PROD" => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(env != "PROD")
        .init();
}
