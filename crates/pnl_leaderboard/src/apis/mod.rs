use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::AppState;

pub mod api_models;
pub mod leaderboard_handlers;

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "leaderboard", description = "Daily PnL leaderboard API")
    )
)]
pub struct ApiDoc;

pub fn setup_routes() -> Router<Arc<AppState>> {
    let api_doc = ApiDoc::openapi();

    let leaderboard_router = OpenApiRouter::with_openapi(api_doc)
        .routes(routes!(leaderboard_handlers::get_leaderboard))
        .routes(routes!(leaderboard_handlers::get_ranked_leaderboard))
        .routes(routes!(leaderboard_handlers::get_leaderboard_overview))
        .routes(routes!(leaderboard_handlers::get_leaderboard_dates));

    let (api_router, api_openapi) = OpenApiRouter::new()
        .nest("/api/v1", leaderboard_router)
        .split_for_parts();

    Router::new()
        .merge(Scalar::with_url("/docs", api_openapi))
        .merge(api_router)
}
