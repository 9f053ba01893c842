use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    services::ranking::{RankingField, SortDirection},
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

use super::api_models::{
    query::{LeaderboardQuery, RankedLeaderboardQuery},
    response::{AvailableDate, LeaderboardResponse, OverviewResponse, RankedLeaderboardResponse},
};

pub const TAG: &str = "leaderboard";

/// Get the display rows of the largest leaderboard stored for a date
#[utoipa::path(
    get,
    tag = TAG,
    path = "/leaderboard",
    operation_id = "getLeaderboard",
    responses(
        (status = 200, description = "Leaderboard retrieved successfully", body = LeaderboardResponse),
        (status = 400, description = "Invalid date", body = ErrorPayload),
        (status = 404, description = "No leaderboard stored for the date", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(LeaderboardQuery)
)]
pub(super) async fn get_leaderboard(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<(StatusCode, Json<LeaderboardResponse>), AppError> {
    let response = app_state
        .leaderboard_service
        .get_display_rows(params.date.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Get filtered, sorted and paginated leaderboard rows
#[utoipa::path(
    get,
    tag = TAG,
    path = "/leaderboard/ranked",
    operation_id = "getRankedLeaderboard",
    responses(
        (status = 200, description = "Ranked leaderboard retrieved successfully", body = RankedLeaderboardResponse),
        (status = 400, description = "Invalid date", body = ErrorPayload),
        (status = 404, description = "No leaderboard stored for the date", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(RankedLeaderboardQuery)
)]
pub(super) async fn get_ranked_leaderboard(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RankedLeaderboardQuery>,
) -> Result<(StatusCode, Json<RankedLeaderboardResponse>), AppError> {
    let field = RankingField::from_param(params.sort_by.as_deref());
    let direction = SortDirection::from_param(params.sort_direction.as_deref());

    let response = app_state
        .leaderboard_service
        .get_ranked(
            params.date.as_deref(),
            field,
            direction,
            params.page.unwrap_or(1),
        )
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Get totals, highlights and metadata of a stored leaderboard
#[utoipa::path(
    get,
    tag = TAG,
    path = "/leaderboard/overview",
    operation_id = "getLeaderboardOverview",
    responses(
        (status = 200, description = "Overview retrieved successfully", body = OverviewResponse),
        (status = 400, description = "Invalid date", body = ErrorPayload),
        (status = 404, description = "No leaderboard stored for the date", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(LeaderboardQuery)
)]
pub(super) async fn get_leaderboard_overview(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<(StatusCode, Json<OverviewResponse>), AppError> {
    let response = app_state
        .leaderboard_service
        .get_overview(params.date.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

/// List dates with stored leaderboards, newest first
#[utoipa::path(
    get,
    tag = TAG,
    path = "/leaderboard/dates",
    operation_id = "getLeaderboardDates",
    responses(
        (status = 200, description = "Dates retrieved successfully", body = Vec<AvailableDate>),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    )
)]
pub(super) async fn get_leaderboard_dates(
    State(app_state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Vec<AvailableDate>>), AppError> {
    let dates = app_state.leaderboard_service.available_dates().await?;
    Ok((StatusCode::OK, Json(dates)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::response::IntoResponse;

    use super::*;
    use crate::{
        models::traders::sample_leaderboard,
        repositories::memory_store::InMemoryEntityStore,
        services::leaderboard_service::LeaderboardService,
        utils::wallet::OwnerIdentity,
    };

    async fn app_state() -> Arc<AppState> {
        let service = LeaderboardService::new(
            Arc::new(InMemoryEntityStore::new(Duration::from_secs(5))),
            OwnerIdentity {
                address: "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23".to_string(),
            },
            "2025-09-07".to_string(),
            false,
        );
        service
            .publish(&sample_leaderboard().unwrap(), Some("2025-09-07"))
            .await
            .unwrap();

        Arc::new(AppState {
            leaderboard_service: Arc::new(service),
        })
    }

    #[tokio::test]
    async fn serves_default_date() {
        let (status, Json(body)) =
            get_leaderboard(State(app_state().await), Query(LeaderboardQuery::default()))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.len(), 5);
        assert_eq!(body.data[0].prize, 1);
    }

    #[tokio::test]
    async fn unknown_date_is_404() {
        let err = get_leaderboard(
            State(app_state().await),
            Query(LeaderboardQuery {
                date: Some("2024-01-01".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ranked_defaults_to_all_time_desc() {
        let (_, Json(body)) = get_ranked_leaderboard(
            State(app_state().await),
            Query(RankedLeaderboardQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(body.sort_by, "allTimePnl");
        assert_eq!(body.sort_direction, "desc");
        assert_eq!(body.current_page, 1);
        assert_eq!(body.items[0].position, 1);
        assert_eq!(body.items_per_page, 10);
    }

    #[tokio::test]
    async fn overview_and_dates() {
        let state = app_state().await;
        let (_, Json(overview)) =
            get_leaderboard_overview(State(state.clone()), Query(LeaderboardQuery::default()))
                .await
                .unwrap();
        assert_eq!(overview.total_traders, 5);
        assert!(overview.is_complete);

        let (_, Json(dates)) = get_leaderboard_dates(State(state)).await.unwrap();
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].date, "2025-09-07");
        assert_eq!(dates[0].total_traders, 5);
    }
}
