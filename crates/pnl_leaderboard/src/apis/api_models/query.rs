use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams, Default)]
pub struct LeaderboardQuery {
    /// `YYYY-MM-DD`; defaults to the configured sample date.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, Default)]
pub struct RankedLeaderboardQuery {
    pub date: Option<String>,
    /// `name`, `weeklyPnl`, `monthlyPnl` or `allTimePnl`.
    #[param(default = "allTimePnl")]
    pub sort_by: Option<String>,
    #[param(default = "desc")]
    pub sort_direction: Option<String>,
    #[param(default = 1)]
    pub page: Option<usize>,
}
