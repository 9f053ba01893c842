use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    display_rows::DisplayRow,
    leaderboards::{LeaderboardHighlights, LeaderboardMetadata},
    traders::Platform,
};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct LeaderboardResponse {
    /// Creation time of the document the rows come from.
    pub timestamp: String,
    pub data: Vec<DisplayRow>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    /// 1-based position in the ranked list.
    pub position: usize,
    pub platform_badge: Platform,
    #[serde(flatten)]
    pub row: DisplayRow,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct RankedLeaderboardResponse {
    pub timestamp: String,
    pub sort_by: String,
    pub sort_direction: String,
    pub items: Vec<RankedRow>,
    pub total_items: usize,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct OverviewResponse {
    pub date: String,
    pub metadata: LeaderboardMetadata,
    pub total_traders: usize,
    pub total_all_time_pnl: String,
    pub total_weekly_pnl: String,
    pub total_monthly_pnl: String,
    #[schema(value_type = Object)]
    pub platform_distribution: IndexMap<Platform, usize>,
    pub highlights: LeaderboardHighlights,
    /// Whether the trader count matches the stored trader list.
    pub is_complete: bool,
    /// `null` when the document tracks no entries.
    pub average_pnl: Option<f64>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct AvailableDate {
    pub date: String,
    pub entity_key: String,
    pub total_traders: i64,
    pub total_value_cents: i64,
}
