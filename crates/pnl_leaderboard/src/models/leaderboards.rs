use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::traders::{Platform, TraderRecord},
    utils::{errors::app_error::AppError, math::parse_decimal},
};

pub const ENTITY_TYPE: &str = "DAILY_PNL_LEADERBOARD";
pub const ENTITY_VERSION: &str = "1.0";
pub const INTEGRATION: &str = "ETH_Warsaw_2025_Leaderboard";
pub const DATA_SOURCE: &str = "multi_platform_aggregated";

/// Aggregate view of one day's leaderboard.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSummary {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
    pub total_traders: usize,
    pub top_performers: Vec<TraderRecord>,
    #[schema(value_type = Object)]
    pub platform_distribution: IndexMap<Platform, usize>,
    pub total_all_time_pnl: String,
    pub total_weekly_pnl: String,
    pub total_monthly_pnl: String,
}

impl LeaderboardSummary {
    /// Complete data carries every trader it counts.
    pub fn is_complete(&self) -> bool {
        self.total_traders == self.top_performers.len()
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LeaderboardHighlights {
    /// First record of the input, not necessarily the best one.
    pub top_performer: TraderRecord,
    pub biggest_weekly_gain: TraderRecord,
    pub biggest_monthly_gain: TraderRecord,
    #[schema(value_type = Object)]
    pub platform_leaders: IndexMap<Platform, TraderRecord>,
    pub total_value_tracked: String,
    pub entries_count: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LeaderboardMetadata {
    pub entity_type: String,
    pub version: String,
    pub created_at: String,
    pub stored_by: String,
    pub integration: String,
    pub data_source: String,
}

impl LeaderboardMetadata {
    pub fn new(stored_by: &str, created_at: String) -> Self {
        LeaderboardMetadata {
            entity_type: ENTITY_TYPE.to_string(),
            version: ENTITY_VERSION.to_string(),
            created_at,
            stored_by: stored_by.to_string(),
            integration: INTEGRATION.to_string(),
            data_source: DATA_SOURCE.to_string(),
        }
    }
}

/// The document persisted for each published leaderboard.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CompleteLeaderboardEntity {
    pub metadata: LeaderboardMetadata,
    pub leaderboard: LeaderboardSummary,
    pub summary: LeaderboardHighlights,
}

impl CompleteLeaderboardEntity {
    /// Decodes a stored payload. With `require_complete`, documents whose
    /// trader count disagrees with their trader list are rejected too.
    pub fn decode(key: &str, data: &[u8], require_complete: bool) -> Result<Self, AppError> {
        let entity: CompleteLeaderboardEntity =
            serde_json::from_slice(data).map_err(|e| AppError::MalformedDocument {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if require_complete && !entity.leaderboard.is_complete() {
            return Err(AppError::MalformedDocument {
                key: key.to_string(),
                reason: format!(
                    "claims {} traders but stores {}",
                    entity.leaderboard.total_traders,
                    entity.leaderboard.top_performers.len()
                ),
            });
        }

        Ok(entity)
    }

    pub fn total_value_tracked(&self) -> f64 {
        parse_decimal(&self.summary.total_value_tracked)
    }

    pub fn average_pnl(&self) -> f64 {
        self.total_value_tracked() / self.summary.entries_count as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        services::aggregator::{highlights, summarize},
        test_utils::generated_traders,
    };

    fn entity(count: u32) -> CompleteLeaderboardEntity {
        let entries = generated_traders(count);
        let now = Utc.with_ymd_and_hms(2025, 9, 7, 8, 30, 0).unwrap();
        CompleteLeaderboardEntity {
            metadata: LeaderboardMetadata::new("0xabc", "2025-09-07T08:30:00.000Z".to_string()),
            leaderboard: summarize(&entries, None, now),
            summary: highlights(&entries).unwrap(),
        }
    }

    #[test]
    fn decodes_stored_documents() {
        let original = entity(4);
        let data = serde_json::to_vec_pretty(&original).unwrap();
        let decoded = CompleteLeaderboardEntity::decode("0x1", &data, true).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.metadata.entity_type, ENTITY_TYPE);
        assert_eq!(decoded.leaderboard.date, "2025-09-07");
    }

    #[test]
    fn uses_mixed_field_casing() {
        let json = serde_json::to_value(entity(2)).unwrap();
        assert!(json["leaderboard"]["totalTraders"].is_u64());
        assert!(json["leaderboard"]["platformDistribution"]["Hyperliquid"].is_u64());
        assert!(json["summary"]["total_value_tracked"].is_string());
        assert!(json["metadata"]["created_at"].is_string());
    }

    #[test]
    fn malformed_payloads_name_their_key() {
        let err = CompleteLeaderboardEntity::decode("0xbad", br#"{"metadata":{}}"#, false).unwrap_err();
        match err {
            AppError::MalformedDocument { key, .. } => assert_eq!(key, "0xbad"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn partial_documents_fail_only_when_required() {
        let mut partial = entity(3);
        partial.leaderboard.total_traders = 30;
        let data = serde_json::to_vec(&partial).unwrap();

        assert!(CompleteLeaderboardEntity::decode("0x2", &data, false).is_ok());
        assert!(matches!(
            CompleteLeaderboardEntity::decode("0x2", &data, true),
            Err(AppError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn averages_tracked_value() {
        let entity = entity(2);
        // 9_990_000 + 9_980_000
        assert_eq!(entity.total_value_tracked(), 19_970_000.0);
        assert_eq!(entity.average_pnl(), 9_985_000.0);
    }
}
