use std::{fmt::Display, path::Path, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Performance windows shown for every trader, in display order.
#[derive(Deserialize, Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    AllTime,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Day,
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::AllTime,
    ];
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Day => write!(f, "day"),
            TimeWindow::Week => write!(f, "week"),
            TimeWindow::Month => write!(f, "month"),
            TimeWindow::AllTime => write!(f, "allTime"),
        }
    }
}

pub fn format_date(now: DateTime<Utc>) -> String {
    now.format(DATE_FORMAT).to_string()
}

pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

/// Returns the file stem when a leaderboard file is named after its date,
/// e.g. `2025-09-07.json`.
pub fn date_from_file_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| is_iso_date(stem))
        .map(str::to_string)
}

/// Wall-clock lifetime of an entity living for `btl` blocks.
pub fn btl_to_duration(btl: u64, block_time: Duration) -> Duration {
    block_time.saturating_mul(btl.min(u32::MAX as u64) as u32)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn windows_serialize_in_camel_case() {
        let json = serde_json::to_string(&TimeWindow::ALL).unwrap();
        assert_eq!(json, r#"["day","week","month","allTime"]"#);
        assert_eq!(TimeWindow::AllTime.to_string(), "allTime");
    }

    #[test]
    fn extracts_date_from_file_name() {
        let dated = PathBuf::from("/tmp/data/2025-09-07.json");
        let undated = PathBuf::from("/tmp/data/leaderboard.json");
        let bogus = PathBuf::from("2025-13-40.json");

        assert_eq!(date_from_file_name(&dated).as_deref(), Some("2025-09-07"));
        assert_eq!(date_from_file_name(&undated), None);
        assert_eq!(date_from_file_name(&bogus), None);
    }

    #[test]
    fn formats_utc_date() {
        let now = Utc.with_ymd_and_hms(2025, 9, 7, 23, 59, 59).unwrap();
        assert_eq!(format_date(now), "2025-09-07");
    }

    #[test]
    fn btl_duration_scales_with_block_time() {
        let lifetime = btl_to_duration(50_000, Duration::from_secs(5));
        assert_eq!(lifetime, Duration::from_secs(250_000));
    }
}
