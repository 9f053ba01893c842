//! Pure aggregation of a rank-ordered trader list into the stored
//! leaderboard summary and its highlights.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{
    models::{
        leaderboards::{LeaderboardHighlights, LeaderboardSummary},
        traders::{Platform, TraderRecord},
    },
    utils::{errors::app_error::AppError, time::format_date},
};

/// Totals are plain floating sums: one unparsable field turns its total into
/// `NaN`.
pub fn summarize(
    entries: &[TraderRecord],
    date: Option<&str>,
    now: DateTime<Utc>,
) -> LeaderboardSummary {
    let mut platform_distribution: IndexMap<Platform, usize> = IndexMap::new();
    let mut total_all_time = 0.0;
    let mut total_weekly = 0.0;
    let mut total_monthly = 0.0;

    for entry in entries {
        *platform_distribution.entry(entry.platform).or_insert(0) += 1;
        total_all_time += entry.all_time();
        total_weekly += entry.weekly();
        total_monthly += entry.monthly();
    }

    LeaderboardSummary {
        date: date.map(str::to_string).unwrap_or_else(|| format_date(now)),
        timestamp: now.timestamp_millis(),
        total_traders: entries.len(),
        top_performers: entries.to_vec(),
        platform_distribution,
        total_all_time_pnl: total_all_time.to_string(),
        total_weekly_pnl: total_weekly.to_string(),
        total_monthly_pnl: total_monthly.to_string(),
    }
}

pub fn highlights(entries: &[TraderRecord]) -> Result<LeaderboardHighlights, AppError> {
    let top_performer = entries
        .first()
        .ok_or_else(|| AppError::BadRequest("leaderboard has no entries".to_string()))?;

    let biggest_weekly_gain = max_by_value(entries, TraderRecord::weekly);
    let biggest_monthly_gain = max_by_value(entries, TraderRecord::monthly);

    let mut platform_leaders: IndexMap<Platform, TraderRecord> = IndexMap::new();
    for entry in entries {
        let replace = match platform_leaders.get(&entry.platform) {
            Some(leader) => entry.all_time() > leader.all_time(),
            None => true,
        };
        if replace {
            platform_leaders.insert(entry.platform, entry.clone());
        }
    }

    let total_value: f64 = entries.iter().map(TraderRecord::all_time).sum();

    Ok(LeaderboardHighlights {
        top_performer: top_performer.clone(),
        biggest_weekly_gain: biggest_weekly_gain.clone(),
        biggest_monthly_gain: biggest_monthly_gain.clone(),
        platform_leaders,
        total_value_tracked: total_value.to_string(),
        entries_count: entries.len(),
    })
}

/// Running maximum that only moves on a strictly greater value, so the
/// earliest of equal maxima wins. Callers guarantee `entries` is non-empty.
fn max_by_value(entries: &[TraderRecord], value: fn(&TraderRecord) -> f64) -> &TraderRecord {
    let mut best = &entries[0];
    for entry in &entries[1..] {
        if value(entry) > value(best) {
            best = entry;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{generated_traders, trader, trader_on};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(50)]
    fn counts_every_trader(#[case] count: u32) {
        let entries = generated_traders(count);
        let summary = summarize(&entries, None, now());

        assert_eq!(summary.total_traders, summary.top_performers.len());
        assert!(summary.is_complete());
        assert_eq!(
            summary.platform_distribution.values().sum::<usize>(),
            summary.total_traders
        );
    }

    #[test]
    fn keeps_input_order_and_sums_totals() {
        let entries = vec![
            trader_on(Platform::Avantis, 1, "a", "100.5", "10", "20"),
            trader_on(Platform::EdgeX, 2, "b", "300", "-5", "40"),
            trader_on(Platform::Avantis, 3, "c", "200", "2.5", "60"),
        ];
        let summary = summarize(&entries, None, now());

        assert_eq!(summary.date, "2025-09-07");
        assert_eq!(summary.timestamp, now().timestamp_millis());
        assert_eq!(summary.top_performers, entries);
        assert_eq!(summary.total_all_time_pnl, "600.5");
        assert_eq!(summary.total_weekly_pnl, "7.5");
        assert_eq!(summary.total_monthly_pnl, "120");

        let distribution: Vec<(Platform, usize)> = summary
            .platform_distribution
            .iter()
            .map(|(p, c)| (*p, *c))
            .collect();
        assert_eq!(distribution, vec![(Platform::Avantis, 2), (Platform::EdgeX, 1)]);
    }

    #[test]
    fn date_override_wins() {
        let summary = summarize(&generated_traders(2), Some("2024-01-31"), now());
        assert_eq!(summary.date, "2024-01-31");
    }

    #[test]
    fn unparsable_pnl_poisons_the_total() {
        let entries = vec![trader(1, "a", "100", "1", "1"), trader(2, "b", "n/a", "1", "1")];
        let summary = summarize(&entries, None, now());
        assert_eq!(summary.total_all_time_pnl, "NaN");
        assert_eq!(summary.total_weekly_pnl, "2");
    }

    #[test]
    fn top_performer_is_positional() {
        let entries = vec![trader(7, "first", "10", "1", "1"), trader(1, "richer", "999", "1", "1")];
        let highlights = highlights(&entries).unwrap();
        assert_eq!(highlights.top_performer.name, "first");
    }

    #[test]
    fn weekly_and_monthly_ties_keep_the_earliest() {
        let entries = vec![
            trader(1, "a", "10", "5", "1"),
            trader(2, "b", "10", "50", "70"),
            trader(3, "c", "10", "50", "70"),
        ];
        let highlights = highlights(&entries).unwrap();
        assert_eq!(highlights.biggest_weekly_gain.name, "b");
        assert_eq!(highlights.biggest_monthly_gain.name, "b");
    }

    #[test]
    fn platform_leaders_use_strictly_greater_all_time() {
        let entries = vec![
            trader_on(Platform::Hyperliquid, 1, "h1", "100", "0", "0"),
            trader_on(Platform::EdgeX, 2, "e1", "80", "0", "0"),
            trader_on(Platform::Hyperliquid, 3, "h2", "100", "0", "0"),
            trader_on(Platform::EdgeX, 4, "e2", "90", "0", "0"),
        ];
        let highlights = highlights(&entries).unwrap();

        assert_eq!(highlights.platform_leaders[&Platform::Hyperliquid].name, "h1");
        assert_eq!(highlights.platform_leaders[&Platform::EdgeX].name, "e2");
        assert!(!highlights.platform_leaders.contains_key(&Platform::Avantis));
        assert_eq!(highlights.total_value_tracked, "370");
        assert_eq!(highlights.entries_count, 4);
    }

    #[test]
    fn empty_leaderboard_is_rejected() {
        let err = highlights(&[]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
