use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::traders::TraderRecord,
    utils::{
        math::{calculate_roi, estimate_initial_investment, parse_decimal},
        time::TimeWindow,
    },
};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct WindowPerformance {
    pub pnl: String,
    pub roi: String,
    /// Volume is not tracked by the source, always `"0"`.
    pub vlm: String,
}

impl WindowPerformance {
    pub fn zero() -> Self {
        WindowPerformance {
            pnl: "0".to_string(),
            roi: "0".to_string(),
            vlm: "0".to_string(),
        }
    }

    fn new(pnl: &str, roi: f64) -> Self {
        WindowPerformance {
            pnl: pnl.to_string(),
            roi: roi.to_string(),
            vlm: "0".to_string(),
        }
    }
}

/// One leaderboard line as the front end renders it.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub eth_address: String,
    pub account_value: String,
    /// `[window, performance]` pairs ordered day, week, month, allTime.
    #[schema(value_type = Vec<Object>)]
    pub window_performances: Vec<(TimeWindow, WindowPerformance)>,
    pub prize: u32,
    pub display_name: String,
}

impl DisplayRow {
    pub fn performance(&self, window: TimeWindow) -> Option<&WindowPerformance> {
        self.window_performances
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, perf)| perf)
    }

    /// PnL for a window; a missing window counts as zero.
    pub fn window_pnl(&self, window: TimeWindow) -> f64 {
        self.performance(window)
            .map(|perf| parse_decimal(&perf.pnl))
            .unwrap_or(0.0)
    }
}

impl From<&TraderRecord> for DisplayRow {
    fn from(record: &TraderRecord) -> Self {
        let all_time = record.all_time();
        let investment = estimate_initial_investment(all_time);

        let week = WindowPerformance::new(
            &record.weekly_pnl,
            calculate_roi(record.weekly(), investment),
        );
        let month = WindowPerformance::new(
            &record.monthly_pnl,
            calculate_roi(record.monthly(), investment),
        );
        let all = WindowPerformance::new(&record.all_time_pnl, calculate_roi(all_time, investment));

        DisplayRow {
            eth_address: record.address.clone(),
            account_value: record.all_time_pnl.clone(),
            window_performances: vec![
                (TimeWindow::Day, WindowPerformance::zero()),
                (TimeWindow::Week, week),
                (TimeWindow::Month, month),
                (TimeWindow::AllTime, all),
            ],
            prize: record.rank,
            display_name: record.name.clone(),
        }
    }
}
