use std::cmp::Ordering;

use crate::{models::display_rows::DisplayRow, models::traders::Platform, utils::time::TimeWindow};

pub const PAGE_SIZE: usize = 10;
pub const MAX_RANKED_ROWS: usize = 50;
/// Rows at or below this rounded absolute all-time PnL are hidden.
pub const MIN_ABS_ALL_TIME_PNL: f64 = 1_000.0;

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingField {
    Name,
    WeeklyPnl,
    MonthlyPnl,
    #[default]
    AllTimePnl,
}

impl RankingField {
    /// Unknown or missing fields rank by all-time PnL.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("name") => RankingField::Name,
            Some("weeklyPnl") => RankingField::WeeklyPnl,
            Some("monthlyPnl") => RankingField::MonthlyPnl,
            _ => RankingField::AllTimePnl,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingField::Name => "name",
            RankingField::WeeklyPnl => "weeklyPnl",
            RankingField::MonthlyPnl => "monthlyPnl",
            RankingField::AllTimePnl => "allTimePnl",
        }
    }

    fn window(&self) -> TimeWindow {
        match self {
            RankingField::WeeklyPnl => TimeWindow::Week,
            RankingField::MonthlyPnl => TimeWindow::Month,
            _ => TimeWindow::AllTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Hides traders whose all-time PnL rounds to $1000 or less in magnitude.
pub fn is_significant(row: &DisplayRow) -> bool {
    row.window_pnl(TimeWindow::AllTime).abs().round() > MIN_ABS_ALL_TIME_PNL
}

/// Filters, sorts and caps rows to the ranked top [`MAX_RANKED_ROWS`].
/// The sort is stable, so equal rows keep their input order.
pub fn rank_rows(rows: Vec<DisplayRow>, field: RankingField, direction: SortDirection) -> Vec<DisplayRow> {
    let mut ranked: Vec<DisplayRow> = rows.into_iter().filter(is_significant).collect();

    ranked.sort_by(|a, b| {
        let ordering = match field {
            RankingField::Name => compare_names(display_name(a), display_name(b)),
            _ => {
                let window = field.window();
                a.window_pnl(window)
                    .partial_cmp(&b.window_pnl(window))
                    .unwrap_or(Ordering::Equal)
            }
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    ranked.truncate(MAX_RANKED_ROWS);
    ranked
}

fn display_name(row: &DisplayRow) -> &str {
    if row.display_name.is_empty() {
        ANONYMOUS
    } else {
        &row.display_name
    }
}

/// Case-insensitive first, then by exact text so the order is total.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, after clamping.
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slices one page of [`PAGE_SIZE`] rows. Out-of-range pages clamp to the
/// first or last page.
pub fn paginate<T: Clone>(rows: &[T], page: usize) -> Page<T> {
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE);
    let current_page = page.clamp(1, total_pages.max(1));

    let start = ((current_page - 1) * PAGE_SIZE).min(total_items);
    let end = (start + PAGE_SIZE).min(total_items);

    Page {
        items: rows[start..end].to_vec(),
        current_page,
        total_pages,
        total_items,
    }
}

/// Cosmetic platform badge derived from the wallet address. This is a
/// display hash, not the trader's real venue.
pub fn platform_badge(address: &str) -> Platform {
    let mut hash: i32 = 0;
    for unit in address.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    let index = (hash as i64).unsigned_abs() % Platform::ALL.len() as u64;
    Platform::ALL[index as usize]
}
