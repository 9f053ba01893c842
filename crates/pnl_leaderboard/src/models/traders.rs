use std::{collections::HashSet, fmt::Display, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::utils::{errors::app_error::AppError, math::parse_decimal, time::date_from_file_name};

/// Venues the leaderboard aggregates. Declaration order is the fixed
/// platform list used for display badges.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Hyperliquid,
    EdgeX,
    Avantis,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Hyperliquid, Platform::EdgeX, Platform::Avantis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Hyperliquid => "Hyperliquid",
            Platform::EdgeX => "EdgeX",
            Platform::Avantis => "Avantis",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One ranked trader as produced by the leaderboard source.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraderRecord {
    pub rank: u32,
    pub name: String,
    /// Wallet address, unique per record.
    pub address: String,
    pub platform: Platform,
    pub all_time_pnl: String,
    pub weekly_pnl: String,
    pub monthly_pnl: String,
}

impl TraderRecord {
    pub fn all_time(&self) -> f64 {
        parse_decimal(&self.all_time_pnl)
    }

    pub fn weekly(&self) -> f64 {
        parse_decimal(&self.weekly_pnl)
    }

    pub fn monthly(&self) -> f64 {
        parse_decimal(&self.monthly_pnl)
    }
}

const SAMPLE_LEADERBOARD: &str = include_str!("../../data/sample_leaderboard.json");

/// The five-trader leaderboard bundled with the crate.
pub fn sample_leaderboard() -> Result<Vec<TraderRecord>, AppError> {
    parse_trader_records(SAMPLE_LEADERBOARD)
}

/// Decodes a JSON array of trader records, validating every entry and
/// reporting all invalid positions at once.
pub fn parse_trader_records(json: &str) -> Result<Vec<TraderRecord>, AppError> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| AppError::BadRequest(format!("JSON parsing failed: {}", e)))?;

    let mut records = Vec::with_capacity(raw.len());
    let mut invalid = 0;
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<TraderRecord>(value) {
            Ok(record) if record.rank >= 1 => records.push(record),
            Ok(record) => {
                warn!("Invalid entry at index {}: rank {} < 1", index, record.rank);
                invalid += 1;
            }
            Err(e) => {
                warn!("Invalid entry at index {}: {}", index, e);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(AppError::BadRequest(format!(
            "Found {} invalid entries in leaderboard data",
            invalid
        )));
    }

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.address.to_lowercase()) {
            warn!("Duplicate trader address {} (rank {})", record.address, record.rank);
        }
    }

    Ok(records)
}

/// Reads a leaderboard file. Returns the records and, when the file is named
/// `YYYY-MM-DD.json`, the date it is for.
pub fn load_trader_file(path: &Path) -> Result<(Vec<TraderRecord>, Option<String>), AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {}", path.display(), e)))?;
    let records = parse_trader_records(&content)?;
    let date = date_from_file_name(path);

    info!(
        "Loaded {} leaderboard entries from {} (date from file name: {:?})",
        records.len(),
        path.display(),
        date
    );

    Ok((records, date))
}
