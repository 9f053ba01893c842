use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::errors::app_error::AppError;

use super::HyperliquidService;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserFillsRequest {
    pub r#type: &'static str,
    pub user: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillSide {
    /// Buy
    #[serde(rename = "B")]
    Bid,
    /// Sell
    #[serde(rename = "A")]
    Ask,
}

fn default_fee_token() -> String {
    "USDC".to_string()
}

/// One executed trade from `userFills`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserFill {
    pub hash: String,
    pub tid: u64,
    pub oid: Option<u64>,
    pub coin: String,
    pub side: FillSide,
    pub sz: Decimal,
    pub px: Decimal,
    /// Unix millis.
    pub time: i64,
    /// e.g. `Open Long`, `Close Short`, `Settlement`.
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub closed_pnl: Decimal,
    pub fee: Option<Decimal>,
    #[serde(default = "default_fee_token")]
    pub fee_token: String,
    #[serde(default)]
    pub start_position: Decimal,
    #[serde(default)]
    pub crossed: bool,
    pub builder_fee: Option<Decimal>,
    /// Not sent by the API; set to the address the fills were requested for.
    #[serde(default)]
    pub user: Option<String>,
}

impl UserFill {
    pub fn notional(&self) -> Decimal {
        self.sz * self.px
    }

    pub fn direction_label(&self) -> &'static str {
        let is_buy = self.side == FillSide::Bid;
        let is_opening = self.dir.to_lowercase().contains("open");

        match (is_opening, is_buy) {
            (true, true) => "Open Long",
            (true, false) => "Open Short",
            (false, true) => "Close Short",
            (false, false) => "Close Long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDirection {
    Long,
    Short,
    Open,
    Close,
}

impl FillDirection {
    fn keyword(&self) -> &'static str {
        match self {
            FillDirection::Long => "long",
            FillDirection::Short => "short",
            FillDirection::Open => "open",
            FillDirection::Close => "close",
        }
    }
}

impl FromStr for FillDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "long" => Ok(FillDirection::Long),
            "short" => Ok(FillDirection::Short),
            "open" => Ok(FillDirection::Open),
            "close" => Ok(FillDirection::Close),
            other => Err(AppError::BadRequest(format!(
                "unknown fill direction {}, expected long, short, open or close",
                other
            ))),
        }
    }
}

/// Keeps fills whose `dir` mentions the direction keyword.
pub fn filter_by_direction(fills: Vec<UserFill>, direction: FillDirection) -> Vec<UserFill> {
    fills
        .into_iter()
        .filter(|fill| fill.dir.to_lowercase().contains(direction.keyword()))
        .collect()
}

/// Newest first, at most `limit` fills.
pub fn newest_first(mut fills: Vec<UserFill>, limit: usize) -> Vec<UserFill> {
    fills.sort_by(|a, b| b.time.cmp(&a.time));
    fills.truncate(limit);
    fills
}

pub fn within_time_range(fills: Vec<UserFill>, start_time: i64, end_time: i64) -> Vec<UserFill> {
    fills
        .into_iter()
        .filter(|fill| fill.time >= start_time && fill.time <= end_time)
        .collect()
}

impl HyperliquidService {
    pub async fn get_user_fills(&self, user: &str) -> Result<Vec<UserFill>, AppError> {
        let request = UserFillsRequest {
            r#type: "userFills",
            user: user.to_string(),
        };
        let mut fills: Vec<UserFill> = self.post_info(&request).await?;
        for fill in &mut fills {
            fill.user = Some(user.to_string());
        }
        info!("Retrieved {} fills for user {}", fills.len(), user);
        Ok(fills)
    }

    pub async fn get_recent_fills(&self, user: &str, limit: usize) -> Result<Vec<UserFill>, AppError> {
        Ok(newest_first(self.get_user_fills(user).await?, limit))
    }

    pub async fn get_fills_by_time_range(
        &self,
        user: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<UserFill>, AppError> {
        Ok(within_time_range(
            self.get_user_fills(user).await?,
            start_time,
            end_time,
        ))
    }

    pub async fn get_fills_by_coin(&self, user: &str, coin: &str) -> Result<Vec<UserFill>, AppError> {
        let fills = self.get_user_fills(user).await?;
        Ok(fills.into_iter().filter(|fill| fill.coin == coin).collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    const FILLS: &str = r#"[
        {"coin":"BTC","px":"60000.5","sz":"0.1","side":"B","time":1725700000000,
         "startPosition":"0","dir":"Open Long","closedPnl":"0","hash":"0xaa",
         "oid":1,"crossed":true,"fee":"2.1","tid":11,"feeToken":"USDC"},
        {"coin":"ETH","px":"2500","sz":"2","side":"A","time":1725700500000,
         "dir":"Close Long","closedPnl":"125.5","hash":"0xbb","tid":12},
        {"coin":"BTC","px":"61000","sz":"0.05","side":"A","time":1725700100000,
         "dir":"Open Short","hash":"0xcc","tid":13}
    ]"#;

    fn fills() -> Vec<UserFill> {
        serde_json::from_str(FILLS).unwrap()
    }

    #[test]
    fn decodes_fills_with_defaults() {
        let fills = fills();
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].side, FillSide::Bid);
        assert_eq!(fills[0].oid, Some(1));
        assert_eq!(fills[1].closed_pnl, Decimal::from_f64(125.5).unwrap());
        assert_eq!(fills[2].closed_pnl, Decimal::ZERO);
        assert_eq!(fills[2].fee_token, "USDC");
        assert!(!fills[2].crossed);
        assert_eq!(fills[0].user, None);
    }

    #[test]
    fn notional_is_size_times_price() {
        let fills = fills();
        assert_eq!(fills[1].notional(), Decimal::from(5000));
    }

    #[rstest]
    #[case(0, "Open Long")]
    #[case(1, "Close Long")]
    #[case(2, "Open Short")]
    fn labels_directions(#[case] index: usize, #[case] label: &str) {
        assert_eq!(fills()[index].direction_label(), label);
    }

    #[test]
    fn filters_by_direction_keyword() {
        let longs = filter_by_direction(fills(), FillDirection::Long);
        assert_eq!(longs.len(), 2);
        let opens = filter_by_direction(fills(), "OPEN".parse().unwrap());
        assert_eq!(opens.len(), 2);
        assert!("sideways".parse::<FillDirection>().is_err());
    }

    #[test]
    fn orders_newest_first_and_limits() {
        let recent = newest_first(fills(), 2);
        let hashes: Vec<&str> = recent.iter().map(|f| f.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0xbb", "0xcc"]);
    }

    #[test]
    fn time_range_is_inclusive() {
        let ranged = within_time_range(fills(), 1725700000000, 1725700100000);
        assert_eq!(ranged.len(), 2);
    }

    #[test]
    fn serializes_request_body() {
        let request = UserFillsRequest {
            r#type: "userFills",
            user: "0xabc".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"type": "userFills", "user": "0xabc"}));
    }
}
