use chrono::{DateTime, SecondsFormat};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{
    external_services::hyperliquid::user_fills::{FillSide, UserFill},
    utils::{errors::app_error::AppError, time::DATE_FORMAT},
};

pub const ENTITY_TYPE: &str = "COMPLETE_HYPERLIQUID_TRADE";
pub const ENTITY_VERSION: &str = "1.0";
pub const INTEGRATION: &str = "ETH_Warsaw_2025_Official_SDK";
pub const SOURCE: &str = "Hyperliquid_API_v1";
pub const INTEGRATION_VERSION: &str = "official_golem_sdk_v1";
pub const STORED_VIA: &str = "createEntities";
/// Trade fields copied into `hyperliquid_trade`.
pub const FIELDS_PRESERVED: u32 = 15;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// The fill as stored, with every field the API returned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub trade_id: String,
    pub order_id: String,
    pub transaction_hash: String,
    pub coin: String,
    pub side: FillSide,
    pub size: Decimal,
    pub price: Decimal,
    /// Unix millis.
    pub execution_time: i64,
    pub direction: String,
    pub closed_pnl: Decimal,
    pub fee_amount: Decimal,
    pub fee_token: String,
    pub start_position: Decimal,
    pub cross_margin: bool,
    pub user_address: String,
    pub raw_api_response: UserFill,
}

/// Derived values kept next to the trade so readers need no arithmetic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeComputed {
    pub total_value_usd: Decimal,
    /// e.g. `BUY 0.1 BTC @ $60000.5`
    pub human_description: String,
    /// e.g. `$6000.05`
    pub formatted_value: String,
    pub is_buy_order: bool,
    pub is_profitable: bool,
    /// `YYYY-MM-DD` in UTC.
    pub trade_date: String,
    pub trade_timestamp_iso: String,
    /// Fee as a percentage of the notional, four decimals. `NaN` for a zero
    /// notional.
    pub fee_percentage: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeMetadata {
    pub source: String,
    pub integration_version: String,
    pub data_complete: bool,
    pub fields_preserved: u32,
    pub stored_via: String,
}

/// The document persisted for each stored Hyperliquid fill.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompleteTradeEntity {
    pub entity_type: String,
    pub version: String,
    pub created_at: String,
    pub stored_by: String,
    pub integration: String,
    pub hyperliquid_trade: TradeRecord,
    pub computed: TradeComputed,
    pub metadata: TradeMetadata,
}

impl CompleteTradeEntity {
    pub fn from_fill(fill: &UserFill, stored_by: &str, created_at: String) -> Result<Self, AppError> {
        let executed_at = DateTime::from_timestamp_millis(fill.time).ok_or_else(|| {
            AppError::BadRequest(format!("fill {} has an out of range time {}", fill.tid, fill.time))
        })?;
        let fee = fill.fee.unwrap_or_default();
        let total_value = fill.notional();
        let is_buy = fill.side == FillSide::Bid;

        let computed = TradeComputed {
            total_value_usd: total_value,
            human_description: format!(
                "{} {} {} @ ${}",
                if is_buy { "BUY" } else { "SELL" },
                fill.sz,
                fill.coin,
                fill.px
            ),
            formatted_value: format!("${:.2}", round_half_up(total_value, 2)),
            is_buy_order: is_buy,
            is_profitable: fill.closed_pnl > Decimal::ZERO,
            trade_date: executed_at.format(DATE_FORMAT).to_string(),
            trade_timestamp_iso: executed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            fee_percentage: fee_percentage(fee, total_value),
        };

        let hyperliquid_trade = TradeRecord {
            trade_id: fill.tid.to_string(),
            order_id: fill.oid.unwrap_or_default().to_string(),
            transaction_hash: fill.hash.clone(),
            coin: fill.coin.clone(),
            side: fill.side,
            size: fill.sz,
            price: fill.px,
            execution_time: fill.time,
            direction: fill.dir.clone(),
            closed_pnl: fill.closed_pnl,
            fee_amount: fee,
            fee_token: fill.fee_token.clone(),
            start_position: fill.start_position,
            cross_margin: fill.crossed,
            user_address: fill
                .user
                .clone()
                .unwrap_or_else(|| ZERO_ADDRESS.to_string()),
            raw_api_response: fill.clone(),
        };

        Ok(CompleteTradeEntity {
            entity_type: ENTITY_TYPE.to_string(),
            version: ENTITY_VERSION.to_string(),
            created_at,
            stored_by: stored_by.to_string(),
            integration: INTEGRATION.to_string(),
            hyperliquid_trade,
            computed,
            metadata: TradeMetadata {
                source: SOURCE.to_string(),
                integration_version: INTEGRATION_VERSION.to_string(),
                data_complete: true,
                fields_preserved: FIELDS_PRESERVED,
                stored_via: STORED_VIA.to_string(),
            },
        })
    }
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn fee_percentage(fee: Decimal, total_value: Decimal) -> String {
    fee.checked_div(total_value)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| format!("{:.4}", round_half_up(pct, 4)))
        .unwrap_or_else(|| "NaN".to_string())
}

/// Numeric form of an id string built from its last ten digits, so it fits an
/// annotation whatever the id's length.
pub fn id_tail(id: &str) -> i64 {
    id.get(id.len().saturating_sub(10)..)
        .and_then(|tail| tail.parse::<i64>().ok())
        .unwrap_or_default()
}
