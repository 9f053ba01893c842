pub struct AnnotationKeys;

impl AnnotationKeys {
    // String annotations
    pub const TYPE: &'static str = "type";
    pub const DATE: &'static str = "date";
    pub const STORED_BY: &'static str = "stored_by";
    pub const TOP_PERFORMER: &'static str = "top_performer";
    pub const TOP_PERFORMER_PLATFORM: &'static str = "top_performer_platform";
    pub const TOP_PERFORMER_ADDRESS: &'static str = "top_performer_address";
    pub const BIGGEST_WEEKLY_TRADER: &'static str = "biggest_weekly_trader";
    pub const BIGGEST_MONTHLY_TRADER: &'static str = "biggest_monthly_trader";
    pub const INTEGRATION: &'static str = "integration";
    pub const DATA_SOURCE: &'static str = "data_source";
    pub const PLATFORMS: &'static str = "platforms";
    pub const ENTITY_VERSION: &'static str = "entity_version";
    pub const LEADERBOARD_TYPE: &'static str = "leaderboard_type";

    // Numeric annotations
    pub const TIMESTAMP: &'static str = "timestamp";
    pub const TOTAL_TRADERS: &'static str = "total_traders";
    pub const TOP_ALL_TIME_CENTS: &'static str = "top_all_time_cents";
    pub const TOP_WEEKLY_CENTS: &'static str = "top_weekly_cents";
    pub const TOP_MONTHLY_CENTS: &'static str = "top_monthly_cents";
    pub const TOTAL_VALUE_CENTS: &'static str = "total_value_cents";
    pub const PLATFORM_COUNT: &'static str = "platform_count";
    pub const BTL_BLOCKS: &'static str = "btl_blocks";
    pub const RANK_1_ALL_TIME: &'static str = "rank_1_all_time";
    pub const TOTAL_WEEKLY_CENTS: &'static str = "total_weekly_cents";
    pub const TOTAL_MONTHLY_CENTS: &'static str = "total_monthly_cents";

    // Trade annotations
    pub const COIN: &'static str = "coin";
    pub const SIDE: &'static str = "side";
    pub const DIRECTION: &'static str = "direction";
    pub const TRADE_ID: &'static str = "trade_id";
    pub const ORDER_ID: &'static str = "order_id";
    pub const USER: &'static str = "user";
    pub const FEE_TOKEN: &'static str = "fee_token";
    pub const SOURCE: &'static str = "source";
    pub const DESCRIPTION: &'static str = "description";
    pub const TIMESTAMP_ISO: &'static str = "timestamp_iso";
    pub const SDK_VERSION: &'static str = "sdk_version";
    pub const TRADE_ID_NUM: &'static str = "trade_id_num";
    pub const ORDER_ID_NUM: &'static str = "order_id_num";
    pub const EXECUTION_TIME: &'static str = "execution_time";
    pub const PRICE_CENTS: &'static str = "price_cents";
    pub const SIZE_SCALED: &'static str = "size_scaled";
    pub const VALUE_USD_CENTS: &'static str = "value_usd_cents";
    pub const PNL_CENTS: &'static str = "pnl_cents";
    pub const FEE_CENTS: &'static str = "fee_cents";
    pub const START_POSITION_SCALED: &'static str = "start_position_scaled";
    pub const IS_BUY: &'static str = "is_buy";
    pub const IS_SELL: &'static str = "is_sell";
    pub const IS_PROFITABLE: &'static str = "is_profitable";
    pub const CROSS_MARGIN: &'static str = "cross_margin";
    pub const FIELDS_COUNT: &'static str = "fields_count";

    // Annotation values
    pub const GENERIC_TYPE: &'static str = "daily_leaderboard";
    pub const NAMESPACED_TYPE_PREFIX: &'static str = "leaderboard_";
    pub const INTEGRATION_TAG: &'static str = "eth_warsaw_2025";
    pub const DATA_SOURCE_TAG: &'static str = "aggregated_platforms";
    pub const LEADERBOARD_TYPE_TAG: &'static str = "pnl_rankings";

    pub const TRADE_TYPE: &'static str = "hyperliquid_trade";
    pub const TRADE_SOURCE_TAG: &'static str = "hyperliquid_api";
    pub const SDK_VERSION_TAG: &'static str = "official";

    /// Lifetime of a stored leaderboard, in blocks.
    pub const LEADERBOARD_BTL: u64 = 50_000;
    /// Lifetime of a stored trade, in blocks.
    pub const TRADE_BTL: u64 = 10_000;

    /// `leaderboard_` followed by the first four bytes of the owner address,
    /// so each publisher queries its own documents first.
    pub fn namespaced_type(owner_address: &str) -> String {
        let hex = owner_address.trim_start_matches("0x");
        let suffix: String = hex.chars().take(8).collect();
        format!("{}{}", Self::NAMESPACED_TYPE_PREFIX, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_type_uses_first_four_address_bytes() {
        assert_eq!(
            AnnotationKeys::namespaced_type("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"),
            "leaderboard_2c7536e3"
        );
    }
}
