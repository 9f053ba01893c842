use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::errors::app_error::AppError;

use super::HyperliquidService;

#[derive(Serialize, Debug)]
pub struct ClearinghouseStateRequest {
    pub r#type: &'static str,
    pub user: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Leverage {
    pub r#type: String,
    pub value: u32,
}

/// An open perpetual position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPosition {
    pub coin: String,
    /// Signed size, negative for shorts.
    pub szi: Decimal,
    pub entry_px: Option<Decimal>,
    pub position_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub liquidation_px: Option<Decimal>,
    pub leverage: Option<Leverage>,
}

impl UserPosition {
    pub fn is_long(&self) -> bool {
        self.szi > Decimal::ZERO
    }
}

#[derive(Deserialize, Debug)]
struct AssetPosition {
    position: UserPosition,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ClearinghouseState {
    #[serde(default)]
    asset_positions: Vec<AssetPosition>,
}

impl HyperliquidService {
    /// Open positions of `user`; an account without positions yields an
    /// empty list.
    pub async fn get_user_positions(&self, user: &str) -> Result<Vec<UserPosition>, AppError> {
        let request = ClearinghouseStateRequest {
            r#type: "clearinghouseState",
            user: user.to_string(),
        };
        let state: ClearinghouseState = self.post_info(&request).await?;
        let positions: Vec<UserPosition> = state
            .asset_positions
            .into_iter()
            .map(|asset| asset.position)
            .collect();

        info!("Retrieved {} positions for user {}", positions.len(), user);
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_asset_positions() {
        let state: ClearinghouseState = serde_json::from_str(
            r#"{
                "assetPositions": [{
                    "position": {
                        "coin": "ETH", "entryPx": "2986.3", "szi": "-0.0335",
                        "positionValue": "100.02765", "unrealizedPnl": "-0.0134",
                        "liquidationPx": null,
                        "leverage": {"type": "isolated", "value": 20, "rawUsd": "-95.05"}
                    },
                    "type": "oneWay"
                }],
                "withdrawable": "13104.514502"
            }"#,
        )
        .unwrap();

        let position = &state.asset_positions[0].position;
        assert_eq!(position.coin, "ETH");
        assert!(!position.is_long());
        assert_eq!(position.liquidation_px, None);
        assert_eq!(position.leverage.as_ref().map(|l| l.value), Some(20));
    }

    #[test]
    fn missing_positions_are_empty() {
        let state: ClearinghouseState = serde_json::from_str("{}").unwrap();
        assert!(state.asset_positions.is_empty());
    }
}
