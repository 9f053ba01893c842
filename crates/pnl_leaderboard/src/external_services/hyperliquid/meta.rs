use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::errors::app_error::AppError;

use super::{all_mids::InfoTypeRequest, HyperliquidService};

fn default_sz_decimals() -> u32 {
    6
}

fn default_max_leverage() -> u32 {
    1
}

/// A tradable perpetual and its sizing limits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    pub name: String,
    #[serde(default = "default_sz_decimals")]
    pub sz_decimals: u32,
    #[serde(default = "default_max_leverage")]
    pub max_leverage: u32,
    #[serde(default)]
    pub only_isolated: bool,
}

#[derive(Deserialize, Debug)]
struct Meta {
    universe: Option<Vec<AssetMeta>>,
}

impl HyperliquidService {
    pub async fn get_asset_metadata(&self) -> Result<Vec<AssetMeta>, AppError> {
        let meta: Meta = self.post_info(&InfoTypeRequest { r#type: "meta" }).await?;
        let assets = meta
            .universe
            .ok_or_else(|| AppError::UpstreamFailure("No asset metadata found".to_string()))?;

        info!("Retrieved metadata for {} assets", assets.len());
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_asset_defaults() {
        let meta: Meta = serde_json::from_str(
            r#"{"universe": [
                {"name": "BTC", "szDecimals": 5, "maxLeverage": 40},
                {"name": "FRIEND"}
            ]}"#,
        )
        .unwrap();

        let universe = meta.universe.unwrap();
        assert_eq!(universe[0].max_leverage, 40);
        assert_eq!(universe[1].sz_decimals, 6);
        assert_eq!(universe[1].max_leverage, 1);
        assert!(!universe[1].only_isolated);
    }

    #[test]
    fn universe_is_required() {
        let meta: Meta = serde_json::from_str(r#"{"marginTables": []}"#).unwrap();
        assert!(meta.universe.is_none());
    }
}
