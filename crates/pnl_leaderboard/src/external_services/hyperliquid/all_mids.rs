use std::{collections::HashMap, time::Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use crate::utils::errors::app_error::AppError;

use super::HyperliquidService;

/// Body of the parameterless `/info` requests.
#[derive(Serialize, Debug)]
pub struct InfoTypeRequest {
    pub r#type: &'static str,
}

/// Mid price per coin symbol.
pub type AllMids = HashMap<String, Decimal>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiHealth {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: ApiHealth,
    /// Unix millis when the check finished.
    pub timestamp: i64,
    pub response_time_ms: Option<u64>,
}

impl HyperliquidService {
    pub async fn get_all_mids(&self) -> Result<AllMids, AppError> {
        let mids: AllMids = self
            .post_info(&InfoTypeRequest { r#type: "allMids" })
            .await?;
        info!("Retrieved market data for {} assets", mids.len());
        Ok(mids)
    }

    /// `true` when `allMids` answers with at least one market.
    pub async fn test_connection(&self) -> bool {
        match self.get_all_mids().await {
            Ok(mids) => !mids.is_empty(),
            Err(e) => {
                error!("Hyperliquid connection failed: {}", e);
                false
            }
        }
    }

    /// Times an `allMids` round trip.
    pub async fn get_health_status(&self) -> HealthStatus {
        let started = Instant::now();
        let result = self.get_all_mids().await;
        let elapsed = started.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthStatus {
                status: ApiHealth::Healthy,
                timestamp: Utc::now().timestamp_millis(),
                response_time_ms: Some(elapsed),
            },
            Err(e) => {
                error!("Hyperliquid health check failed: {}", e);
                HealthStatus {
                    status: ApiHealth::Unhealthy,
                    timestamp: Utc::now().timestamp_millis(),
                    response_time_ms: None,
                }
            }
        }
    }

    /// Exchange-wide statistics such as 24h volume. The shape is not
    /// documented, so it is returned untyped.
    pub async fn get_global_stats(&self) -> Result<serde_json::Value, AppError> {
        self.post_info(&InfoTypeRequest {
            r#type: "globalStats",
        })
        .await
    }
}
