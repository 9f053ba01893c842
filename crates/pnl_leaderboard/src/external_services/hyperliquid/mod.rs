use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::utils::errors::app_error::AppError;

pub mod all_mids;
pub mod meta;
pub mod positions;
pub mod user_fills;

pub const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the public Hyperliquid `/info` endpoint.
pub struct HyperliquidService {
    client: Client,
    hyperliquid_api_url: String,
}

impl HyperliquidService {
    pub fn new(hyperliquid_api_url: String) -> Result<Self, AppError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            hyperliquid_api_url: hyperliquid_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_info<B, T>(&self, body: &B) -> Result<T, AppError>
    where
        B: Serialize + std::fmt::Debug,
        T: DeserializeOwned,
    {
        debug!("Posting to hyperliquid info: {:?}", body);
        let response = self
            .client
            .post(format!("{}/info", self.hyperliquid_api_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Hyperliquid request {:?} failed with {}: {}", body, status, text);
            return Err(AppError::UpstreamFailure(format!(
                "hyperliquid responded with {}: {}",
                status, text
            )));
        }

        Ok(response.json::<T>().await?)
    }
}
