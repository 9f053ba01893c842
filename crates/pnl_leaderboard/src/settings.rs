use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::external_services::hyperliquid::HYPERLIQUID_API_URL;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub environment: Option<String>,
    pub port: Option<u16>,
    /// Hex secret of the owner account. Required to read or publish.
    pub private_key: Option<String>,
    /// Entities are kept in process memory when unset.
    pub redis_url: Option<String>,
    pub hyperliquid_api_url: String,
    pub default_date: String,
    pub block_time_secs: u64,
    pub reject_partial_documents: bool,
    pub seed_sample_data: bool,
}

impl Settings {
    pub fn block_time(&self) -> Duration {
        Duration::from_secs(self.block_time_secs)
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(Environment::default())
}

pub fn load_settings_from(environment: Environment) -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .set_default("hyperliquid_api_url", HYPERLIQUID_API_URL)?
        .set_default("default_date", "2025-09-07")?
        .set_default("block_time_secs", 5)?
        .set_default("reject_partial_documents", false)?
        .set_default("seed_sample_data", false)?
        .add_source(environment);
    settings.build()?.try_deserialize()
}
