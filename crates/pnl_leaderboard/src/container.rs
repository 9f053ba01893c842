use std::sync::Arc;

use tracing::info;

use crate::{
    external_services::hyperliquid::HyperliquidService,
    repositories::{
        entity_store::EntityStore, memory_store::InMemoryEntityStore,
        redis_store::RedisEntityStore,
    },
    services::{leaderboard_service::LeaderboardService, trade_service::TradeService},
    settings::Settings,
    utils::{errors::app_error::AppError, wallet::OwnerIdentity},
};

pub struct ServiceContainer {
    pub leaderboard_service: Arc<LeaderboardService>,
    pub hyperliquid_service: Arc<HyperliquidService>,
    pub trade_service: Arc<TradeService>,
}

impl ServiceContainer {
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let owner = OwnerIdentity::from_env_value(settings.private_key.as_deref())?;
        info!("Using owner account {}", owner.address);

        let store = setup_store(settings).await?;
        let hyperliquid_service = Arc::new(HyperliquidService::new(
            settings.hyperliquid_api_url.clone(),
        )?);
        let trade_service = Arc::new(TradeService::new(
            store.clone(),
            owner.clone(),
            hyperliquid_service.clone(),
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(
            store,
            owner,
            settings.default_date.clone(),
            settings.reject_partial_documents,
        ));

        Ok(Self {
            leaderboard_service,
            hyperliquid_service,
            trade_service,
        })
    }
}

pub async fn setup_store(settings: &Settings) -> Result<Arc<dyn EntityStore>, AppError> {
    match &settings.redis_url {
        Some(redis_url) => {
            info!("Using redis entity store");
            Ok(Arc::new(
                RedisEntityStore::new(redis_url, settings.block_time()).await?,
            ))
        }
        None => {
            info!("REDIS_URL not set, using in-memory entity store");
            Ok(Arc::new(InMemoryEntityStore::new(settings.block_time())))
        }
    }
}
