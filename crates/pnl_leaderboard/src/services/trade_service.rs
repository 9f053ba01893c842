use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    external_services::hyperliquid::{
        user_fills::{FillSide, UserFill},
        HyperliquidService,
    },
    models::trades::{id_tail, CompleteTradeEntity, ENTITY_VERSION, FIELDS_PRESERVED},
    repositories::{
        entity_store::{EntityCreate, EntityReceipt, EntityStore, NumericAnnotation, StringAnnotation},
        query::Query,
    },
    utils::{
        annotation_keys::AnnotationKeys, errors::app_error::AppError, math::scaled_floor,
        wallet::OwnerIdentity,
    },
};

#[derive(Debug, Clone)]
pub struct StoredTrade {
    pub entity_key: String,
    pub entity: CompleteTradeEntity,
}

#[derive(Debug, Clone)]
pub struct PublishedTrade {
    pub receipt: EntityReceipt,
    pub entity: CompleteTradeEntity,
    pub string_annotations: usize,
    pub numeric_annotations: usize,
    pub data_size: usize,
}

/// Copies Hyperliquid fills into the entity store, one entity per fill.
pub struct TradeService {
    store: Arc<dyn EntityStore>,
    owner: OwnerIdentity,
    hyperliquid_service: Arc<HyperliquidService>,
}

impl TradeService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        owner: OwnerIdentity,
        hyperliquid_service: Arc<HyperliquidService>,
    ) -> Self {
        TradeService {
            store,
            owner,
            hyperliquid_service,
        }
    }

    /// Fetches the newest fill of `user` and stores it. `None` when the user
    /// has no fills.
    pub async fn store_latest_fill(&self, user: &str) -> Result<Option<PublishedTrade>, AppError> {
        let fills = self.hyperliquid_service.get_recent_fills(user, 1).await?;
        match fills.first() {
            Some(fill) => Ok(Some(self.store_fill(fill).await?)),
            None => {
                info!("No fills found for {}", user);
                Ok(None)
            }
        }
    }

    pub async fn store_fill(&self, fill: &UserFill) -> Result<PublishedTrade, AppError> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let entity = CompleteTradeEntity::from_fill(fill, &self.owner.address, created_at)?;

        let create = build_entity(&entity, fill)?;
        let string_annotations = create.string_annotations.len();
        let numeric_annotations = create.numeric_annotations.len();
        let data_size = create.data.len();

        let receipt = self.store.create_entity(create).await?;
        info!(
            "Stored trade {} ({}) as {}",
            entity.hyperliquid_trade.trade_id, entity.computed.human_description, receipt.entity_key
        );

        Ok(PublishedTrade {
            receipt,
            entity,
            string_annotations,
            numeric_annotations,
            data_size,
        })
    }

    /// Stored copies of the trade with id `trade_id`. Undecodable documents
    /// are skipped.
    pub async fn find_trade(&self, trade_id: &str) -> Result<Vec<StoredTrade>, AppError> {
        let query = Query::eq(AnnotationKeys::TYPE, AnnotationKeys::TRADE_TYPE)
            .and(Query::eq(AnnotationKeys::TRADE_ID, trade_id));
        let records = self.store.query_entities(&query).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                match serde_json::from_slice::<CompleteTradeEntity>(&record.data) {
                    Ok(entity) => Some(StoredTrade {
                        entity_key: record.key,
                        entity,
                    }),
                    Err(e) => {
                        warn!("Skipping trade document {}: {}", record.key, e);
                        None
                    }
                }
            })
            .collect())
    }

    pub async fn count_trades(&self) -> Result<usize, AppError> {
        let query = Query::eq(AnnotationKeys::TYPE, AnnotationKeys::TRADE_TYPE);
        Ok(self.store.query_entities(&query).await?.len())
    }
}

fn build_entity(entity: &CompleteTradeEntity, fill: &UserFill) -> Result<EntityCreate, AppError> {
    let trade = &entity.hyperliquid_trade;
    let computed = &entity.computed;
    let direction = if fill.dir.is_empty() {
        "settlement"
    } else {
        fill.dir.as_str()
    };

    let string_annotations = vec![
        StringAnnotation::new(AnnotationKeys::TYPE, AnnotationKeys::TRADE_TYPE),
        StringAnnotation::new(AnnotationKeys::COIN, fill.coin.as_str()),
        StringAnnotation::new(
            AnnotationKeys::SIDE,
            if fill.side == FillSide::Bid { "buy" } else { "sell" },
        ),
        StringAnnotation::new(AnnotationKeys::DIRECTION, direction),
        StringAnnotation::new(AnnotationKeys::TRADE_ID, trade.trade_id.as_str()),
        StringAnnotation::new(AnnotationKeys::ORDER_ID, trade.order_id.as_str()),
        StringAnnotation::new(
            AnnotationKeys::USER,
            fill.user.as_deref().unwrap_or("unknown"),
        ),
        StringAnnotation::new(AnnotationKeys::FEE_TOKEN, fill.fee_token.as_str()),
        StringAnnotation::new(AnnotationKeys::INTEGRATION, AnnotationKeys::INTEGRATION_TAG),
        StringAnnotation::new(AnnotationKeys::SOURCE, AnnotationKeys::TRADE_SOURCE_TAG),
        StringAnnotation::new(AnnotationKeys::DESCRIPTION, computed.human_description.as_str()),
        StringAnnotation::new(AnnotationKeys::DATE, computed.trade_date.as_str()),
        StringAnnotation::new(
            AnnotationKeys::TIMESTAMP_ISO,
            computed.trade_timestamp_iso.as_str(),
        ),
        StringAnnotation::new(AnnotationKeys::ENTITY_VERSION, ENTITY_VERSION),
        StringAnnotation::new(AnnotationKeys::SDK_VERSION, AnnotationKeys::SDK_VERSION_TAG),
    ];

    let order_id_num = match fill.oid {
        Some(oid) => id_tail(&oid.to_string()),
        None => 1,
    };
    let fee = fill.fee.unwrap_or_default();

    let mut numeric_annotations = vec![
        NumericAnnotation::new(AnnotationKeys::TRADE_ID_NUM, id_tail(&trade.trade_id)),
        NumericAnnotation::new(
            AnnotationKeys::ORDER_ID_NUM,
            if order_id_num == 0 { 1 } else { order_id_num },
        ),
        NumericAnnotation::new(AnnotationKeys::EXECUTION_TIME, fill.time),
        NumericAnnotation::new(AnnotationKeys::PRICE_CENTS, scaled_floor(fill.px, 100)),
        NumericAnnotation::new(AnnotationKeys::SIZE_SCALED, scaled_floor(fill.sz, 10_000)),
        NumericAnnotation::new(
            AnnotationKeys::VALUE_USD_CENTS,
            scaled_floor(computed.total_value_usd, 100),
        ),
    ];
    // Zero values are left out rather than stored.
    if fill.closed_pnl != Decimal::ZERO {
        numeric_annotations.push(NumericAnnotation::new(
            AnnotationKeys::PNL_CENTS,
            scaled_floor(fill.closed_pnl, 100),
        ));
    }
    if fee != Decimal::ZERO {
        numeric_annotations.push(NumericAnnotation::new(
            AnnotationKeys::FEE_CENTS,
            scaled_floor(fee, 100),
        ));
    }
    if fill.start_position != Decimal::ZERO {
        numeric_annotations.push(NumericAnnotation::new(
            AnnotationKeys::START_POSITION_SCALED,
            scaled_floor(fill.start_position, 10_000),
        ));
    }
    numeric_annotations.push(NumericAnnotation::new(
        AnnotationKeys::BTL_BLOCKS,
        AnnotationKeys::TRADE_BTL as i64,
    ));
    let flag = match fill.side {
        FillSide::Bid => AnnotationKeys::IS_BUY,
        FillSide::Ask => AnnotationKeys::IS_SELL,
    };
    numeric_annotations.push(NumericAnnotation::new(flag, 1));
    if computed.is_profitable {
        numeric_annotations.push(NumericAnnotation::new(AnnotationKeys::IS_PROFITABLE, 1));
    }
    if fill.crossed {
        numeric_annotations.push(NumericAnnotation::new(AnnotationKeys::CROSS_MARGIN, 1));
    }
    numeric_annotations.push(NumericAnnotation::new(
        AnnotationKeys::FIELDS_COUNT,
        FIELDS_PRESERVED as i64,
    ));

    Ok(EntityCreate {
        data: serde_json::to_vec_pretty(entity)?,
        btl: AnnotationKeys::TRADE_BTL,
        string_annotations,
        numeric_annotations,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::repositories::memory_store::InMemoryEntityStore;

    const OWNER: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";
    const TRADER: &str = "0x77c3ea550d2da44b120e55071f57a108f8dd5e45";

    fn service(store: Arc<InMemoryEntityStore>) -> TradeService {
        TradeService::new(
            store,
            OwnerIdentity {
                address: OWNER.to_string(),
            },
            Arc::new(HyperliquidService::new("http://127.0.0.1:9".to_string()).unwrap()),
        )
    }

    fn memory_store() -> Arc<InMemoryEntityStore> {
        Arc::new(InMemoryEntityStore::new(Duration::from_secs(5)))
    }

    fn fill(json: &str) -> UserFill {
        let mut fill: UserFill = serde_json::from_str(json).unwrap();
        fill.user = Some(TRADER.to_string());
        fill
    }

    fn profitable_sell() -> UserFill {
        fill(
            r#"{"coin":"ETH","px":"2500.129","sz":"2","side":"A","time":1725700500000,
                "startPosition":"2.5","dir":"Close Long","closedPnl":"125.5","hash":"0xbb",
                "oid":77,"crossed":true,"fee":"1.75","tid":4242,"feeToken":"USDC"}"#,
        )
    }

    #[tokio::test]
    async fn stores_fill_with_full_annotation_set() {
        let store = memory_store();
        let service = service(store.clone());

        let published = service.store_fill(&profitable_sell()).await.unwrap();
        assert_eq!(published.string_annotations, 15);
        assert_eq!(published.numeric_annotations, 14);
        assert_eq!(store.len().await, 1);

        let records = store
            .query_entities(&Query::eq(AnnotationKeys::TRADE_ID, "4242"))
            .await
            .unwrap();
        let record = &records[0];
        assert_eq!(record.string_annotation("type"), Some("hyperliquid_trade"));
        assert_eq!(record.string_annotation("side"), Some("sell"));
        assert_eq!(record.string_annotation("direction"), Some("Close Long"));
        assert_eq!(record.string_annotation("user"), Some(TRADER));
        assert_eq!(record.string_annotation("date"), Some("2024-09-07"));
        assert_eq!(record.string_annotation("description"), Some("SELL 2 ETH @ $2500.129"));
        assert_eq!(record.numeric_annotation("trade_id_num"), Some(4242));
        assert_eq!(record.numeric_annotation("order_id_num"), Some(77));
        assert_eq!(record.numeric_annotation("price_cents"), Some(250_012));
        assert_eq!(record.numeric_annotation("size_scaled"), Some(20_000));
        assert_eq!(record.numeric_annotation("value_usd_cents"), Some(500_025));
        assert_eq!(record.numeric_annotation("pnl_cents"), Some(12_550));
        assert_eq!(record.numeric_annotation("fee_cents"), Some(175));
        assert_eq!(record.numeric_annotation("start_position_scaled"), Some(25_000));
        assert_eq!(record.numeric_annotation("btl_blocks"), Some(10_000));
        assert_eq!(record.numeric_annotation("is_sell"), Some(1));
        assert_eq!(record.numeric_annotation("is_buy"), None);
        assert_eq!(record.numeric_annotation("is_profitable"), Some(1));
        assert_eq!(record.numeric_annotation("fields_count"), Some(15));
    }

    #[tokio::test]
    async fn zero_values_are_not_annotated() {
        let store = memory_store();
        let service = service(store.clone());
        let settlement = fill(
            r#"{"coin":"BTC","px":"61000","sz":"0.05","side":"B","time":1725700100000,
                "hash":"0xcc","tid":13}"#,
        );

        let published = service.store_fill(&settlement).await.unwrap();
        assert_eq!(published.numeric_annotations, 9);

        let found = service.find_trade("13").await.unwrap();
        assert_eq!(found.len(), 1);
        let records = store
            .query_entities(&Query::eq(AnnotationKeys::TRADE_ID, "13"))
            .await
            .unwrap();
        let record = &records[0];
        assert_eq!(record.string_annotation("direction"), Some("settlement"));
        assert_eq!(record.string_annotation("order_id"), Some("0"));
        assert_eq!(record.numeric_annotation("order_id_num"), Some(1));
        assert_eq!(record.numeric_annotation("is_buy"), Some(1));
        assert_eq!(record.numeric_annotation("pnl_cents"), None);
        assert_eq!(record.numeric_annotation("fee_cents"), None);
        assert_eq!(record.numeric_annotation("cross_margin"), None);
    }

    #[tokio::test]
    async fn finds_stored_trades_by_id() {
        let store = memory_store();
        let service = service(store);
        let published = service.store_fill(&profitable_sell()).await.unwrap();

        let found = service.find_trade("4242").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_key, published.receipt.entity_key);
        assert_eq!(found[0].entity, published.entity);
        assert_eq!(found[0].entity.computed.formatted_value, "$5000.26");

        assert!(service.find_trade("4243").await.unwrap().is_empty());
        assert_eq!(service.count_trades().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unreachable_api_fails_latest_fill() {
        let service = service(memory_store());
        let err = service.store_latest_fill(TRADER).await.unwrap_err();
        assert!(matches!(err, AppError::RequestError(_)));
    }
}
