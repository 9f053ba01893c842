use std::{collections::BTreeMap, sync::Arc};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::{
    apis::api_models::response::{
        AvailableDate, LeaderboardResponse, OverviewResponse, RankedLeaderboardResponse, RankedRow,
    },
    models::{
        display_rows::DisplayRow,
        leaderboards::{CompleteLeaderboardEntity, LeaderboardMetadata},
        traders::TraderRecord,
    },
    repositories::{
        entity_store::{
            EntityCreate, EntityReceipt, EntityRecord, EntityStore, NumericAnnotation,
            StringAnnotation,
        },
        query::Query,
    },
    utils::{
        annotation_keys::AnnotationKeys,
        errors::app_error::AppError,
        math::{parse_decimal, to_cents},
        time::is_iso_date,
        wallet::OwnerIdentity,
    },
};

use super::{
    aggregator,
    ranking::{self, RankingField, SortDirection, PAGE_SIZE},
};

/// A stored leaderboard together with the key it was read from.
#[derive(Debug, Clone)]
pub struct StoredLeaderboard {
    pub entity_key: String,
    pub entity: CompleteLeaderboardEntity,
}

#[derive(Debug, Clone)]
pub struct PublishedLeaderboard {
    pub receipt: EntityReceipt,
    pub entity: CompleteLeaderboardEntity,
    pub string_annotations: usize,
    pub numeric_annotations: usize,
    pub data_size: usize,
}

pub struct LeaderboardService {
    store: Arc<dyn EntityStore>,
    owner: OwnerIdentity,
    default_date: String,
    reject_partial: bool,
}

impl LeaderboardService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        owner: OwnerIdentity,
        default_date: String,
        reject_partial: bool,
    ) -> Self {
        LeaderboardService {
            store,
            owner,
            default_date,
            reject_partial,
        }
    }

    pub fn owner(&self) -> &OwnerIdentity {
        &self.owner
    }

    pub fn namespaced_type(&self) -> String {
        AnnotationKeys::namespaced_type(&self.owner.address)
    }

    fn resolve_date(&self, date: Option<&str>) -> Result<String, AppError> {
        match date {
            None => Ok(self.default_date.clone()),
            Some(date) if is_iso_date(date) => Ok(date.to_string()),
            Some(date) => Err(AppError::BadRequest(format!(
                "date must be formatted as YYYY-MM-DD, got {}",
                date
            ))),
        }
    }

    /// Loads the largest leaderboard stored for `date`, preferring this
    /// owner's documents over the shared generic type.
    pub async fn fetch_latest(&self, date: Option<&str>) -> Result<StoredLeaderboard, AppError> {
        let date = self.resolve_date(date)?;
        let candidates = self.find_candidates(&date).await?;

        if candidates.is_empty() {
            return Err(AppError::NotFound(format!(
                "No leaderboard data found for date: {}",
                date
            )));
        }

        self.select_best(&candidates)
            .ok_or_else(|| AppError::NotFound("No valid leaderboard data found".to_string()))
    }

    async fn find_candidates(&self, date: &str) -> Result<Vec<EntityRecord>, AppError> {
        let namespaced = Query::eq(AnnotationKeys::TYPE, self.namespaced_type())
            .and(Query::eq(AnnotationKeys::DATE, date));
        debug!("Querying leaderboards with {}", namespaced);
        let results = self.store.query_entities(&namespaced).await?;
        if !results.is_empty() {
            return Ok(results);
        }

        let generic = Query::eq(AnnotationKeys::TYPE, AnnotationKeys::GENERIC_TYPE)
            .and(Query::eq(AnnotationKeys::DATE, date));
        debug!("No namespaced leaderboards, falling back to {}", generic);
        self.store.query_entities(&generic).await
    }

    /// Largest `totalTraders` wins; on ties the first decoded document is kept.
    fn select_best(&self, candidates: &[EntityRecord]) -> Option<StoredLeaderboard> {
        let mut best: Option<StoredLeaderboard> = None;

        for record in candidates {
            let entity =
                match CompleteLeaderboardEntity::decode(&record.key, &record.data, self.reject_partial)
                {
                    Ok(entity) => entity,
                    Err(e) => {
                        warn!("Skipping leaderboard document: {}", e);
                        continue;
                    }
                };

            let replace = match &best {
                Some(current) => {
                    entity.leaderboard.total_traders > current.entity.leaderboard.total_traders
                }
                None => true,
            };
            if replace {
                best = Some(StoredLeaderboard {
                    entity_key: record.key.clone(),
                    entity,
                });
            }
        }

        best
    }

    pub async fn get_display_rows(&self, date: Option<&str>) -> Result<LeaderboardResponse, AppError> {
        let stored = self.fetch_latest(date).await?;
        let data = stored
            .entity
            .leaderboard
            .top_performers
            .iter()
            .map(DisplayRow::from)
            .collect();

        Ok(LeaderboardResponse {
            timestamp: stored.entity.metadata.created_at,
            data,
        })
    }

    pub async fn get_ranked(
        &self,
        date: Option<&str>,
        field: RankingField,
        direction: SortDirection,
        page: usize,
    ) -> Result<RankedLeaderboardResponse, AppError> {
        let response = self.get_display_rows(date).await?;
        let ranked = ranking::rank_rows(response.data, field, direction);
        let page = ranking::paginate(&ranked, page);
        let offset = (page.current_page - 1) * PAGE_SIZE;

        let items = page
            .items
            .into_iter()
            .enumerate()
            .map(|(i, row)| RankedRow {
                position: offset + i + 1,
                platform_badge: ranking::platform_badge(&row.eth_address),
                row,
            })
            .collect();

        Ok(RankedLeaderboardResponse {
            timestamp: response.timestamp,
            sort_by: field.as_str().to_string(),
            sort_direction: direction.as_str().to_string(),
            items,
            total_items: page.total_items,
            current_page: page.current_page,
            items_per_page: PAGE_SIZE,
            total_pages: page.total_pages,
        })
    }

    pub async fn get_overview(&self, date: Option<&str>) -> Result<OverviewResponse, AppError> {
        let StoredLeaderboard { entity, .. } = self.fetch_latest(date).await?;
        let is_complete = entity.leaderboard.is_complete();
        let average_pnl = (entity.summary.entries_count > 0).then(|| entity.average_pnl());

        Ok(OverviewResponse {
            date: entity.leaderboard.date,
            metadata: entity.metadata,
            total_traders: entity.leaderboard.total_traders,
            total_all_time_pnl: entity.leaderboard.total_all_time_pnl,
            total_weekly_pnl: entity.leaderboard.total_weekly_pnl,
            total_monthly_pnl: entity.leaderboard.total_monthly_pnl,
            platform_distribution: entity.leaderboard.platform_distribution,
            highlights: entity.summary,
            is_complete,
            average_pnl,
        })
    }

    /// Dates with at least one stored leaderboard, newest first. Each date
    /// reports its largest document.
    pub async fn available_dates(&self) -> Result<Vec<AvailableDate>, AppError> {
        let query = Query::eq(AnnotationKeys::TYPE, self.namespaced_type())
            .or(Query::eq(AnnotationKeys::TYPE, AnnotationKeys::GENERIC_TYPE));
        let records = self.store.query_entities(&query).await?;

        let mut by_date: BTreeMap<String, AvailableDate> = BTreeMap::new();
        for record in records {
            let Some(date) = record.string_annotation(AnnotationKeys::DATE) else {
                continue;
            };
            let candidate = AvailableDate {
                date: date.to_string(),
                entity_key: record.key.clone(),
                total_traders: record
                    .numeric_annotation(AnnotationKeys::TOTAL_TRADERS)
                    .unwrap_or_default(),
                total_value_cents: record
                    .numeric_annotation(AnnotationKeys::TOTAL_VALUE_CENTS)
                    .unwrap_or_default(),
            };
            match by_date.get(date) {
                Some(existing) if existing.total_traders >= candidate.total_traders => {}
                _ => {
                    by_date.insert(candidate.date.clone(), candidate);
                }
            }
        }

        Ok(by_date.into_values().rev().collect())
    }

    /// Aggregates `records` and appends the result as a new entity tagged
    /// with this owner's namespaced type.
    pub async fn publish(
        &self,
        records: &[TraderRecord],
        date: Option<&str>,
    ) -> Result<PublishedLeaderboard, AppError> {
        if let Some(date) = date {
            self.resolve_date(Some(date))?;
        }

        let now = Utc::now();
        let leaderboard = aggregator::summarize(records, date, now);
        let summary = aggregator::highlights(records)?;
        let entity = CompleteLeaderboardEntity {
            metadata: LeaderboardMetadata::new(
                &self.owner.address,
                now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            leaderboard,
            summary,
        };

        let create = self.build_entity(&entity, records)?;
        let string_annotations = create.string_annotations.len();
        let numeric_annotations = create.numeric_annotations.len();
        let data_size = create.data.len();

        let receipt = self.store.create_entity(create).await?;
        info!(
            "Stored leaderboard for {} with {} traders as {}",
            entity.leaderboard.date, entity.leaderboard.total_traders, receipt.entity_key
        );

        Ok(PublishedLeaderboard {
            receipt,
            entity,
            string_annotations,
            numeric_annotations,
            data_size,
        })
    }

    fn build_entity(
        &self,
        entity: &CompleteLeaderboardEntity,
        records: &[TraderRecord],
    ) -> Result<EntityCreate, AppError> {
        let leaderboard = &entity.leaderboard;
        let summary = &entity.summary;
        let platforms: Vec<&str> = leaderboard
            .platform_distribution
            .keys()
            .map(|p| p.as_str())
            .collect();

        let string_annotations = vec![
            StringAnnotation::new(AnnotationKeys::TYPE, self.namespaced_type()),
            StringAnnotation::new(AnnotationKeys::DATE, leaderboard.date.as_str()),
            StringAnnotation::new(AnnotationKeys::STORED_BY, self.owner.address.as_str()),
            StringAnnotation::new(AnnotationKeys::TOP_PERFORMER, summary.top_performer.name.as_str()),
            StringAnnotation::new(
                AnnotationKeys::TOP_PERFORMER_PLATFORM,
                summary.top_performer.platform.as_str(),
            ),
            StringAnnotation::new(
                AnnotationKeys::TOP_PERFORMER_ADDRESS,
                summary.top_performer.address.as_str(),
            ),
            StringAnnotation::new(
                AnnotationKeys::BIGGEST_WEEKLY_TRADER,
                summary.biggest_weekly_gain.name.as_str(),
            ),
            StringAnnotation::new(
                AnnotationKeys::BIGGEST_MONTHLY_TRADER,
                summary.biggest_monthly_gain.name.as_str(),
            ),
            StringAnnotation::new(AnnotationKeys::INTEGRATION, AnnotationKeys::INTEGRATION_TAG),
            StringAnnotation::new(AnnotationKeys::DATA_SOURCE, AnnotationKeys::DATA_SOURCE_TAG),
            StringAnnotation::new(AnnotationKeys::PLATFORMS, platforms.join(",")),
            StringAnnotation::new(AnnotationKeys::ENTITY_VERSION, entity.metadata.version.as_str()),
            StringAnnotation::new(
                AnnotationKeys::LEADERBOARD_TYPE,
                AnnotationKeys::LEADERBOARD_TYPE_TAG,
            ),
        ];

        let mut numeric_annotations = vec![
            NumericAnnotation::new(AnnotationKeys::TIMESTAMP, leaderboard.timestamp),
            NumericAnnotation::new(AnnotationKeys::TOTAL_TRADERS, leaderboard.total_traders as i64),
            NumericAnnotation::new(
                AnnotationKeys::TOP_ALL_TIME_CENTS,
                to_cents(summary.top_performer.all_time()),
            ),
            NumericAnnotation::new(
                AnnotationKeys::TOP_WEEKLY_CENTS,
                to_cents(summary.biggest_weekly_gain.weekly()),
            ),
            NumericAnnotation::new(
                AnnotationKeys::TOP_MONTHLY_CENTS,
                to_cents(summary.biggest_monthly_gain.monthly()),
            ),
            NumericAnnotation::new(
                AnnotationKeys::TOTAL_VALUE_CENTS,
                to_cents(entity.total_value_tracked()),
            ),
            NumericAnnotation::new(AnnotationKeys::PLATFORM_COUNT, platforms.len() as i64),
            NumericAnnotation::new(AnnotationKeys::BTL_BLOCKS, AnnotationKeys::LEADERBOARD_BTL as i64),
            NumericAnnotation::new(
                AnnotationKeys::RANK_1_ALL_TIME,
                records.first().map(|r| to_cents(r.all_time())).unwrap_or_default(),
            ),
        ];

        let total_weekly = parse_decimal(&leaderboard.total_weekly_pnl);
        if total_weekly != 0.0 {
            numeric_annotations.push(NumericAnnotation::new(
                AnnotationKeys::TOTAL_WEEKLY_CENTS,
                to_cents(total_weekly),
            ));
        }
        let total_monthly = parse_decimal(&leaderboard.total_monthly_pnl);
        if total_monthly != 0.0 {
            numeric_annotations.push(NumericAnnotation::new(
                AnnotationKeys::TOTAL_MONTHLY_CENTS,
                to_cents(total_monthly),
            ));
        }

        Ok(EntityCreate {
            data: serde_json::to_vec_pretty(entity)?,
            btl: AnnotationKeys::LEADERBOARD_BTL,
            string_annotations,
            numeric_annotations,
        })
    }

    /// Runs a raw annotation predicate against the store.
    pub async fn query_raw(&self, expression: &str) -> Result<Vec<EntityRecord>, AppError> {
        let query = Query::parse(expression)?;
        debug!("Running raw query {}", query);
        self.store.query_entities(&query).await
    }
}
