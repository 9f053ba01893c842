//! Producer CLI: publishes leaderboards into the entity store and inspects
//! what is stored there.
//!
//! ```bash
//! publisher store data/2025-09-07.json
//! publisher read 2025-09-07
//! publisher query 'type = "daily_leaderboard" && total_traders >= 50'
//! publisher fills 0x77c3ea550d2da44b120e55071f57a108f8dd5e45 --limit 20
//! publisher store-fill 0x77c3ea550d2da44b120e55071f57a108f8dd5e45 --yes
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use indexmap::IndexMap;
use inquire::Confirm;
use pnl_leaderboard::{
    container::ServiceContainer,
    external_services::hyperliquid::{
        all_mids::ApiHealth,
        user_fills::{filter_by_direction, newest_first, FillDirection, UserFill},
        HyperliquidService,
    },
    models::{
        display_rows::DisplayRow,
        leaderboards::LeaderboardSummary,
        traders::{load_trader_file, sample_leaderboard, Platform, TraderRecord},
        trades::CompleteTradeEntity,
    },
    services::{
        leaderboard_service::LeaderboardService,
        trade_service::{PublishedTrade, TradeService},
    },
    settings::{self, Settings},
    utils::time::TimeWindow,
};
use rust_decimal::Decimal;

const READ_PREVIEW_ROWS: usize = 20;

#[derive(Parser)]
#[command(name = "publisher")]
#[command(version)]
#[command(about = "Publish and inspect daily PnL leaderboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a trader file (or the bundled sample) and store it
    Store {
        /// JSON array of trader records; `YYYY-MM-DD.json` names set the date
        file: Option<PathBuf>,
        /// Overrides the leaderboard date
        #[arg(long)]
        date: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the largest leaderboard stored for a date
    Read { date: Option<String> },
    /// Check that the stored trader count matches the stored traders
    Verify { date: Option<String> },
    /// List dates with stored leaderboards
    Dates,
    /// Run a raw annotation query, e.g. `total_traders >= 50`
    Query { expression: String },
    /// Show Hyperliquid fills for an address
    Fills {
        address: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        coin: Option<String>,
        /// long, short, open or close
        #[arg(long)]
        direction: Option<FillDirection>,
        /// First day to include, YYYY-MM-DD (UTC)
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Last day to include, YYYY-MM-DD (UTC)
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Store the newest Hyperliquid fill of an address as a trade entity
    StoreFill {
        address: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the stored copies of a trade
    Trade { trade_id: String },
    /// Show open Hyperliquid positions for an address
    Positions { address: String },
    /// List tradable Hyperliquid assets
    Markets,
    /// Check Hyperliquid connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let settings = settings::load_settings().context("failed to load settings")?;
    pnl_leaderboard::init_tracing(&settings);
    let cli = Cli::parse();
    let container = container(&settings).await?;
    let leaderboards = container.leaderboard_service.as_ref();
    let trades = container.trade_service.as_ref();
    let hyperliquid = container.hyperliquid_service.as_ref();

    match cli.command {
        Commands::Store { file, date, yes } => store(leaderboards, file, date, yes).await,
        Commands::Read { date } => read(leaderboards, date).await,
        Commands::Verify { date } => verify(leaderboards, date).await,
        Commands::Dates => dates(leaderboards).await,
        Commands::Query { expression } => query(leaderboards, &expression).await,
        Commands::Fills {
            address,
            limit,
            coin,
            direction,
            since,
            until,
        } => {
            let filter = FillFilter {
                limit,
                coin,
                direction,
                since,
                until,
            };
            fills(hyperliquid, &address, filter).await
        }
        Commands::StoreFill { address, yes } => store_fill(trades, hyperliquid, &address, yes).await,
        Commands::Trade { trade_id } => trade(trades, &trade_id).await,
        Commands::Positions { address } => positions(hyperliquid, &address).await,
        Commands::Markets => markets(hyperliquid).await,
        Commands::Ping => ping(hyperliquid, &settings).await,
    }
}

async fn container(settings: &Settings) -> anyhow::Result<ServiceContainer> {
    if settings.redis_url.is_none() {
        tracing::warn!("REDIS_URL is not set, stored entities will not outlive this process");
    }
    Ok(ServiceContainer::new(settings).await?)
}

async fn store(
    service: &LeaderboardService,
    file: Option<PathBuf>,
    date: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let (records, file_date) = match &file {
        Some(path) => load_trader_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => (sample_leaderboard()?, None),
    };
    let date = date.or(file_date);

    println!("Owner:    {}", service.owner().address);
    println!("Type:     {}", service.namespaced_type());
    println!("Date:     {}", date.as_deref().unwrap_or("today (UTC)"));
    println!("Traders:  {}", records.len());
    if let Some(top) = records.first() {
        println!("Rank 1:   {} on {} ({})", top.name, top.platform, top.all_time_pnl);
    }

    if !yes {
        let confirmed = Confirm::new("Store this leaderboard?")
            .with_default(true)
            .prompt()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    let published = service.publish(&records, date.as_deref()).await?;
    let leaderboard = &published.entity.leaderboard;

    println!();
    println!("Stored leaderboard for {}", leaderboard.date);
    println!("  entity key:          {}", published.receipt.entity_key);
    println!("  expires at:          {}", published.receipt.expires_at);
    println!("  data size:           {} bytes", published.data_size);
    println!("  string annotations:  {}", published.string_annotations);
    println!("  numeric annotations: {}", published.numeric_annotations);
    println!(
        "  platforms:           {}",
        format_distribution(&published.entity.leaderboard.platform_distribution)
    );
    Ok(())
}

async fn read(service: &LeaderboardService, date: Option<String>) -> anyhow::Result<()> {
    let stored = match service.fetch_latest(date.as_deref()).await {
        Ok(stored) => stored,
        Err(e) if e.is_not_found() => {
            println!("{}", e);
            return dates(service).await;
        }
        Err(e) => return Err(e.into()),
    };

    let entity = &stored.entity;
    let leaderboard = &entity.leaderboard;
    let summary = &entity.summary;

    println!("Entity {}", stored.entity_key);
    println!("  type:       {} v{}", entity.metadata.entity_type, entity.metadata.version);
    println!("  created at: {}", entity.metadata.created_at);
    println!("  stored by:  {}", entity.metadata.stored_by);
    println!("  source:     {}", entity.metadata.data_source);
    println!();
    println!("Leaderboard {}", leaderboard.date);
    println!("  traders:        {}", leaderboard.total_traders);
    println!("  all-time PnL:   {}", leaderboard.total_all_time_pnl);
    println!("  weekly PnL:     {}", leaderboard.total_weekly_pnl);
    println!("  monthly PnL:    {}", leaderboard.total_monthly_pnl);
    println!(
        "  platforms:      {}",
        format_distribution(&leaderboard.platform_distribution)
    );
    println!();
    println!("Highlights");
    println!("  top performer:   {}", describe(&summary.top_performer));
    println!("  biggest weekly:  {}", describe(&summary.biggest_weekly_gain));
    println!("  biggest monthly: {}", describe(&summary.biggest_monthly_gain));
    for (platform, leader) in &summary.platform_leaders {
        println!("  {} leader: {}", platform, describe(leader));
    }
    println!();

    println!(
        "{:>4}  {:<24} {:<12} {:>20} {:>10}",
        "rank", "name", "platform", "all-time PnL", "ROI"
    );
    for record in leaderboard.top_performers.iter().take(READ_PREVIEW_ROWS) {
        let row = DisplayRow::from(record);
        let roi = row
            .performance(TimeWindow::AllTime)
            .map(|perf| perf.roi.clone())
            .unwrap_or_default();
        println!(
            "{:>4}  {:<24} {:<12} {:>20} {:>10}",
            record.rank, record.name, record.platform, record.all_time_pnl, roi
        );
    }
    if leaderboard.top_performers.len() > READ_PREVIEW_ROWS {
        println!(
            "  ... and {} more",
            leaderboard.top_performers.len() - READ_PREVIEW_ROWS
        );
    }

    println!();
    print_completeness(&stored.entity.leaderboard);
    Ok(())
}

async fn verify(service: &LeaderboardService, date: Option<String>) -> anyhow::Result<()> {
    let stored = service.fetch_latest(date.as_deref()).await?;
    print_completeness(&stored.entity.leaderboard);
    if !stored.entity.leaderboard.is_complete() {
        bail!("leaderboard {} is incomplete", stored.entity_key);
    }
    Ok(())
}

async fn dates(service: &LeaderboardService) -> anyhow::Result<()> {
    let dates = service.available_dates().await?;
    if dates.is_empty() {
        println!("No leaderboards stored");
        return Ok(());
    }

    println!("Available dates:");
    for date in dates {
        println!(
            "  {}  {} traders  ${:.2} tracked  ({})",
            date.date,
            date.total_traders,
            date.total_value_cents as f64 / 100.0,
            date.entity_key
        );
    }
    Ok(())
}

async fn query(service: &LeaderboardService, expression: &str) -> anyhow::Result<()> {
    let records = service.query_raw(expression).await?;
    println!("{} entities match", records.len());
    for record in records {
        println!("{}", record.key);
        for annotation in &record.string_annotations {
            println!("  {} = {:?}", annotation.key, annotation.value);
        }
        for annotation in &record.numeric_annotations {
            println!("  {} = {}", annotation.key, annotation.value);
        }
    }
    Ok(())
}

struct FillFilter {
    limit: usize,
    coin: Option<String>,
    direction: Option<FillDirection>,
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl FillFilter {
    /// Inclusive unix-millis bounds of the `since`/`until` days.
    fn time_range(&self) -> Option<(i64, i64)> {
        if self.since.is_none() && self.until.is_none() {
            return None;
        }
        let start = self
            .since
            .map(|day| day.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
            .unwrap_or(0);
        let end = self
            .until
            .and_then(|day| day.succ_opt())
            .map(|day| day.and_time(NaiveTime::MIN).and_utc().timestamp_millis() - 1)
            .unwrap_or(i64::MAX);
        Some((start, end))
    }
}

async fn fills(hyperliquid: &HyperliquidService, address: &str, filter: FillFilter) -> anyhow::Result<()> {
    let mut fills = match (&filter.coin, filter.time_range(), filter.direction) {
        (Some(coin), _, _) => hyperliquid.get_fills_by_coin(address, coin).await?,
        (None, Some((start, end)), _) => {
            hyperliquid.get_fills_by_time_range(address, start, end).await?
        }
        (None, None, None) => hyperliquid.get_recent_fills(address, filter.limit).await?,
        (None, None, Some(_)) => hyperliquid.get_user_fills(address).await?,
    };
    if let Some(direction) = filter.direction {
        fills = filter_by_direction(fills, direction);
    }
    let fills = newest_first(fills, filter.limit);

    let mut realized = Decimal::ZERO;
    let mut volume = Decimal::ZERO;
    for fill in &fills {
        realized += fill.closed_pnl;
        volume += fill.notional();
        print_fill(fill);
    }
    println!();
    println!(
        "{} fills, volume {}, realized PnL {}",
        fills.len(),
        volume.round_dp(2),
        realized.round_dp(2)
    );
    Ok(())
}

fn print_fill(fill: &UserFill) {
    let time = chrono::DateTime::from_timestamp_millis(fill.time)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| fill.time.to_string());
    println!(
        "{}  {:<6} {:<11} {:>12} @ {:<12} notional {:>14} pnl {:>12}",
        time,
        fill.coin,
        fill.direction_label(),
        fill.sz,
        fill.px,
        fill.notional().round_dp(2),
        fill.closed_pnl
    );
}

async fn store_fill(
    trades: &TradeService,
    hyperliquid: &HyperliquidService,
    address: &str,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes {
        let latest = hyperliquid.get_recent_fills(address, 1).await?;
        let Some(fill) = latest.first() else {
            println!("No fills found for {}", address);
            return Ok(());
        };
        print_fill(fill);
        let confirmed = Confirm::new("Store this trade?")
            .with_default(true)
            .prompt()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
        let published = trades.store_fill(fill).await?;
        print_stored_trade(trades, published).await
    } else {
        match trades.store_latest_fill(address).await? {
            Some(published) => print_stored_trade(trades, published).await,
            None => {
                println!("No fills found for {}", address);
                Ok(())
            }
        }
    }
}

async fn print_stored_trade(
    trades: &TradeService,
    published: PublishedTrade,
) -> anyhow::Result<()> {
    let trade_id = &published.entity.hyperliquid_trade.trade_id;
    println!();
    println!("Stored trade {}", trade_id);
    println!("  entity key:          {}", published.receipt.entity_key);
    println!("  expires at:          {}", published.receipt.expires_at);
    println!("  data size:           {} bytes", published.data_size);
    println!("  string annotations:  {}", published.string_annotations);
    println!("  numeric annotations: {}", published.numeric_annotations);

    let found = trades.find_trade(trade_id).await?;
    let total = trades.count_trades().await?;
    println!(
        "  queryable:           {} copies of this trade, {} trades stored",
        found.len(),
        total
    );
    Ok(())
}

async fn trade(trades: &TradeService, trade_id: &str) -> anyhow::Result<()> {
    let found = trades.find_trade(trade_id).await?;
    if found.is_empty() {
        bail!("no stored trade with id {}", trade_id);
    }
    for stored in found {
        println!("Entity {}", stored.entity_key);
        describe_trade(&stored.entity);
        println!();
    }
    Ok(())
}

fn describe_trade(entity: &CompleteTradeEntity) {
    let trade = &entity.hyperliquid_trade;
    let computed = &entity.computed;
    println!("  action:         {}", computed.human_description);
    println!("  value:          {}", computed.formatted_value);
    println!("  direction:      {}", trade.direction);
    println!("  closed PnL:     {}", trade.closed_pnl);
    println!(
        "  fee:            {} {} ({}%)",
        trade.fee_amount, trade.fee_token, computed.fee_percentage
    );
    println!("  start position: {}", trade.start_position);
    println!("  cross margin:   {}", trade.cross_margin);
    println!("  user:           {}", trade.user_address);
    println!("  executed at:    {}", computed.trade_timestamp_iso);
    println!("  stored by:      {} at {}", entity.stored_by, entity.created_at);
}

async fn positions(hyperliquid: &HyperliquidService, address: &str) -> anyhow::Result<()> {
    let positions = hyperliquid.get_user_positions(address).await?;
    if positions.is_empty() {
        println!("No open positions for {}", address);
        return Ok(());
    }
    println!(
        "{:<8} {:>6} {:>14} {:>14} {:>16}",
        "coin", "side", "size", "entry", "unrealized PnL"
    );
    for position in positions {
        println!(
            "{:<8} {:>6} {:>14} {:>14} {:>16}",
            position.coin,
            if position.is_long() { "long" } else { "short" },
            position.szi.abs(),
            position.entry_px.unwrap_or_default(),
            position.unrealized_pnl.unwrap_or_default()
        );
    }
    Ok(())
}

async fn markets(hyperliquid: &HyperliquidService) -> anyhow::Result<()> {
    let assets = hyperliquid.get_asset_metadata().await?;
    let mids = hyperliquid.get_all_mids().await?;
    for asset in &assets {
        let mid = mids
            .get(&asset.name)
            .map(|mid| mid.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} mid {:>14}  max leverage {:>3}x{}",
            asset.name,
            mid,
            asset.max_leverage,
            if asset.only_isolated { "  isolated only" } else { "" }
        );
    }
    println!("{} assets", assets.len());
    Ok(())
}

async fn ping(hyperliquid: &HyperliquidService, settings: &Settings) -> anyhow::Result<()> {
    let health = hyperliquid.get_health_status().await;
    if health.status == ApiHealth::Unhealthy {
        bail!("Hyperliquid API at {} is unreachable", settings.hyperliquid_api_url);
    }
    let mids = hyperliquid.get_all_mids().await?;
    println!(
        "Hyperliquid API healthy in {}ms, {} markets quoted",
        health.response_time_ms.unwrap_or_default(),
        mids.len()
    );
    match hyperliquid.get_global_stats().await {
        Ok(stats) => println!("Global stats: {}", stats),
        Err(e) => tracing::debug!("Global stats unavailable: {}", e),
    }
    Ok(())
}

fn describe(record: &TraderRecord) -> String {
    format!(
        "{} ({}, {}) all-time {} weekly {} monthly {}",
        record.name,
        record.platform,
        record.address,
        record.all_time_pnl,
        record.weekly_pnl,
        record.monthly_pnl
    )
}

fn format_distribution(distribution: &IndexMap<Platform, usize>) -> String {
    distribution
        .iter()
        .map(|(platform, count)| format!("{}:{}", platform, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_completeness(leaderboard: &LeaderboardSummary) {
    if leaderboard.is_complete() {
        println!(
            "Complete: {} of {} traders stored",
            leaderboard.top_performers.len(),
            leaderboard.total_traders
        );
    } else {
        println!(
            "Incomplete: {} of {} traders stored",
            leaderboard.top_performers.len(),
            leaderboard.total_traders
        );
    }
}
