use dotenv::dotenv;
use pnl_leaderboard::{container::ServiceContainer, models::traders::sample_leaderboard, settings};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = settings::load_settings()?;
    pnl_leaderboard::init_tracing(&settings);
    let port = settings.port.unwrap_or(3000);

    if settings.environment == Some("DEV".to_string()) {
        debug!("Running in DEV environment");
    }

    let container = ServiceContainer::new(&settings).await?;

    if settings.seed_sample_data {
        let published = container
            .leaderboard_service
            .publish(&sample_leaderboard()?, Some(settings.default_date.as_str()))
            .await?;
        info!(
            "Seeded sample leaderboard for {} as {}",
            settings.default_date, published.receipt.entity_key
        );
    }

    let app = pnl_leaderboard::setup_router(container.leaderboard_service.clone());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }

    Ok(())
}
