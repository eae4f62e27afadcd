use std::sync::Arc;

use opta_graph_api::api;
use opta_graph_api::{AppConfig, BrowserScraper, ChromeLauncher, InMemoryUserStore, ScrapingService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,opta_graph_api=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let addr = config.server.addr()?;

    info!(
        "Site profile: team={}, listing={}",
        config.site.team, config.site.listing_url
    );

    let scraper = BrowserScraper::new(Arc::new(ChromeLauncher::new()), config.scraper, config.site);
    let routes = api::create_routes(
        Arc::new(InMemoryUserStore::new()),
        ScrapingService::new(scraper),
        &config.server.cors_origins,
    );

    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
    })?;
    info!("Opta Graph API listening on http://{}", bound);
    server.await;

    Ok(())
}
