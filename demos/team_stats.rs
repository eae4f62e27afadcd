use std::sync::Arc;

use opta_graph_api::{BrowserScraper, ChromeLauncher, ScraperConfig, SiteProfile};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = ScraperConfig::from_env()
        .expect("invalid scraper environment")
        .with_headless(false) // デバッグ用に表示モード
        .with_debug(true);

    let scraper = BrowserScraper::new(Arc::new(ChromeLauncher::new()), config, SiteProfile::default());

    println!("=== Team Stats Scrape Test ===");

    let result = scraper.scrape_team_stats(15).await;
    if !result.success {
        eprintln!("エラー: {}", result.error.unwrap_or_default());
        return;
    }

    match result.formatted_data {
        Some(stats) => {
            println!("headers: {}", stats.headers.join(" | "));
            for player in &stats.players {
                let cells: Vec<&str> = player.values().filter_map(|v| v.as_str()).collect();
                println!("  {}", cells.join(" | "));
            }
            println!("選手数: {}", stats.total_players);
        }
        None => println!("整形データなし"),
    }
}
