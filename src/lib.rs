//! Opta Graph API
//!
//! - メモリ上のユーザーCRUD
//! - ヘッドレスChromeによるページ/要素スクレイピング
//! - theanalyst.com のチーム別選手スタッツ取得と整形
//!
//! # 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use opta_graph_api::{BrowserScraper, ChromeLauncher, ScraperConfig, SiteProfile};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scraper = BrowserScraper::new(
//!         Arc::new(ChromeLauncher::new()),
//!         ScraperConfig::new().with_headless(false),
//!         SiteProfile::default(),
//!     );
//!
//!     let result = scraper.scrape_team_stats(15).await;
//!     println!("players: {:?}", result.formatted_data.map(|f| f.total_players));
//! }
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod scraping;
pub mod service;
pub mod traits;
pub mod users;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use browser::{ChromeLauncher, Locator};
pub use config::{AppConfig, ScraperConfig, ServerConfig};
pub use error::ScraperError;
pub use scraping::{
    BrowserScraper, ScrapingRequest, ScrapingResult, SiteProfile, TeamScrape, TeamStats,
};
pub use service::{ScrapeJob, ScrapeOutcome, ScrapingService};
pub use traits::{BrowserLauncher, BrowserSession};
pub use users::{InMemoryUserStore, User, UserStore};
