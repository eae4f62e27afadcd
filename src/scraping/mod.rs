//! スクレイピングモジュール
//!
//! 汎用のページ/要素取得と、サイト別のスタッツ取得・整形を行う

mod format;
mod profile;
mod scraper;
mod types;

pub use format::format_team_stats;
pub use profile::SiteProfile;
pub use scraper::BrowserScraper;
pub use types::{
    ElementSnapshot, PlayerRecord, RawCell, RawHeader, RawRow, ScrapingRequest, ScrapingResult,
    TeamScrape, TeamStats, DEFAULT_WAIT_SECS,
};
