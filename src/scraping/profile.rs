use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::browser::Locator;
use crate::error::ScraperError;

/// サイト別スクレイプの手順
///
/// 各セレクターリストは先頭から順に試し、最初に一致したものを使う。
/// サイトのDOM変更にはリストへの追加で対応する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// 結果に載せるチーム識別子
    pub team: String,
    /// 最初に開く一覧ページ
    pub listing_url: String,
    /// 検索欄が見つからない場合に直接開くページ
    pub fallback_url: String,
    pub search_term: String,
    pub search_locators: Vec<Locator>,
    pub row_selectors: Vec<String>,
    pub header_selectors: Vec<String>,
    /// フォールバックページを開いた後の待機（秒）
    pub fallback_pause_secs: u64,
    /// 検索結果の読み込み待機（秒）
    pub results_pause_secs: u64,
    /// 検索欄の出現を待つ上限（秒）
    pub wait_secs: u64,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::theanalyst_tottenham()
    }
}

impl SiteProfile {
    /// theanalyst.com のプレミアリーグ選手スタッツ（Tottenham）
    pub fn theanalyst_tottenham() -> Self {
        Self {
            team: "tottenham".to_string(),
            listing_url: "https://theanalyst.com/competition/premier-league/stats".to_string(),
            fallback_url: "https://theanalyst.com/team/premier-league/tottenham".to_string(),
            search_term: "tottenham".to_string(),
            search_locators: [
                "//input[contains(@placeholder, 'Search by player or team')]",
                "//input[contains(@placeholder, 'Search')]",
                "//input[@type='search']",
                "//input[contains(@class, 'search')]",
                "input[placeholder*='Search']",
                "input[type='search']",
            ]
            .into_iter()
            .map(Locator::parse)
            .collect(),
            row_selectors: strings(&[
                ".TableNew-module_data-table__Noo6s tbody tr",
                "table tbody tr",
                "[data-testid='player-stats-table'] tbody tr",
                ".stats-table tbody tr",
                "tbody tr",
            ]),
            header_selectors: strings(&[
                ".TableNew-module_data-table__Noo6s thead th",
                "table thead th",
                "thead th",
                "th",
            ]),
            fallback_pause_secs: 5,
            results_pause_secs: 8,
            wait_secs: 15,
        }
    }

    /// JSONファイルから読み込む。省略したキーは既定値
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScraperError::Config(format!("site profile {:?}: {}", path, e)))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
