//! スクレイピング関連の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `wait_time` 未指定時の待機秒数
pub const DEFAULT_WAIT_SECS: u64 = 3;

/// スクレイピングリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingRequest {
    pub url: String,
    /// CSSセレクター
    #[serde(default)]
    pub selector: Option<String>,
    /// 待機時間（秒）
    #[serde(default)]
    pub wait_time: Option<u64>,
}

impl ScrapingRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: None,
            wait_time: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_wait_time(mut self, secs: u64) -> Self {
        self.wait_time = Some(secs);
        self
    }

    pub fn wait_secs(&self) -> u64 {
        self.wait_time.unwrap_or(DEFAULT_WAIT_SECS)
    }
}

/// セレクターに一致した要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub index: usize,
    pub text: String,
    pub tag: String,
    pub class: Option<String>,
    pub id: Option<String>,
}

/// 基本/要素スクレイピングの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub success: bool,
    pub title: Option<String>,
    pub url: String,
    /// 本文テキスト（基本スクレイピングのみ）
    pub content: Option<String>,
    /// 一致した要素（要素スクレイピングのみ）
    pub elements: Option<Vec<ElementSnapshot>>,
    pub count: usize,
    pub error: Option<String>,
}

impl ScrapingResult {
    pub fn page(url: impl Into<String>, title: Option<String>, content: String) -> Self {
        Self {
            success: true,
            title,
            url: url.into(),
            content: Some(content),
            elements: None,
            count: 0,
            error: None,
        }
    }

    pub fn elements(url: impl Into<String>, title: Option<String>, elements: Vec<ElementSnapshot>) -> Self {
        Self {
            success: true,
            title,
            url: url.into(),
            count: elements.len(),
            content: None,
            elements: Some(elements),
            error: None,
        }
    }

    pub fn failure(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            success: false,
            title: None,
            url: url.into(),
            content: None,
            elements: None,
            count: 0,
            error: Some(error.to_string()),
        }
    }

    /// 要素スクレイピングの失敗（`elements` は空配列）
    pub fn elements_failure(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            elements: Some(Vec::new()),
            ..Self::failure(url, error)
        }
    }
}

/// テーブルのセル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    pub column: usize,
    pub text: String,
    pub class: Option<String>,
}

/// テーブルの行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub index: usize,
    pub cells: Vec<RawCell>,
}

/// テーブルのヘッダー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHeader {
    pub index: usize,
    pub text: String,
}

/// 選手1人分。キーはヘッダーの列番号（"0", "1", ...）で、列順を保つ
pub type PlayerRecord = serde_json::Map<String, serde_json::Value>;

/// フロントエンド向けに整形したチームスタッツ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub success: bool,
    pub team: String,
    pub total_players: usize,
    pub players: Vec<PlayerRecord>,
    pub headers: Vec<String>,
    pub error: Option<String>,
}

impl TeamStats {
    pub fn failure(team: impl Into<String>, error: impl ToString) -> Self {
        Self {
            success: false,
            team: team.into(),
            total_players: 0,
            players: Vec::new(),
            headers: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// サイト別スクレイプの生データ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamScrape {
    pub success: bool,
    pub title: Option<String>,
    pub url: String,
    pub search_term: String,
    pub headers: Vec<RawHeader>,
    pub data: Vec<RawRow>,
    pub formatted_data: Option<TeamStats>,
    pub count: usize,
    /// 診断用の本文テキスト
    pub page_content: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl TeamScrape {
    pub fn failure(url: impl Into<String>, search_term: impl Into<String>, error: impl ToString) -> Self {
        Self {
            success: false,
            title: None,
            url: url.into(),
            search_term: search_term.into(),
            headers: Vec::new(),
            data: Vec::new(),
            formatted_data: None,
            count: 0,
            page_content: None,
            scraped_at: Utc::now(),
            error: Some(error.to_string()),
        }
    }
}
