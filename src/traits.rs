use async_trait::async_trait;

use crate::browser::Locator;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::scraping::{ElementSnapshot, RawRow};

/// ブラウザの起動
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// 新しいブラウザを起動し、空ページを1枚開いたセッションを返す
    async fn launch(&self, config: &ScraperConfig) -> Result<Box<dyn BrowserSession>, ScraperError>;
}

/// 1リクエスト分のブラウザセッション
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// URLへ移動（ロード完了まで待つ）
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    async fn title(&self) -> Result<Option<String>, ScraperError>;

    /// `<body>` の表示テキスト
    async fn body_text(&self) -> Result<String, ScraperError>;

    /// CSSセレクターに一致する要素を文書順に取得
    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementSnapshot>, ScraperError>;

    /// CSSセレクターに一致する行と、その `td` セルを取得
    async fn query_rows(&self, selector: &str) -> Result<Vec<RawRow>, ScraperError>;

    /// 要素が存在するか（待機はしない）
    async fn exists(&self, locator: &Locator) -> Result<bool, ScraperError>;

    /// 入力欄をクリアして文字列を入力し、Enterで送信
    async fn submit_text(&self, locator: &Locator, text: &str) -> Result<(), ScraperError>;

    /// PNGスクリーンショット（全体）
    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError>;

    /// リソース解放
    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}
