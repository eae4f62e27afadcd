//! ブラウザを使ったスクレイピング
//!
//! 各操作は1回の呼び出しでブラウザを起動し、成功・失敗に関わらず終了してから返る。
//! 呼び出し側が future を途中で破棄した場合も、ブラウザはバックグラウンドで終了する。
//! 失敗は `success: false` の結果に変換し、エラーとしては返さない。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::format::format_team_stats;
use super::profile::SiteProfile;
use super::types::{RawHeader, RawRow, ScrapingResult, TeamScrape};
use crate::browser::Locator;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{BrowserLauncher, BrowserSession};

/// 基本スクレイピングで返す本文の最大文字数
const CONTENT_PREVIEW_CHARS: usize = 1000;
/// サイト別スクレイプで返す診断用本文の最大文字数
const PAGE_CONTENT_CHARS: usize = 2000;
/// 要素出現待ちのポーリング間隔（ミリ秒）
const PRESENCE_POLL_INTERVAL_MS: u64 = 500;

#[derive(Clone)]
pub struct BrowserScraper {
    launcher: Arc<dyn BrowserLauncher>,
    config: ScraperConfig,
    site: SiteProfile,
}

impl BrowserScraper {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: ScraperConfig, site: SiteProfile) -> Self {
        Self {
            launcher,
            config,
            site,
        }
    }

    pub fn site(&self) -> &SiteProfile {
        &self.site
    }

    /// タイトルと本文先頭を取得
    pub async fn scrape_basic(&self, url: &str, wait_secs: u64) -> ScrapingResult {
        info!("Basic scrape: url={}, wait={}s", url, wait_secs);

        let session = match self.launcher.launch(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Basic scrape failed: {}", e);
                return ScrapingResult::failure(url, e);
            }
        };

        let session = SessionGuard::new(session);
        let outcome = basic_on(&session, url, wait_secs).await;
        session.release().await;

        outcome.unwrap_or_else(|e| {
            warn!("Basic scrape failed: {}", e);
            ScrapingResult::failure(url, e)
        })
    }

    /// CSSセレクターに一致する要素を取得
    pub async fn scrape_elements(&self, url: &str, selector: &str, wait_secs: u64) -> ScrapingResult {
        info!(
            "Element scrape: url={}, selector={}, wait={}s",
            url, selector, wait_secs
        );

        let session = match self.launcher.launch(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Element scrape failed: {}", e);
                return ScrapingResult::elements_failure(url, e);
            }
        };

        let session = SessionGuard::new(session);
        let outcome = elements_on(&session, url, selector, wait_secs).await;
        session.release().await;

        outcome.unwrap_or_else(|e| {
            warn!("Element scrape failed: {}", e);
            ScrapingResult::elements_failure(url, e)
        })
    }

    /// サイト別スクレイプ（検索 → テーブル取得 → 整形）
    ///
    /// `wait_secs` は検索欄1候補あたりの出現待ち上限。途中で失敗した場合は
    /// 取得済みのデータも含めず失敗結果を返す。
    pub async fn scrape_team_stats(&self, wait_secs: u64) -> TeamScrape {
        let site = &self.site;
        info!(
            "Team stats scrape: team={}, url={}, wait={}s",
            site.team, site.listing_url, wait_secs
        );

        let session = match self.launcher.launch(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Team stats scrape failed: {}", e);
                return TeamScrape::failure(&site.listing_url, &site.search_term, e);
            }
        };

        let session = SessionGuard::new(session);
        let outcome = team_stats_on(&session, site, wait_secs).await;
        if outcome.is_err() && self.config.debug {
            if let Ok(page) = session.get() {
                log_screenshot(page).await;
            }
        }
        session.release().await;

        match outcome {
            Ok(result) => {
                info!(
                    "Team stats scrape completed: rows={}, headers={}, players={}",
                    result.count,
                    result.headers.len(),
                    result
                        .formatted_data
                        .as_ref()
                        .map(|f| f.total_players)
                        .unwrap_or(0)
                );
                result
            }
            Err(e) => {
                warn!("Team stats scrape failed: {}", e);
                TeamScrape::failure(&site.listing_url, &site.search_term, e)
            }
        }
    }
}

/// 起動済みセッションの所有者
///
/// `release` されずに drop された場合（リクエストのキャンセルやタイムアウト）は
/// tokio ランタイム上で `close` を実行する。
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn get(&self) -> Result<&dyn BrowserSession, ScraperError> {
        self.session
            .as_deref()
            .ok_or_else(|| ScraperError::BrowserInit("session already released".into()))
    }

    async fn release(mut self) {
        if let Some(session) = self.session.take() {
            close_session(session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Scrape cancelled, closing browser in background");
                handle.spawn(close_session(session));
            }
            // ランタイム外では Browser の drop でプロセスだけ終了する
            Err(_) => warn!("Scrape cancelled outside runtime, dropping browser"),
        }
    }
}

async fn close_session(session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }
}

async fn basic_on(
    session: &SessionGuard,
    url: &str,
    wait_secs: u64,
) -> Result<ScrapingResult, ScraperError> {
    let page = session.get()?;
    page.navigate(url).await?;
    sleep(Duration::from_secs(wait_secs)).await;

    let title = page.title().await?;
    let body = page.body_text().await?;

    Ok(ScrapingResult::page(
        url,
        title,
        truncate_chars(&body, CONTENT_PREVIEW_CHARS),
    ))
}

async fn elements_on(
    session: &SessionGuard,
    url: &str,
    selector: &str,
    wait_secs: u64,
) -> Result<ScrapingResult, ScraperError> {
    let page = session.get()?;
    page.navigate(url).await?;
    sleep(Duration::from_secs(wait_secs)).await;

    let title = page.title().await?;
    let elements = page.query_elements(selector).await?;
    debug!("{} elements matched {}", elements.len(), selector);

    Ok(ScrapingResult::elements(url, title, elements))
}

async fn team_stats_on(
    session: &SessionGuard,
    site: &SiteProfile,
    wait_secs: u64,
) -> Result<TeamScrape, ScraperError> {
    let page = session.get()?;
    page.navigate(&site.listing_url).await?;

    // 検索欄
    let timeout = Duration::from_secs(wait_secs);
    match first_present(page, &site.search_locators, timeout).await {
        Some(locator) => {
            info!("Search input found: {}", locator);
            page.submit_text(locator, &site.search_term).await?;
        }
        None => {
            info!(
                "Search input not found, opening {} directly",
                site.fallback_url
            );
            page.navigate(&site.fallback_url).await?;
            sleep(Duration::from_secs(site.fallback_pause_secs)).await;
        }
    }

    // 検索結果の読み込み待機
    sleep(Duration::from_secs(site.results_pause_secs)).await;

    let rows = first_rows(page, &site.row_selectors).await?;
    let headers = first_headers(page, &site.header_selectors).await?;

    let page_content = truncate_chars(&page.body_text().await?, PAGE_CONTENT_CHARS);
    let formatted = format_team_stats(&site.team, &headers, &rows);
    let title = page.title().await?;

    Ok(TeamScrape {
        success: true,
        title,
        url: site.listing_url.clone(),
        search_term: site.search_term.clone(),
        count: rows.len(),
        headers,
        data: rows,
        formatted_data: Some(formatted),
        page_content: Some(page_content),
        scraped_at: chrono::Utc::now(),
        error: None,
    })
}

/// 候補を順に待ち、最初に出現したものを返す
async fn first_present<'a>(
    page: &dyn BrowserSession,
    locators: &'a [Locator],
    timeout: Duration,
) -> Option<&'a Locator> {
    for locator in locators {
        match wait_for_presence(page, locator, timeout).await {
            Ok(true) => return Some(locator),
            Ok(false) => debug!("Not present within {:?}: {}", timeout, locator),
            Err(e) => debug!("Presence check failed for {}: {}", locator, e),
        }
    }
    None
}

/// タイムアウトまでポーリング。最低1回は確認する
async fn wait_for_presence(
    page: &dyn BrowserSession,
    locator: &Locator,
    timeout: Duration,
) -> Result<bool, ScraperError> {
    let start = Instant::now();
    let interval = Duration::from_millis(PRESENCE_POLL_INTERVAL_MS);

    loop {
        if page.exists(locator).await? {
            return Ok(true);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(false);
        }
        sleep(interval.min(timeout - elapsed)).await;
    }
}

async fn first_rows(page: &dyn BrowserSession, selectors: &[String]) -> Result<Vec<RawRow>, ScraperError> {
    for selector in selectors {
        let rows = page.query_rows(selector).await?;
        if !rows.is_empty() {
            info!("{} rows matched {}", rows.len(), selector);
            return Ok(rows);
        }
        debug!("No rows matched {}", selector);
    }
    warn!("No row selector matched");
    Ok(Vec::new())
}

async fn first_headers(
    page: &dyn BrowserSession,
    selectors: &[String],
) -> Result<Vec<RawHeader>, ScraperError> {
    for selector in selectors {
        let cells = page.query_elements(selector).await?;
        if !cells.is_empty() {
            info!("{} headers matched {}", cells.len(), selector);
            return Ok(cells
                .into_iter()
                .enumerate()
                .map(|(index, cell)| RawHeader {
                    index,
                    text: cell.text,
                })
                .collect());
        }
        debug!("No headers matched {}", selector);
    }
    warn!("No header selector matched");
    Ok(Vec::new())
}

/// デバッグスクリーンショット
async fn log_screenshot(page: &dyn BrowserSession) {
    match page.screenshot().await {
        Ok(png) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
            debug!("Failure screenshot: data:image/png;base64,{}", encoded);
        }
        Err(e) => debug!("Failed to capture screenshot: {}", e),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
