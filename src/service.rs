use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::error::ScraperError;
use crate::scraping::{BrowserScraper, ScrapingRequest, ScrapingResult, TeamScrape};

/// スクレイピングジョブ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeJob {
    Basic {
        url: String,
        wait_secs: u64,
    },
    Elements {
        url: String,
        selector: String,
        wait_secs: u64,
    },
    TeamStats {
        wait_secs: u64,
    },
}

impl ScrapeJob {
    pub fn basic(req: ScrapingRequest) -> Self {
        let wait_secs = req.wait_secs();
        ScrapeJob::Basic {
            url: req.url,
            wait_secs,
        }
    }

    /// セレクター未指定（空文字含む）はエラー
    pub fn elements(req: ScrapingRequest) -> Result<Self, ScraperError> {
        let wait_secs = req.wait_secs();
        match req.selector {
            Some(selector) if !selector.is_empty() => Ok(ScrapeJob::Elements {
                url: req.url,
                selector,
                wait_secs,
            }),
            _ => Err(ScraperError::MissingSelector),
        }
    }

    pub fn team_stats(wait_secs: u64) -> Self {
        ScrapeJob::TeamStats { wait_secs }
    }
}

/// スクレイピング結果
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Page(ScrapingResult),
    Team(TeamScrape),
}

impl ScrapeOutcome {
    pub fn success(&self) -> bool {
        match self {
            ScrapeOutcome::Page(result) => result.success,
            ScrapeOutcome::Team(result) => result.success,
        }
    }
}

/// tower::Serviceを実装したスクレイパーサービス
///
/// 失敗は結果の `success: false` で表すため `Error` は発生しない。
#[derive(Clone)]
pub struct ScrapingService {
    scraper: BrowserScraper,
}

impl ScrapingService {
    pub fn new(scraper: BrowserScraper) -> Self {
        Self { scraper }
    }

    pub fn scraper(&self) -> &BrowserScraper {
        &self.scraper
    }
}

impl Service<ScrapeJob> for ScrapingService {
    type Response = ScrapeOutcome;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, job: ScrapeJob) -> Self::Future {
        info!("スクレイピングリクエスト受信: {:?}", job);
        let scraper = self.scraper.clone();

        Box::pin(async move {
            let outcome = match job {
                ScrapeJob::Basic { url, wait_secs } => {
                    ScrapeOutcome::Page(scraper.scrape_basic(&url, wait_secs).await)
                }
                ScrapeJob::Elements {
                    url,
                    selector,
                    wait_secs,
                } => ScrapeOutcome::Page(scraper.scrape_elements(&url, &selector, wait_secs).await),
                ScrapeJob::TeamStats { wait_secs } => {
                    ScrapeOutcome::Team(scraper.scrape_team_stats(wait_secs).await)
                }
            };

            info!("スクレイピング完了: success={}", outcome.success());
            Ok(outcome)
        })
    }
}
