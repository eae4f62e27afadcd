//! テスト用のブラウザ
//!
//! URL毎にページ内容を登録しておき、実ブラウザなしでスクレイピング処理を動かす。
//! 未登録のURLへの移動はナビゲーションエラーになる。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::browser::Locator;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::scraping::{ElementSnapshot, RawCell, RawRow};
use crate::traits::{BrowserLauncher, BrowserSession};

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    title: Option<String>,
    body: String,
    elements: HashMap<String, Vec<ElementSnapshot>>,
    rows: HashMap<String, Vec<RawRow>>,
    present: Vec<Locator>,
    /// 指定回数の存在確認の後に現れる要素
    delayed: Vec<(Locator, usize)>,
    submit_target: Option<String>,
}

impl FakePage {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn with_elements(mut self, selector: &str, elements: Vec<ElementSnapshot>) -> Self {
        self.elements.insert(selector.to_string(), elements);
        self
    }

    pub fn with_rows(mut self, selector: &str, rows: Vec<RawRow>) -> Self {
        self.rows.insert(selector.to_string(), rows);
        self
    }

    pub fn with_present(mut self, locator: Locator) -> Self {
        self.present.push(locator);
        self
    }

    pub fn with_present_after(mut self, locator: Locator, checks: usize) -> Self {
        self.delayed.push((locator, checks));
        self
    }

    fn is_present(&self, locator: &Locator, checks: usize) -> bool {
        self.present.contains(locator)
            || self
                .delayed
                .iter()
                .any(|(delayed, after)| delayed == locator && checks > *after)
    }

    /// 入力送信後に遷移するURL
    pub fn with_submit_target(mut self, url: &str) -> Self {
        self.submit_target = Some(url.to_string());
        self
    }
}

pub fn element(index: usize, text: &str, tag: &str) -> ElementSnapshot {
    ElementSnapshot {
        index,
        text: text.to_string(),
        tag: tag.to_string(),
        class: None,
        id: None,
    }
}

pub fn row(index: usize, texts: &[&str]) -> RawRow {
    RawRow {
        index,
        cells: texts
            .iter()
            .enumerate()
            .map(|(column, text)| RawCell {
                column,
                text: text.to_string(),
                class: None,
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
struct Log {
    launched: usize,
    closed: usize,
    visited: Vec<String>,
    submitted: Vec<(Locator, String)>,
    presence_checks: usize,
    screenshots: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    pages: Arc<HashMap<String, FakePage>>,
    fail_launch: bool,
    log: Arc<Mutex<Log>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), page);
        self
    }

    pub fn launched(&self) -> usize {
        self.log.lock().launched
    }

    pub fn closed(&self) -> usize {
        self.log.lock().closed
    }

    pub fn visited(&self) -> Vec<String> {
        self.log.lock().visited.clone()
    }

    pub fn submitted(&self) -> Vec<(Locator, String)> {
        self.log.lock().submitted.clone()
    }

    pub fn presence_checks(&self) -> usize {
        self.log.lock().presence_checks
    }

    pub fn screenshots(&self) -> usize {
        self.log.lock().screenshots
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _config: &ScraperConfig) -> Result<Box<dyn BrowserSession>, ScraperError> {
        if self.fail_launch {
            return Err(ScraperError::BrowserInit("chromium not found".into()));
        }
        self.log.lock().launched += 1;
        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            log: self.log.clone(),
            current: Mutex::new(None),
        }))
    }
}

struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    log: Arc<Mutex<Log>>,
    current: Mutex<Option<String>>,
}

impl FakeSession {
    fn page(&self) -> Result<FakePage, ScraperError> {
        let current = self.current.lock().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .ok_or_else(|| ScraperError::Navigation("no page loaded".into()))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.log.lock().visited.push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(ScraperError::Navigation(format!(
                "{}: net::ERR_NAME_NOT_RESOLVED",
                url
            )));
        }
        *self.current.lock() = Some(url.to_string());
        Ok(())
    }

    async fn title(&self) -> Result<Option<String>, ScraperError> {
        Ok(self.page()?.title)
    }

    async fn body_text(&self) -> Result<String, ScraperError> {
        Ok(self.page()?.body)
    }

    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementSnapshot>, ScraperError> {
        Ok(self.page()?.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn query_rows(&self, selector: &str) -> Result<Vec<RawRow>, ScraperError> {
        Ok(self.page()?.rows.get(selector).cloned().unwrap_or_default())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool, ScraperError> {
        let page = self.page()?;
        let checks = {
            let mut log = self.log.lock();
            log.presence_checks += 1;
            log.presence_checks
        };
        Ok(page.is_present(locator, checks))
    }

    async fn submit_text(&self, locator: &Locator, text: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        let checks = self.log.lock().presence_checks;
        if !page.is_present(locator, checks) {
            return Err(ScraperError::ElementNotFound(locator.to_string()));
        }
        self.log
            .lock()
            .submitted
            .push((locator.clone(), text.to_string()));
        if let Some(target) = page.submit_target {
            *self.current.lock() = Some(target);
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.log.lock().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        self.log.lock().closed += 1;
        Ok(())
    }
}
