//! chromiumoxide によるブラウザセッション実装

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::locator::{js_string, Locator};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::scraping::{ElementSnapshot, RawRow};
use crate::traits::{BrowserLauncher, BrowserSession};

/// リクエスト毎に Chromium を起動するランチャー
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, config: &ScraperConfig) -> Result<Box<dyn BrowserSession>, ScraperError> {
        info!("Launching browser...");

        // 同時リクエストでプロファイルが衝突しないようにユニークなディレクトリを使う
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("opta-graph-{}", unique_id));

        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(width, height)
            .request_timeout(config.request_timeout);

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        for arg in &config.args {
            builder = builder.arg(arg.as_str());
        }
        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };

        info!("Browser launched");
        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler_task,
            user_data_dir,
        }))
    }
}

#[derive(Deserialize)]
struct BodyText {
    text: Option<String>,
}

/// Chromium 1プロセス + 1ページ
///
/// `close` されずに drop された場合も `Browser` の drop で子プロセスは終了する。
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl ChromeSession {
    async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T, ScraperError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| ScraperError::Extraction(e.to_string()))
    }

    async fn find(&self, locator: &Locator) -> Result<Element, ScraperError> {
        let found = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await,
            Locator::XPath(xpath) => self.page.find_xpath(xpath.as_str()).await,
        };
        found.map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", locator, e)))
    }
}

/// 移動後の URL を確認する
///
/// 名前解決失敗などは CDP エラーにならず Chromium のエラーページとして表示される。
/// URL を取得できなかった場合は判定せず成功扱いにする。
fn check_landing(url: &str, location: Result<String, ScraperError>) -> Result<(), ScraperError> {
    match location {
        Ok(location) if location.starts_with("chrome-error://") => Err(ScraperError::Navigation(
            format!("{}: page failed to load", url),
        )),
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Could not read location after navigating to {}: {}", url, e);
            Ok(())
        }
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        let location = self.eval::<String>("window.location.href").await;
        check_landing(url, location)
    }

    async fn title(&self) -> Result<Option<String>, ScraperError> {
        self.page
            .get_title()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn body_text(&self) -> Result<String, ScraperError> {
        // null を直接返すと値なし扱いになるのでオブジェクトで包む
        let body: BodyText = self
            .eval("({ text: document.body ? document.body.innerText : null })")
            .await?;
        body.text
            .ok_or_else(|| ScraperError::ElementNotFound("body".into()))
    }

    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementSnapshot>, ScraperError> {
        let script = format!(
            r#"
            (() => {{
                const nodes = Array.from(document.querySelectorAll({}));
                return nodes.map((el, index) => ({{
                    index: index,
                    text: (el.innerText || '').trim(),
                    tag: el.tagName.toLowerCase(),
                    class: el.getAttribute('class'),
                    id: el.getAttribute('id')
                }}));
            }})()
            "#,
            js_string(selector)
        );
        self.eval(&script).await
    }

    async fn query_rows(&self, selector: &str) -> Result<Vec<RawRow>, ScraperError> {
        let script = format!(
            r#"
            (() => {{
                const rows = Array.from(document.querySelectorAll({}));
                return rows.map((row, index) => ({{
                    index: index,
                    cells: Array.from(row.querySelectorAll('td')).map((cell, column) => ({{
                        column: column,
                        text: (cell.innerText || '').trim(),
                        class: cell.getAttribute('class')
                    }}))
                }}));
            }})()
            "#,
            js_string(selector)
        );
        self.eval(&script).await
    }

    async fn exists(&self, locator: &Locator) -> Result<bool, ScraperError> {
        self.eval(&locator.presence_script()).await
    }

    async fn submit_text(&self, locator: &Locator, text: &str) -> Result<(), ScraperError> {
        let element = self.find(locator).await?;

        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| ScraperError::JavaScript(format!("clear {}: {}", locator, e)))?;
        element
            .click()
            .await
            .map_err(|e| ScraperError::JavaScript(format!("focus {}: {}", locator, e)))?;
        element
            .type_str(text)
            .await
            .map_err(|e| ScraperError::JavaScript(format!("type {}: {}", locator, e)))?;
        element
            .press_key("Enter")
            .await
            .map_err(|e| ScraperError::JavaScript(format!("submit {}: {}", locator, e)))?;

        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError> {
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        info!("Closing browser...");
        let ChromeSession {
            mut browser,
            page,
            handler_task,
            user_data_dir,
        } = *self;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::BrowserInit(format!("close: {}", e)));
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser process: {}", e);
        }
        handler_task.abort();

        if let Err(e) = std::fs::remove_dir_all(&user_data_dir) {
            debug!("Failed to remove {:?}: {}", user_data_dir, e);
        }

        info!("Browser closed");
        closed
    }
}
