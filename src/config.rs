//! 設定
//!
//! 環境変数（`.env` 可）から読み込む。ブラウザ起動設定、HTTPサーバー設定、
//! サイト別スクレイプ手順（[`SiteProfile`]）の3つで構成される。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScraperError;
use crate::scraping::SiteProfile;

/// Chromium に渡す既定フラグ
const DEFAULT_BROWSER_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-plugins",
    "--disable-images",
    "--disable-background-timer-throttling",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
];

/// ブラウザ起動設定
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub window_size: (u32, u32),
    /// CDPリクエストタイムアウト
    pub request_timeout: Duration,
    pub no_sandbox: bool,
    pub args: Vec<String>,
    /// 失敗時のスクリーンショットをログ出力する
    pub debug: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            window_size: (1920, 1080),
            request_timeout: Duration::from_secs(60),
            no_sandbox: true,
            args: DEFAULT_BROWSER_ARGS.iter().map(|s| s.to_string()).collect(),
            debug: false,
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// `CHROME_PATH` / `CHROMIUM_PATH` / `SCRAPER_HEADLESS` / `SCRAPER_DEBUG`
    pub fn from_env() -> Result<Self, ScraperError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CHROME_PATH").or_else(|_| std::env::var("CHROMIUM_PATH")) {
            config.chrome_executable = Some(PathBuf::from(path));
        }
        if let Some(headless) = env_bool("SCRAPER_HEADLESS")? {
            config.headless = headless;
        }
        if let Some(debug) = env_bool("SCRAPER_DEBUG")? {
            config.debug = debug;
        }

        Ok(config)
    }
}

/// HTTPサーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, ScraperError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ScraperError::Config(format!("listen address: {}", e)))
    }

    /// `HOST` / `PORT` / `CORS_ORIGINS`（カンマ区切り）
    pub fn from_env() -> Result<Self, ScraperError> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ScraperError::Config(format!("PORT={}: {}", port, e)))?;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.cors_origins = parse_list(&origins);
        }
        for origin in &config.cors_origins {
            validate_origin(origin)?;
        }

        Ok(config)
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub site: SiteProfile,
}

impl AppConfig {
    /// 環境変数から読み込む。`SITE_PROFILE_PATH` があればJSONのサイト手順を使う
    pub fn from_env() -> Result<Self, ScraperError> {
        let site = match std::env::var("SITE_PROFILE_PATH") {
            Ok(path) => SiteProfile::load(path)?,
            Err(_) => SiteProfile::default(),
        };

        Ok(Self {
            server: ServerConfig::from_env()?,
            scraper: ScraperConfig::from_env()?,
            site,
        })
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, ScraperError> {
    match std::env::var(key) {
        Ok(value) => parse_bool(&value)
            .map(Some)
            .ok_or_else(|| ScraperError::Config(format!("{}={} is not a boolean", key, value))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `scheme://host[:port]` 形式か確認する
fn validate_origin(origin: &str) -> Result<(), ScraperError> {
    let uri: warp::http::Uri = origin
        .parse()
        .map_err(|e| ScraperError::Config(format!("CORS origin {}: {}", origin, e)))?;
    match (uri.scheme(), uri.host(), uri.path()) {
        (Some(_), Some(_), "" | "/") => Ok(()),
        _ => Err(ScraperError::Config(format!(
            "CORS origin {} must be scheme://host[:port]",
            origin
        ))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
