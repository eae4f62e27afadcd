//! HTTP API
//!
//! - `GET /`, `GET /health`
//! - `/api/users` CRUD
//! - `/api/scraping/*`

mod error;
mod health;
mod scraping;
mod users;

use std::sync::Arc;

use warp::Filter;

pub use error::{handle_rejection, ApiError, ErrorResponse};
pub use health::HealthResponse;

use crate::service::ScrapingService;
use crate::users::UserStore;

/// JSONボディの上限（バイト）
pub(crate) const JSON_BODY_LIMIT: u64 = 16 * 1024;

/// 全ルートを結合し、CORS とリクエストトレースを付ける
pub fn create_routes(
    user_store: Arc<dyn UserStore>,
    scraping_service: ScrapingService,
    cors_origins: &[String],
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let cors = warp::cors()
        .allow_origins(cors_origins.iter().map(String::as_str))
        .allow_credentials(true)
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]);

    health::routes()
        .or(users::routes(user_store))
        .or(scraping::routes(scraping_service))
        .recover(handle_rejection)
        .with(cors)
        .with(warp::trace::request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use warp::http::StatusCode;

    use crate::config::ScraperConfig;
    use crate::scraping::{BrowserScraper, SiteProfile};
    use crate::testing::{element, row, FakeLauncher, FakePage};
    use crate::users::InMemoryUserStore;

    fn instant_profile() -> SiteProfile {
        SiteProfile {
            fallback_pause_secs: 0,
            results_pause_secs: 0,
            wait_secs: 0,
            ..SiteProfile::default()
        }
    }

    fn api(
        launcher: FakeLauncher,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let scraper = BrowserScraper::new(
            Arc::new(launcher),
            ScraperConfig::default(),
            instant_profile(),
        );
        create_routes(
            Arc::new(InMemoryUserStore::new()),
            ScrapingService::new(scraper),
            &["http://localhost:3000".to_string()],
        )
    }

    fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let api = api(FakeLauncher::new());

        let res = warp::test::request().path("/").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res), json!({"status": "ok", "message": "Opta Graph API is running"}));

        let res = warp::test::request().path("/health").reply(&api).await;
        assert_eq!(body(&res)["status"], "healthy");
    }

    #[tokio::test]
    async fn test_user_crud() {
        let api = api(FakeLauncher::new());

        let res = warp::test::request()
            .method("POST")
            .path("/api/users")
            .json(&json!({"name": "alice", "email": "alice@example.com"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let created = body(&res);
        assert_eq!(created["id"], 1);

        let res = warp::test::request().path("/api/users/1").reply(&api).await;
        assert_eq!(body(&res), created);

        let res = warp::test::request()
            .method("PUT")
            .path("/api/users/1")
            .json(&json!({"email": "alice@spurs.test"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            body(&res),
            json!({"id": 1, "name": "alice", "email": "alice@spurs.test"})
        );

        let res = warp::test::request().path("/api/users").reply(&api).await;
        assert_eq!(body(&res).as_array().map(Vec::len), Some(1));

        let res = warp::test::request()
            .method("DELETE")
            .path("/api/users/1")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)["message"], "User deleted successfully");

        let res = warp::test::request().path("/api/users/1").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&res)["detail"], "User not found");
    }

    #[tokio::test]
    async fn test_missing_user_is_404() {
        let api = api(FakeLauncher::new());

        let res = warp::test::request()
            .method("PUT")
            .path("/api/users/7")
            .json(&json!({"name": "nobody"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = warp::test::request()
            .method("DELETE")
            .path("/api/users/7")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_user_body_is_422() {
        let api = api(FakeLauncher::new());
        let res = warp::test::request()
            .method("POST")
            .path("/api/users")
            .json(&json!({"name": "no email"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_scraping_status() {
        let api = api(FakeLauncher::new());
        let res = warp::test::request().path("/api/scraping").reply(&api).await;
        assert_eq!(body(&res)["message"], "Scraping endpoint is working");
    }

    #[tokio::test]
    async fn test_elements_without_selector_is_400() {
        let launcher = FakeLauncher::new();
        let api = api(launcher.clone());
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/elements")
            .json(&json!({"url": "https://example.com"}))
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&res)["detail"], "Selector is required for element scraping");
        assert_eq!(launcher.launched(), 0);
    }

    #[tokio::test]
    async fn test_elements_scrape() {
        let page = FakePage::new("Example", "")
            .with_elements("h1", vec![element(0, "Example Domain", "h1")]);
        let api = api(FakeLauncher::new().with_page("https://example.com", page));

        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/elements")
            .json(&json!({"url": "https://example.com", "selector": "h1", "wait_time": 0}))
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json = body(&res);
        assert_eq!(json["count"], 1);
        assert_eq!(json["elements"][0]["text"], "Example Domain");
        assert_eq!(json["elements"][0]["tag"], "h1");
    }

    #[tokio::test]
    async fn test_basic_scrape_failure_is_500_with_result_body() {
        let api = api(FakeLauncher::new());
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/basic")
            .json(&json!({"url": "http://unreachable.invalid", "wait_time": 0}))
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body(&res);
        assert_eq!(json["success"], false);
        assert_eq!(json["url"], "http://unreachable.invalid");
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_formatted_team_stats() {
        let site = instant_profile();
        let team_page = FakePage::new("Tottenham", "team")
            .with_rows(
                "tbody tr",
                vec![row(0, &["Son", "30"]), row(1, &["Richarlison", "25"]), row(2, &["-"])],
            )
            .with_elements("th", vec![element(0, "Player", "th"), element(1, "Apps", "th")]);
        let launcher = FakeLauncher::new()
            .with_page(&site.listing_url, FakePage::new("Stats", ""))
            .with_page(&site.fallback_url, team_page);
        let api = api(launcher);

        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/tottenham-formatted")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json = body(&res);
        assert_eq!(json["success"], true);
        assert_eq!(json["team"], "tottenham");
        assert_eq!(json["total_players"], 2);
        assert_eq!(json["players"][1], json!({"0": "Richarlison", "1": "25"}));
        assert_eq!(json["headers"], json!(["Player", "Apps"]));
    }

    #[tokio::test]
    async fn test_formatted_team_stats_failure_shape() {
        let api = api(FakeLauncher::failing_launch());
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/tottenham-formatted")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body(&res);
        assert_eq!(json["success"], false);
        assert_eq!(json["team"], "tottenham");
        assert_eq!(json["total_players"], 0);
        assert_eq!(json["players"], json!([]));
        assert_eq!(json["headers"], json!([]));
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_raw_team_stats_failure() {
        let api = api(FakeLauncher::failing_launch());
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/theanalyst-tottenham")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body(&res);
        assert_eq!(json["search_term"], "tottenham");
        assert_eq!(json["data"], json!([]));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let api = api(FakeLauncher::new());
        let res = warp::test::request()
            .method("OPTIONS")
            .path("/api/users")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let api = api(FakeLauncher::new());
        let res = warp::test::request().path("/nope").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&res)["error"], "Not Found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_time_defaults_only_when_absent() {
        let page = FakePage::new("Example Domain", "body");
        let api = api(FakeLauncher::new().with_page("https://example.com", page));

        // 0 は待機なし
        let start = tokio::time::Instant::now();
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/basic")
            .json(&json!({"url": "https://example.com", "wait_time": 0}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));

        // 未指定は3秒
        let start = tokio::time::Instant::now();
        let res = warp::test::request()
            .method("POST")
            .path("/api/scraping/basic")
            .json(&json!({"url": "https://example.com"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(start.elapsed() >= std::time::Duration::from_secs(3));
    }
}
