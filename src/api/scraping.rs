//! `/api/scraping/*`
//!
//! 結果ボディは成功・失敗とも同じスキーマ。失敗時（`success: false`）は 500 で返す。

use serde_json::json;
use tower::ServiceExt;
use warp::http::StatusCode;
use warp::Filter;

use super::error::ApiError;
use super::JSON_BODY_LIMIT;
use crate::scraping::{ScrapingRequest, TeamStats, DEFAULT_WAIT_SECS};
use crate::service::{ScrapeJob, ScrapeOutcome, ScrapingService};

/// スモークテストの対象URL
const SMOKE_TEST_URL: &str = "https://www.google.com";

fn status_for(success: bool) -> StatusCode {
    if success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn run(service: ScrapingService, job: ScrapeJob) -> ScrapeOutcome {
    service.oneshot(job).await.unwrap_or_else(|never| match never {})
}

fn outcome_reply(outcome: ScrapeOutcome) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = status_for(outcome.success());
    let body = match &outcome {
        ScrapeOutcome::Page(result) => warp::reply::json(result),
        ScrapeOutcome::Team(result) => warp::reply::json(result),
    };
    warp::reply::with_status(body, status)
}

pub async fn scrape_basic(
    req: ScrapingRequest,
    service: ScrapingService,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(outcome_reply(run(service, ScrapeJob::basic(req)).await))
}

pub async fn scrape_elements(
    req: ScrapingRequest,
    service: ScrapingService,
) -> Result<impl warp::Reply, warp::Rejection> {
    let job = ScrapeJob::elements(req).map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    Ok(outcome_reply(run(service, job).await))
}

pub async fn smoke_test(service: ScrapingService) -> Result<impl warp::Reply, warp::Rejection> {
    let job = ScrapeJob::Basic {
        url: SMOKE_TEST_URL.to_string(),
        wait_secs: DEFAULT_WAIT_SECS,
    };
    Ok(outcome_reply(run(service, job).await))
}

pub async fn team_stats_raw(service: ScrapingService) -> Result<impl warp::Reply, warp::Rejection> {
    let wait_secs = service.scraper().site().wait_secs;
    Ok(outcome_reply(run(service, ScrapeJob::team_stats(wait_secs)).await))
}

pub async fn team_stats_formatted(
    service: ScrapingService,
) -> Result<impl warp::Reply, warp::Rejection> {
    let team = service.scraper().site().team.clone();
    let wait_secs = service.scraper().site().wait_secs;

    let stats = match run(service, ScrapeJob::team_stats(wait_secs)).await {
        ScrapeOutcome::Team(result) => match (result.success, result.formatted_data) {
            (true, Some(formatted)) => formatted,
            _ => TeamStats::failure(
                &team,
                result
                    .error
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            ),
        },
        ScrapeOutcome::Page(_) => {
            return Err(warp::reject::custom(ApiError::Internal(
                "unexpected scrape outcome".to_string(),
            )))
        }
    };

    let status = status_for(stats.success);
    Ok(warp::reply::with_status(warp::reply::json(&stats), status))
}

pub fn routes(
    service: ScrapingService,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map(move || service.clone());

    let status = warp::path!("api" / "scraping").and(warp::get()).map(|| {
        warp::reply::json(&json!({
            "status": "ok",
            "message": "Scraping endpoint is working"
        }))
    });

    let basic = warp::path!("api" / "scraping" / "basic")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(scrape_basic);

    let elements = warp::path!("api" / "scraping" / "elements")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(scrape_elements);

    let test = warp::path!("api" / "scraping" / "test")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(smoke_test);

    let raw = warp::path!("api" / "scraping" / "theanalyst-tottenham")
        .and(warp::post())
        .and(service_filter.clone())
        .and_then(team_stats_raw);

    let formatted = warp::path!("api" / "scraping" / "tottenham-formatted")
        .and(warp::post())
        .and(service_filter)
        .and_then(team_stats_formatted);

    status
        .or(basic)
        .or(elements)
        .or(test)
        .or(raw)
        .or(formatted)
}
