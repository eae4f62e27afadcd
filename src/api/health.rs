use serde::{Deserialize, Serialize};
use warp::Filter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn new(status: &str, message: &str) -> Self {
        Self {
            status: status.to_string(),
            message: message.to_string(),
        }
    }
}

/// `GET /` と `GET /health`
pub fn routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let root = warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse::new("ok", "Opta Graph API is running"))
    });

    let health = warp::path!("health").and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse::new("healthy", "API is operational"))
    });

    root.or(health)
}
