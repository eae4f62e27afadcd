//! `/api/users` CRUD

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use warp::Filter;

use super::error::ApiError;
use super::JSON_BODY_LIMIT;
use crate::users::{NewUser, UserPatch, UserStore};

const USER_NOT_FOUND: &str = "User not found";

fn not_found() -> warp::Rejection {
    warp::reject::custom(ApiError::NotFound(USER_NOT_FOUND.to_string()))
}

pub async fn list_users(store: Arc<dyn UserStore>) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&store.list()))
}

pub async fn create_user(
    user: NewUser,
    store: Arc<dyn UserStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let created = store.create(user);
    info!("User created: id={}", created.id);
    Ok(warp::reply::json(&created))
}

pub async fn get_user(id: u64, store: Arc<dyn UserStore>) -> Result<impl warp::Reply, warp::Rejection> {
    store
        .get(id)
        .map(|user| warp::reply::json(&user))
        .ok_or_else(not_found)
}

pub async fn update_user(
    id: u64,
    patch: UserPatch,
    store: Arc<dyn UserStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let updated = store.update(id, patch).ok_or_else(not_found)?;
    info!("User updated: id={}", id);
    Ok(warp::reply::json(&updated))
}

pub async fn delete_user(id: u64, store: Arc<dyn UserStore>) -> Result<impl warp::Reply, warp::Rejection> {
    if !store.delete(id) {
        return Err(not_found());
    }
    info!("User deleted: id={}", id);
    Ok(warp::reply::json(&json!({ "message": "User deleted successfully" })))
}

pub fn routes(
    store: Arc<dyn UserStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());

    let list = warp::path!("api" / "users")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(list_users);

    let create = warp::path!("api" / "users")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(create_user);

    let get = warp::path!("api" / "users" / u64)
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_user);

    let update = warp::path!("api" / "users" / u64)
        .and(warp::put())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(update_user);

    let delete = warp::path!("api" / "users" / u64)
        .and(warp::delete())
        .and(store_filter)
        .and_then(delete_user);

    list.or(create).or(get).or(update).or(delete)
}
