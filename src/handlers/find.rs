use axum::Json;

use crate::database::models::{Request, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RequestService, RequestsQuery, UserService, UsersQuery};

/// POST /api/find/users - filtered user listing
///
/// Body: `{"username": "...", "search": "...", "params_filter": [{"key", "operator", "value"}]}`.
/// Every field is optional; an unknown operator is rejected with 400 before
/// the database is touched.
pub async fn find_users(Json(query): Json<UsersQuery>) -> ApiResult<Vec<User>> {
    let qb = UserService::build_query(&query)?;
    let users = UserService::connect().await?.find(qb).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/find/requests - filtered request listing
pub async fn find_requests(Json(query): Json<RequestsQuery>) -> ApiResult<Vec<Request>> {
    let qb = RequestService::build_query(&query)?;
    let requests = RequestService::connect().await?.find(qb).await?;
    Ok(ApiResponse::success(requests))
}
