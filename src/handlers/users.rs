use axum::{extract::Path, Json};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CreateUser, UpdateUser, UserService};

/// POST /api/users
pub async fn create(Json(input): Json<CreateUser>) -> ApiResult<User> {
    UserService::validate_create(&input)?;
    let user = UserService::connect().await?.create_user(input).await?;
    Ok(ApiResponse::created(user))
}

/// GET /api/users/:id
pub async fn get(Path(id): Path<i64>) -> ApiResult<User> {
    let user = UserService::connect().await?.get(id).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /api/users/:id - replaces `params` and/or `max_daily_requests`
pub async fn update(Path(id): Path<i64>, Json(input): Json<UpdateUser>) -> ApiResult<User> {
    UserService::validate_params(input.params.as_ref())?;
    let user = UserService::connect().await?.update_user(id, input).await?;
    Ok(ApiResponse::success(user))
}
