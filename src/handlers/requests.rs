use axum::{extract::Path, Json};

use crate::database::models::Request;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CreateRequest, DeleteResult, RequestService, UpdateRequest};

/// POST /api/requests
pub async fn create(Json(input): Json<CreateRequest>) -> ApiResult<Request> {
    RequestService::validate_create(&input)?;
    let request = RequestService::connect().await?.create_request(input).await?;
    Ok(ApiResponse::created(request))
}

/// GET /api/requests/:id
pub async fn get(Path(id): Path<i64>) -> ApiResult<Request> {
    let request = RequestService::connect().await?.get(id).await?;
    Ok(ApiResponse::success(request))
}

/// PATCH /api/requests/:id - accepts `params` and/or `status`
pub async fn update(Path(id): Path<i64>, Json(input): Json<UpdateRequest>) -> ApiResult<Request> {
    RequestService::validate_update(&input)?;
    let request = RequestService::connect().await?.update_request(id, input).await?;
    Ok(ApiResponse::success(request))
}

/// DELETE /api/requests/:id - succeeds whether or not the row existed
pub async fn delete(Path(id): Path<i64>) -> ApiResult<DeleteResult> {
    let result = RequestService::connect().await?.delete_request(id).await?;
    Ok(ApiResponse::success(result))
}
