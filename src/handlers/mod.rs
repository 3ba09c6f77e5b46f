// handlers/mod.rs - HTTP surface of the admin backend
//
// /                      service banner
// /health                database liveness
// /api/find/{users,requests}   filtered listings (params_filter)
// /api/users[/:id]       user create/get/update
// /api/requests[/:id]    request create/get/update/delete
pub mod find;
pub mod requests;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::CONFIG;
use crate::database::manager::DatabaseManager;

pub fn router() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(find_routes())
        .merge(user_routes())
        .merge(request_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(CONFIG.api.max_request_size_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn find_routes() -> Router {
    Router::new()
        .route("/api/find/users", post(find::find_users))
        .route("/api/find/requests", post(find::find_requests))
}

fn user_routes() -> Router {
    Router::new()
        .route("/api/users", post(users::create))
        .route("/api/users/:id", get(users::get).patch(users::update))
}

fn request_routes() -> Router {
    Router::new()
        .route("/api/requests", post(requests::create))
        .route(
            "/api/requests/:id",
            get(requests::get).patch(requests::update).delete(requests::delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "External AIS",
            "version": version,
            "description": "Admin backend for users and their requests",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "find": "/api/find/users, /api/find/requests (POST, params_filter)",
                "users": "/api/users[/:id]",
                "requests": "/api/requests[/:id]",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
