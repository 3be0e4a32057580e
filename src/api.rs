//! HTTP API
//!
//! Serves the add and search tools as JSON endpoints:
//!
//! - `GET /` greeting
//! - `POST /add_establishment/` with `{"name": ...}`
//! - `POST /search_establishments/` with `{"term": ...}`

use crate::cli::{AddArgs, SearchArgs};
use crate::error::AppError;
use crate::tools::{add, search, with_deadline, Services};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the router over shared services
pub fn router(services: Arc<Services>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/add_establishment/", post(add_establishment))
        .route("/search_establishments/", post(search_establishments))
        .with_state(services)
}

/// Bind and serve until the process is stopped
pub async fn serve(services: Arc<Services>, bind: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to bind {}: {}", bind, e)))?;
    info!("eatlist HTTP API listening on {}", bind);

    axum::serve(listener, router(services))
        .await
        .map_err(|e| AppError::Internal(format!("HTTP server error: {}", e)))
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AppError::ProviderError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({"message": "eatlist: add a place by name, then search for it"}))
}

async fn add_establishment(State(services): State<Arc<Services>>, Json(args): Json<AddArgs>) -> Response {
    match with_deadline("Add", add::execute_add(args, &services)).await {
        Ok(_) => Json(json!({"status": "success"})).into_response(),
        Err(e) => {
            warn!("Add failed: {}", e);
            (
                status_for(&e),
                Json(json!({"status": "failed", "error": e.error_code(), "message": e.message()})),
            )
                .into_response()
        }
    }
}

async fn search_establishments(
    State(services): State<Arc<Services>>,
    Json(args): Json<SearchArgs>,
) -> Response {
    match with_deadline("Search", search::execute_search(args, &services)).await {
        Ok(result) => Json(json!({"result": result})).into_response(),
        Err(e) => {
            warn!("Search failed: {}", e);
            (
                status_for(&e),
                Json(json!({"result": null, "error": e.error_code(), "message": e.message()})),
            )
                .into_response()
        }
    }
}
