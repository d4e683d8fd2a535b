// handlers/public/mod.rs - Public handlers (no principal required)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::entities;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service description and the entities it serves
pub async fn root() -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let entities: Vec<&str> = entities::ALL.iter().map(|t| t.name).collect();

    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": version,
        "entities": entities,
        "endpoints": {
            "create": "POST /admin/:entity/create",
            "addBulk": "POST /admin/:entity/addBulk",
            "list": "POST /admin/:entity/list",
            "count": "POST /admin/:entity/count",
            "get": "GET /admin/:entity/:id",
            "update": "PUT /admin/:entity/update/:id",
            "updateBulk": "PUT /admin/:entity/updateBulk",
            "partialUpdate": "PUT /admin/:entity/partial-update/:id",
            "softDelete": "PUT /admin/:entity/softDelete/:id",
            "delete": "DELETE /admin/:entity/delete/:id",
            "deleteMany": "POST /admin/:entity/deleteMany",
            "softDeleteMany": "PUT /admin/:entity/softDeleteMany",
        }
    })))
}

/// GET /health - storage connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "SUCCESS",
                "message": "ok",
                "data": { "timestamp": now, "storage": backend }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "FAILURE",
                    "message": "storage unavailable",
                    "data": { "timestamp": now, "storage": backend }
                })),
            )
        }
    }
}
