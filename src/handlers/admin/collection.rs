use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::handlers::body::JsonBody;
use crate::handlers::{controller, AppState};
use crate::middleware::{ApiResult, Principal};

use super::resolve_entity;

/// POST /admin/:entity/create
pub async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::add(&state, resolve_entity(&entity)?, principal, body).await
}

/// POST /admin/:entity/addBulk - body `{ data: [...] }`
pub async fn add_bulk(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::bulk_insert(&state, resolve_entity(&entity)?, principal, body).await
}

/// POST /admin/:entity/list - body `{ query, options, isCountOnly }`
pub async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::find_all(&state, resolve_entity(&entity)?, body).await
}

/// POST /admin/:entity/count - body `{ where }`
pub async fn count(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::count(&state, resolve_entity(&entity)?, body).await
}

/// PUT /admin/:entity/updateBulk - body `{ filter, data }`
pub async fn update_bulk(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::bulk_update(&state, resolve_entity(&entity)?, principal, body).await
}

/// PUT /admin/:entity/update without a key
pub async fn update_missing_id(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::update(&state, resolve_entity(&entity)?, principal, None, body).await
}

/// POST /admin/:entity/deleteMany - body `{ ids }`
pub async fn delete_many(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::delete_many(&state, resolve_entity(&entity)?, body).await
}

/// PUT /admin/:entity/softDeleteMany - body `{ ids }`
pub async fn soft_delete_many(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    controller::soft_delete_many(&state, resolve_entity(&entity)?, principal, body).await
}
