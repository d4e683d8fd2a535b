use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::handlers::body::JsonBody;
use crate::handlers::{controller, AppState};
use crate::middleware::{ApiResult, Principal};

use super::{parse_id, resolve_entity};

/// GET /admin/:entity/:id
pub async fn get(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    controller::get(&state, resolve_entity(&entity)?, parse_id(&id)?).await
}

/// PUT /admin/:entity/update/:id - full update, required columns enforced
pub async fn update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let table = resolve_entity(&entity)?;
    controller::update(&state, table, principal, Some(parse_id(&id)?), body).await
}

/// PUT /admin/:entity/partial-update/:id
pub async fn partial_update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let table = resolve_entity(&entity)?;
    controller::partial_update(&state, table, principal, parse_id(&id)?, body).await
}

/// PUT /admin/:entity/softDelete/:id
pub async fn soft_delete(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Value> {
    controller::soft_delete(&state, resolve_entity(&entity)?, principal, parse_id(&id)?).await
}

/// DELETE /admin/:entity/delete/:id - permanent
pub async fn delete(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    controller::delete(&state, resolve_entity(&entity)?, parse_id(&id)?).await
}
