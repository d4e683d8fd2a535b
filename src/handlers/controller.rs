//! Entity-agnostic controller actions. Each one validates its input, makes
//! one repository call (or a fixed short sequence) and shapes the envelope.

use serde_json::{json, Map, Value};

use crate::api::format::{row_to_api_value, rows_to_api_values};
use crate::config;
use crate::database::{PageOptions, Repository, Row};
use crate::entities::TableDescriptor;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::validation::{validate_create, validate_filter, FilterKind, SchemaMode, ValidationError, ValidationSchema};

use super::AppState;

fn repository(state: &AppState, table: &'static TableDescriptor) -> Repository {
    Repository::new(table, state.store.clone())
}

fn render(table: &TableDescriptor, row: &Row) -> Value {
    row_to_api_value(table, row, &config::config().api.date_format)
}

fn validate_payload(payload: &Value, table: &TableDescriptor, mode: SchemaMode) -> Result<(), ApiError> {
    validate_create(payload, &ValidationSchema::for_table(table, mode)).map_err(ApiError::invalid_parameters)
}

/// First row of a write, or not-found when nothing matched
fn single(table: &TableDescriptor, rows: Vec<Row>) -> ApiResult<Value> {
    match rows.first() {
        Some(row) => Ok(ApiResponse::success(render(table, row))),
        None => Err(ApiError::record_not_found()),
    }
}

/// `ids` from a bulk request body
fn ids_from(body: &Value) -> Result<Vec<i64>, ApiError> {
    let ids = match body.get("ids") {
        None | Some(Value::Null) => return Err(ApiError::insufficient_parameters("ids")),
        Some(ids) => ids,
    };
    ids.as_array()
        .and_then(|items| items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| ApiError::validation_error("\"ids\" must be an array of numbers"))
}

/// Key-addressed writes reach a row whatever its soft-delete flag
fn by_ids(table: &'static TableDescriptor, ids: &[i64]) -> Result<Filter, ApiError> {
    let mut filter = Filter::new(table)?;
    filter
        .where_clause(json!({ table.primary_key: { "$in": ids } }))?
        .include_deleted(true);
    Ok(filter)
}

pub async fn add(state: &AppState, table: &'static TableDescriptor, principal: Principal, body: Value) -> ApiResult<Value> {
    let body = if body.is_null() { Value::Object(Map::new()) } else { body };
    validate_payload(&body, table, SchemaMode::Create)?;

    let created = repository(state, table).create_one(body, principal.id()).await?;
    Ok(ApiResponse::success(render(table, &created)))
}

pub async fn bulk_insert(state: &AppState, table: &'static TableDescriptor, principal: Principal, body: Value) -> ApiResult<Value> {
    let items = match body.get("data") {
        Some(Value::Array(items)) if !items.is_empty() => items.clone(),
        _ => return Err(ApiError::insufficient_parameters("data")),
    };
    for item in &items {
        validate_payload(item, table, SchemaMode::Create)?;
    }

    let created = repository(state, table).create_many(items, principal.id()).await?;
    Ok(ApiResponse::success(json!({ "count": created.len() })))
}

pub async fn find_all(state: &AppState, table: &'static TableDescriptor, body: Value) -> ApiResult<Value> {
    validate_filter(&body, FilterKind::List, Some(table.column_names().as_slice()))?;

    let repo = repository(state, table);
    let query = body.get("query").cloned().unwrap_or(Value::Null);
    let mut options: PageOptions = match body.get("options") {
        Some(options) if !options.is_null() => serde_json::from_value(options.clone())
            .map_err(|e| ValidationError::new(format!("\"options\" {}", e)))?,
        _ => PageOptions::default(),
    };
    let filter = repo.filter(query)?;

    if body.get("isCountOnly").and_then(Value::as_bool).unwrap_or(false) {
        let mut filter = filter;
        filter.include_deleted(options.include_deleted);
        let total = repo.count(&filter).await?;
        if total == 0 {
            return Err(ApiError::record_not_found());
        }
        return Ok(ApiResponse::success(json!({ "totalRecords": total })));
    }

    if options.limit.is_none() {
        options.limit = Some(config::config().pagination.default_limit);
    }
    let page = repo.paginate(&filter, &options).await?;
    Ok(ApiResponse::success(json!({
        "rows": rows_to_api_values(table, &page.rows, &config::config().api.date_format),
        "totalRecords": page.total_records,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "limit": page.limit,
    })))
}

pub async fn get(state: &AppState, table: &'static TableDescriptor, id: i64) -> ApiResult<Value> {
    let repo = repository(state, table);
    let filter = repo.filter(json!({ table.primary_key: id }))?;
    match repo.find_one(&filter).await? {
        Some(row) => Ok(ApiResponse::success(render(table, &row))),
        None => Err(ApiError::record_not_found()),
    }
}

pub async fn count(state: &AppState, table: &'static TableDescriptor, body: Value) -> ApiResult<Value> {
    validate_filter(&body, FilterKind::Count, Some(table.column_names().as_slice()))?;

    let repo = repository(state, table);
    let filter = repo.filter(body.get("where").cloned().unwrap_or(Value::Null))?;
    let total = repo.count(&filter).await?;
    if total == 0 {
        return Err(ApiError::record_not_found());
    }
    Ok(ApiResponse::success(json!({ "count": total })))
}

pub async fn update(
    state: &AppState,
    table: &'static TableDescriptor,
    principal: Principal,
    id: Option<i64>,
    body: Value,
) -> ApiResult<Value> {
    let id = id.ok_or_else(|| ApiError::insufficient_parameters("id"))?;
    let body = if body.is_null() { Value::Object(Map::new()) } else { body };
    validate_payload(&body, table, SchemaMode::Update)?;

    let filter = Filter::by_primary_key(table, id)?;
    let updated = repository(state, table).update(&filter, body, principal.id()).await?;
    single(table, updated)
}

pub async fn bulk_update(state: &AppState, table: &'static TableDescriptor, principal: Principal, body: Value) -> ApiResult<Value> {
    let where_clause = match body.get("filter") {
        None | Some(Value::Null) => Value::Null,
        Some(filter @ Value::Object(_)) => filter.clone(),
        Some(_) => return Err(ApiError::validation_error("\"filter\" must be of type object")),
    };
    let data = match body.get("data") {
        Some(data @ Value::Object(_)) => data.clone(),
        _ => Value::Object(Map::new()),
    };
    validate_payload(&data, table, SchemaMode::PartialUpdate)?;

    let repo = repository(state, table);
    let filter = repo.filter(where_clause)?;
    let updated = repo.update(&filter, data, principal.id()).await?;
    Ok(ApiResponse::success(json!({ "count": updated.len() })))
}

pub async fn partial_update(
    state: &AppState,
    table: &'static TableDescriptor,
    principal: Principal,
    id: i64,
    body: Value,
) -> ApiResult<Value> {
    let body = if body.is_null() { Value::Object(Map::new()) } else { body };
    validate_payload(&body, table, SchemaMode::PartialUpdate)?;

    let filter = Filter::by_primary_key(table, id)?;
    let updated = repository(state, table).update(&filter, body, principal.id()).await?;
    single(table, updated)
}

pub async fn soft_delete(state: &AppState, table: &'static TableDescriptor, principal: Principal, id: i64) -> ApiResult<Value> {
    let filter = Filter::by_primary_key(table, id)?;
    let updated = repository(state, table).soft_delete(&filter, principal.id()).await?;
    single(table, updated)
}

pub async fn delete(state: &AppState, table: &'static TableDescriptor, id: i64) -> ApiResult<Value> {
    match repository(state, table).delete_by_pk(id).await? {
        Some(row) => Ok(ApiResponse::success(render(table, &row))),
        None => Err(ApiError::record_not_found()),
    }
}

pub async fn delete_many(state: &AppState, table: &'static TableDescriptor, body: Value) -> ApiResult<Value> {
    let ids = ids_from(&body)?;
    let removed = repository(state, table).destroy(&by_ids(table, &ids)?).await?;
    Ok(ApiResponse::success(json!({ "count": removed.len() })))
}

pub async fn soft_delete_many(state: &AppState, table: &'static TableDescriptor, principal: Principal, body: Value) -> ApiResult<Value> {
    let ids = ids_from(&body)?;
    let updated = repository(state, table).soft_delete(&by_ids(table, &ids)?, principal.id()).await?;
    Ok(ApiResponse::success(json!({ "count": updated.len() })))
}
