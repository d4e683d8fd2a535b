// handlers/admin/mod.rs - Entity routes (principal required)
//
// Every route is generic over `:entity`, which resolves to a table binding
// by entity or table name. Collection-level actions live in `collection`,
// key-addressed actions in `record`.

pub mod collection;
pub mod record;

use crate::entities::{self, TableDescriptor};
use crate::error::ApiError;

pub use collection::{add_bulk, count, create, delete_many, list, soft_delete_many, update_bulk, update_missing_id};
pub use record::{delete, get, partial_update, soft_delete, update};

pub(crate) fn resolve_entity(name: &str) -> Result<&'static TableDescriptor, ApiError> {
    entities::lookup(name).ok_or_else(|| ApiError::bad_request(format!("Unknown entity: {}", name)))
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
